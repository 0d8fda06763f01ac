//! Canonical path resolution for one project workspace

use std::path::{Component, Path, PathBuf};
use strand_foundation::{StrandError, StrandResult};

/// Normalizes client-supplied paths (absolute or project-relative) to a
/// canonical project-relative form.
///
/// Pure function of (path, project root): no filesystem access, no side
/// effects. Containment of relative inputs is the analysis engine's concern;
/// this type only guarantees that an absolute input inside the root maps to a
/// '/'-separated relative path and that resolution is idempotent.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Create a resolver for the given project root. The root must already be
    /// absolute and canonical (the orchestrator canonicalizes at bind time).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The project root this resolver is bound to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a path to project-relative form.
    ///
    /// Absolute paths are made relative to the project root; an absolute path
    /// outside the root is a `PathResolution` error. Relative paths pass
    /// through, normalized to single-'/'-separated form.
    pub fn resolve(&self, path: &str) -> StrandResult<String> {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            let relative = candidate.strip_prefix(&self.root).map_err(|_| {
                StrandError::path_resolution(format!(
                    "'{}' is outside the project root '{}'",
                    path,
                    self.root.display()
                ))
            })?;
            Ok(to_relative_string(relative))
        } else {
            Ok(to_relative_string(candidate))
        }
    }
}

/// Join normal path components with '/', dropping `.` segments and redundant
/// separators. The empty string denotes the project root itself.
fn to_relative_string(path: &Path) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str().unwrap_or_default()),
            Component::CurDir => {}
            Component::ParentDir => parts.push(".."),
            Component::RootDir | Component::Prefix(_) => {}
        }
    }
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn resolver() -> PathResolver {
        PathResolver::new("/work/project")
    }

    #[test]
    fn relative_paths_pass_through_unchanged() {
        assert_eq!(resolver().resolve("src/lib.py").unwrap(), "src/lib.py");
    }

    #[test]
    fn absolute_paths_become_project_relative() {
        assert_eq!(
            resolver().resolve("/work/project/src/lib.py").unwrap(),
            "src/lib.py"
        );
    }

    #[test]
    fn resolution_is_idempotent() {
        let resolver = resolver();
        let once = resolver.resolve("/work/project/pkg/mod.py").unwrap();
        let twice = resolver.resolve(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn the_root_itself_resolves_to_the_empty_path() {
        assert_eq!(resolver().resolve("/work/project").unwrap(), "");
        assert_eq!(resolver().resolve("").unwrap(), "");
    }

    #[test]
    fn absolute_path_outside_the_root_is_rejected() {
        let err = resolver().resolve("/elsewhere/file.py").unwrap_err();
        assert_eq!(err.category(), "path_resolution_error");
    }

    #[test]
    fn redundant_separators_and_cur_dirs_are_normalized() {
        assert_eq!(resolver().resolve("./a//b/./c.py").unwrap(), "a/b/c.py");
    }
}
