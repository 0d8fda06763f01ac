//! strand-engine: the built-in analysis engine
//!
//! A deliberately textual backend for the [`AnalysisEngine`] contract:
//! resource queries go straight to the filesystem, refactorings are planned
//! with line/identifier heuristics, and change sets are applied atomically
//! with rollback on failure. Language-aware backends can replace it behind
//! the same trait without touching the session core.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

mod analysis;
mod apply;
mod diff;
mod resources;

use async_trait::async_trait;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use strand_foundation::{
    AnalysisEngine, ChangeSet, CompletionCandidate, DefinitionLocation, Resource, StrandError,
    StrandResult,
};
use tracing::debug;

/// Analysis engine bound to one project directory.
#[derive(Debug)]
pub struct WorkspaceEngine {
    root: PathBuf,
}

impl WorkspaceEngine {
    /// Bind the engine to a project root. The root must exist and be a
    /// directory.
    pub fn new(root: impl AsRef<Path>) -> StrandResult<Self> {
        let supplied = root.as_ref();
        let root = std::fs::canonicalize(supplied).map_err(|e| {
            StrandError::project_initialization(format!(
                "cannot open project root '{}': {}",
                supplied.display(),
                e
            ))
        })?;
        if !root.is_dir() {
            return Err(StrandError::project_initialization(format!(
                "project root '{}' is not a directory",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    /// The project root this engine is bound to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join a project-relative path onto the root, rejecting escapes.
    /// Containment validation is the engine's responsibility; the resolver
    /// upstream only normalizes.
    fn absolute(&self, relative: &str) -> StrandResult<PathBuf> {
        let path = Path::new(relative);
        if path.is_absolute()
            || path
                .components()
                .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(StrandError::path_resolution(format!(
                "'{relative}' escapes the project root"
            )));
        }
        Ok(self.root.join(path))
    }

    async fn read_source(&self, relative: &str) -> StrandResult<String> {
        let absolute = self.absolute(relative)?;
        tokio::fs::read_to_string(&absolute)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    StrandError::not_found(format!("resource '{relative}' does not exist"))
                }
                _ => StrandError::from(e),
            })
    }
}

impl fmt::Display for WorkspaceEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorkspaceEngine(\"{}\")", self.root.display())
    }
}

#[async_trait]
impl AnalysisEngine for WorkspaceEngine {
    async fn resource(&self, path: &str) -> StrandResult<Resource> {
        let absolute = self.absolute(path)?;
        resources::resource(&absolute, path).await
    }

    async fn children(&self, path: &str) -> StrandResult<Vec<Resource>> {
        let absolute = self.absolute(path)?;
        resources::children(&absolute, path).await
    }

    async fn compute_extract_method(
        &self,
        path: &str,
        name: &str,
        start: usize,
        end: usize,
    ) -> StrandResult<ChangeSet> {
        let source = self.read_source(path).await?;
        analysis::plan_extract_method(&source, path, name, start, end)
    }

    async fn compute_extract_variable(
        &self,
        path: &str,
        name: &str,
        start: usize,
        end: usize,
    ) -> StrandResult<ChangeSet> {
        let source = self.read_source(path).await?;
        analysis::plan_extract_variable(&source, path, name, start, end)
    }

    async fn compute_rename(
        &self,
        path: &str,
        new_name: &str,
        offset: Option<usize>,
    ) -> StrandResult<ChangeSet> {
        match offset {
            Some(offset) => {
                let source = self.read_source(path).await?;
                analysis::plan_rename_symbol(&source, path, new_name, offset)
            }
            None => {
                // Existence check before planning the move
                self.resource(path).await?;
                analysis::plan_rename_resource(path, new_name)
            }
        }
    }

    async fn apply(&self, change_set: ChangeSet) -> StrandResult<ChangeSet> {
        debug!(
            description = %change_set.description,
            affected = change_set.changes.len(),
            "Applying change set"
        );
        apply::apply_change_set(self, &change_set).await?;
        Ok(change_set)
    }

    async fn complete(
        &self,
        code: &str,
        offset: usize,
        _path: &str,
    ) -> StrandResult<Vec<CompletionCandidate>> {
        analysis::complete(code, offset)
    }

    async fn doc(&self, code: &str, offset: usize, _path: &str) -> StrandResult<Option<String>> {
        analysis::doc(code, offset)
    }

    async fn definition_location(
        &self,
        code: &str,
        offset: usize,
        _path: &str,
    ) -> StrandResult<DefinitionLocation> {
        analysis::definition_location(code, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_test_support::TestProject;

    #[test]
    fn binding_a_missing_root_fails() {
        let err = WorkspaceEngine::new("/no/such/project").unwrap_err();
        assert_eq!(err.category(), "project_initialization_error");
    }

    #[test]
    fn escaping_paths_are_rejected() {
        let project = TestProject::new();
        let engine = WorkspaceEngine::new(project.path()).unwrap();
        let err = engine.absolute("../outside.py").unwrap_err();
        assert_eq!(err.category(), "path_resolution_error");
        let err = engine.absolute("/etc/passwd").unwrap_err();
        assert_eq!(err.category(), "path_resolution_error");
    }

    #[test]
    fn display_identifies_the_bound_root() {
        let project = TestProject::new();
        let engine = WorkspaceEngine::new(project.path()).unwrap();
        let shown = engine.to_string();
        assert!(shown.starts_with("WorkspaceEngine(\""));
    }
}
