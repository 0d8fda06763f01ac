//! Filesystem-backed resource queries

use std::path::Path;
use strand_foundation::{Resource, StrandError, StrandResult};

/// Look up a single resource by its absolute path.
pub(crate) async fn resource(absolute: &Path, relative: &str) -> StrandResult<Resource> {
    let metadata = tokio::fs::metadata(absolute).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            StrandError::not_found(format!("resource '{relative}' does not exist"))
        }
        _ => StrandError::from(e),
    })?;
    Ok(Resource {
        path: relative.to_string(),
        is_folder: metadata.is_dir(),
    })
}

/// List the direct children of a folder, sorted by name. Hidden entries
/// (dot-prefixed) are not part of the managed resource tree.
pub(crate) async fn children(absolute: &Path, relative: &str) -> StrandResult<Vec<Resource>> {
    let mut entries = tokio::fs::read_dir(absolute).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            StrandError::not_found(format!("resource '{relative}' does not exist"))
        }
        std::io::ErrorKind::NotADirectory => {
            StrandError::invalid_request(format!("resource '{relative}' is not a folder"))
        }
        _ => StrandError::from(e),
    })?;

    let mut resources = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let child_path = if relative.is_empty() {
            name
        } else {
            format!("{relative}/{name}")
        };
        let file_type = entry.file_type().await?;
        resources.push(Resource {
            path: child_path,
            is_folder: file_type.is_dir(),
        });
    }
    resources.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(resources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strand_test_support::TestProject;

    #[tokio::test]
    async fn children_are_sorted_and_tagged() {
        let project = TestProject::new();
        project.create_dir("pkg");
        project.write_file("zeta.py", "");
        project.write_file("alpha.py", "");
        project.write_file(".hidden", "");

        let listed = children(project.path(), "").await.unwrap();
        assert_eq!(
            listed,
            vec![
                Resource::file("alpha.py"),
                Resource::folder("pkg"),
                Resource::file("zeta.py"),
            ]
        );
    }

    #[tokio::test]
    async fn nested_children_carry_full_relative_paths() {
        let project = TestProject::new();
        project.write_file("pkg/mod.py", "");

        let listed = children(&project.path().join("pkg"), "pkg").await.unwrap();
        assert_eq!(listed, vec![Resource::file("pkg/mod.py")]);
    }

    #[tokio::test]
    async fn missing_resources_report_not_found() {
        let project = TestProject::new();
        let err = resource(&project.path().join("ghost.py"), "ghost.py")
            .await
            .unwrap_err();
        assert_eq!(err.category(), "not_found");
    }
}
