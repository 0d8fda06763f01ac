//! Change-set application with rollback
//!
//! Edits are committed in order with a journal of inverse filesystem actions;
//! any failure unwinds the journal so the caller never sees (or records) a
//! half-applied set.

use crate::WorkspaceEngine;
use std::path::{Path, PathBuf};
use strand_foundation::{ChangeSet, EditPayload, ResourceChange, StrandError, StrandResult};
use tokio::fs;
use tracing::warn;

enum Rollback {
    Restore { path: PathBuf, contents: String },
    Remove { path: PathBuf },
    MoveBack { from: PathBuf, to: PathBuf },
}

pub(crate) async fn apply_change_set(
    engine: &WorkspaceEngine,
    change_set: &ChangeSet,
) -> StrandResult<()> {
    let mut journal: Vec<Rollback> = Vec::new();
    for change in &change_set.changes {
        if let Err(e) = apply_one(engine, change, &mut journal).await {
            roll_back(journal).await;
            return Err(e);
        }
    }
    Ok(())
}

async fn apply_one(
    engine: &WorkspaceEngine,
    change: &ResourceChange,
    journal: &mut Vec<Rollback>,
) -> StrandResult<()> {
    let absolute = engine.absolute(&change.path)?;
    match &change.payload {
        EditPayload::Edit { old_text, new_text } => {
            let current = read_existing(&absolute, &change.path).await?;
            if current != *old_text {
                return Err(stale(&change.path));
            }
            fs::write(&absolute, new_text).await?;
            journal.push(Rollback::Restore {
                path: absolute,
                contents: current,
            });
        }
        EditPayload::Create { text } => {
            if fs::try_exists(&absolute).await? {
                return Err(StrandError::analysis(format!(
                    "cannot create '{}': resource already exists",
                    change.path
                )));
            }
            if let Some(parent) = absolute.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&absolute, text).await?;
            journal.push(Rollback::Remove { path: absolute });
        }
        EditPayload::Delete { text } => {
            let current = read_existing(&absolute, &change.path).await?;
            if current != *text {
                return Err(stale(&change.path));
            }
            fs::remove_file(&absolute).await?;
            journal.push(Rollback::Restore {
                path: absolute,
                contents: current,
            });
        }
        EditPayload::Move { to } => {
            let target = engine.absolute(to)?;
            if fs::try_exists(&target).await? {
                return Err(StrandError::analysis(format!(
                    "cannot move '{}' to '{to}': target already exists",
                    change.path
                )));
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::rename(&absolute, &target).await?;
            journal.push(Rollback::MoveBack {
                from: target,
                to: absolute,
            });
        }
    }
    Ok(())
}

async fn roll_back(journal: Vec<Rollback>) {
    for action in journal.into_iter().rev() {
        let outcome = match action {
            Rollback::Restore { path, contents } => fs::write(path, contents).await,
            Rollback::Remove { path } => fs::remove_file(path).await,
            Rollback::MoveBack { from, to } => fs::rename(from, to).await,
        };
        if let Err(e) = outcome {
            warn!(error = %e, "rollback step failed; workspace may need manual repair");
        }
    }
}

async fn read_existing(absolute: &Path, relative: &str) -> StrandResult<String> {
    fs::read_to_string(absolute).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            StrandError::not_found(format!("resource '{relative}' does not exist"))
        }
        _ => StrandError::from(e),
    })
}

fn stale(path: &str) -> StrandError {
    StrandError::analysis(format!(
        "stale change set: '{path}' has been modified since it was computed"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strand_foundation::AnalysisEngine;
    use strand_test_support::TestProject;

    fn edit(path: &str, old: &str, new: &str) -> ResourceChange {
        ResourceChange {
            path: path.to_string(),
            description: format!("edit {path}"),
            payload: EditPayload::Edit {
                old_text: old.to_string(),
                new_text: new.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn applying_an_edit_rewrites_the_file() {
        let project = TestProject::new();
        project.write_file("mod.py", "x = 1\n");
        let engine = WorkspaceEngine::new(project.path()).unwrap();

        engine
            .apply(ChangeSet::new("edit", vec![edit("mod.py", "x = 1\n", "x = 2\n")]))
            .await
            .unwrap();
        assert_eq!(project.read_file("mod.py"), "x = 2\n");
    }

    #[tokio::test]
    async fn stale_contents_are_rejected_before_writing() {
        let project = TestProject::new();
        project.write_file("mod.py", "drifted\n");
        let engine = WorkspaceEngine::new(project.path()).unwrap();

        let err = engine
            .apply(ChangeSet::new("edit", vec![edit("mod.py", "x = 1\n", "x = 2\n")]))
            .await
            .unwrap_err();
        assert_eq!(err.category(), "analysis_error");
        assert_eq!(project.read_file("mod.py"), "drifted\n");
    }

    #[tokio::test]
    async fn a_failing_change_rolls_back_the_earlier_ones() {
        let project = TestProject::new();
        project.write_file("a.py", "a\n");
        let engine = WorkspaceEngine::new(project.path()).unwrap();

        let err = engine
            .apply(ChangeSet::new(
                "multi",
                vec![
                    edit("a.py", "a\n", "A\n"),
                    edit("missing.py", "x\n", "y\n"),
                ],
            ))
            .await
            .unwrap_err();

        assert_eq!(err.category(), "not_found");
        assert_eq!(project.read_file("a.py"), "a\n");
    }

    #[tokio::test]
    async fn moves_apply_and_invert_cleanly() {
        let project = TestProject::new();
        project.write_file("pkg/old.py", "contents\n");
        let engine = WorkspaceEngine::new(project.path()).unwrap();

        let change_set = ChangeSet::new(
            "move",
            vec![ResourceChange {
                path: "pkg/old.py".to_string(),
                description: "Move pkg/old.py to pkg/new.py".to_string(),
                payload: EditPayload::Move {
                    to: "pkg/new.py".to_string(),
                },
            }],
        );
        engine.apply(change_set.clone()).await.unwrap();
        assert!(!project.exists("pkg/old.py"));
        assert_eq!(project.read_file("pkg/new.py"), "contents\n");

        engine.apply(change_set.inverted()).await.unwrap();
        assert_eq!(project.read_file("pkg/old.py"), "contents\n");
        assert!(!project.exists("pkg/new.py"));
    }

    #[tokio::test]
    async fn create_and_delete_round_trip() {
        let project = TestProject::new();
        let engine = WorkspaceEngine::new(project.path()).unwrap();

        let create = ChangeSet::new(
            "create",
            vec![ResourceChange {
                path: "fresh.py".to_string(),
                description: "Create fresh.py".to_string(),
                payload: EditPayload::Create {
                    text: "pass\n".to_string(),
                },
            }],
        );
        engine.apply(create.clone()).await.unwrap();
        assert_eq!(project.read_file("fresh.py"), "pass\n");

        engine.apply(create.inverted()).await.unwrap();
        assert!(!project.exists("fresh.py"));
    }
}
