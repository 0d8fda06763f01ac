//! The session facade: one project, one engine, one history

use crate::dispatcher::{RefactoringDispatcher, RefactoringRequest};
use crate::history::ChangeHistory;
use crate::resolver::PathResolver;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strand_foundation::{
    AnalysisEngine, ChangeSet, ChangeSetInfo, CompletionCandidate, DefinitionLocation, Resource,
    StrandError, StrandResult,
};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Facade owning the per-project session state and routing every operation
/// to the right sub-component.
///
/// A value of this type IS the `Ready` state: construction binds the project
/// root (failing with `ProjectInitialization` if the root is invalid), and
/// the session then remains stable for the process lifetime.
///
/// Concurrency: mutating operations (refactorings, undo, redo) take the
/// history write lock for their whole compute-apply-record sequence, so at
/// most one mutation is ever in flight. Read-only operations share the read
/// lock — they interleave freely with each other but never with a mutation.
pub struct SessionOrchestrator {
    project_root: PathBuf,
    resolver: PathResolver,
    engine: Arc<dyn AnalysisEngine>,
    dispatcher: RefactoringDispatcher,
    history: RwLock<ChangeHistory>,
}

impl std::fmt::Debug for SessionOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionOrchestrator")
            .field("project_root", &self.project_root)
            .field("resolver", &self.resolver)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

impl SessionOrchestrator {
    /// Bind a session to a project root.
    ///
    /// The root must exist and be a directory; it is canonicalized so that
    /// path resolution and workspace identity agree on one absolute form.
    pub fn new(
        project_root: impl AsRef<Path>,
        engine: Arc<dyn AnalysisEngine>,
        history_depth: Option<usize>,
    ) -> StrandResult<Self> {
        let supplied = project_root.as_ref();
        let project_root = std::fs::canonicalize(supplied).map_err(|e| {
            StrandError::project_initialization(format!(
                "cannot bind project root '{}': {}",
                supplied.display(),
                e
            ))
        })?;
        if !project_root.is_dir() {
            return Err(StrandError::project_initialization(format!(
                "project root '{}' is not a directory",
                project_root.display()
            )));
        }

        let resolver = PathResolver::new(project_root.clone());
        let dispatcher = RefactoringDispatcher::new(resolver.clone(), engine.clone());
        info!(project_root = %project_root.display(), "Session bound to project");

        Ok(Self {
            project_root,
            resolver,
            engine,
            dispatcher,
            history: RwLock::new(ChangeHistory::new(history_depth)),
        })
    }

    /// The canonical project root this session is bound to.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    // ------------------------------------------------------------------
    // Resource queries
    // ------------------------------------------------------------------

    /// Direct children of the resource at `path` (absolute or relative).
    pub async fn list_children(&self, path: &str) -> StrandResult<Vec<Resource>> {
        let path = self.resolver.resolve(path)?;
        let _guard = self.history.read().await;
        self.engine.children(&path).await
    }

    /// Every resource in the project, breadth-first from the root, each
    /// exactly once. Sibling order is whatever the engine's child listing
    /// returns.
    pub async fn list_all_resources(&self) -> StrandResult<Vec<Resource>> {
        let _guard = self.history.read().await;
        let mut resources = Vec::new();
        let mut todo: VecDeque<Resource> = self.engine.children("").await?.into();
        while let Some(resource) = todo.pop_front() {
            if resource.is_folder {
                todo.extend(self.engine.children(&resource.path).await?);
            }
            resources.push(resource);
        }
        Ok(resources)
    }

    // ------------------------------------------------------------------
    // Refactorings
    // ------------------------------------------------------------------

    /// Extract the region `[start_offset, end_offset)` of `path` into a new
    /// method named `name`.
    pub async fn extract_method(
        &self,
        name: &str,
        path: &str,
        start_offset: usize,
        end_offset: usize,
    ) -> StrandResult<ChangeSet> {
        self.dispatch(RefactoringRequest::ExtractMethod {
            name: name.to_string(),
            path: path.to_string(),
            start_offset,
            end_offset,
        })
        .await
    }

    /// Extract the region `[start_offset, end_offset)` of `path` into a new
    /// variable named `name`.
    pub async fn extract_variable(
        &self,
        name: &str,
        path: &str,
        start_offset: usize,
        end_offset: usize,
    ) -> StrandResult<ChangeSet> {
        self.dispatch(RefactoringRequest::ExtractVariable {
            name: name.to_string(),
            path: path.to_string(),
            start_offset,
            end_offset,
        })
        .await
    }

    /// Rename the symbol at `offset` in `path` to `new_name`, or the
    /// resource itself when no offset is given.
    pub async fn rename(
        &self,
        new_name: &str,
        path: &str,
        offset: Option<usize>,
    ) -> StrandResult<ChangeSet> {
        self.dispatch(RefactoringRequest::Rename {
            new_name: new_name.to_string(),
            path: path.to_string(),
            offset,
        })
        .await
    }

    async fn dispatch(&self, request: RefactoringRequest) -> StrandResult<ChangeSet> {
        let mut history = self.history.write().await;
        self.dispatcher.dispatch(request, &mut history).await
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Revert the undoable change at `index` (0 = most recent). The inverse
    /// change set is applied through the engine and becomes redoable.
    pub async fn undo(&self, index: usize) -> StrandResult<ChangeSet> {
        let mut history = self.history.write().await;
        let inverse = history.undo_entry(index)?.inverted();
        debug!(index, description = %inverse.description, "Undoing change set");
        let committed = self.engine.apply(inverse).await?;
        history.complete_undo(index, committed.clone());
        Ok(committed)
    }

    /// Re-apply the redoable change at `index`, symmetric to [`undo`].
    ///
    /// [`undo`]: SessionOrchestrator::undo
    pub async fn redo(&self, index: usize) -> StrandResult<ChangeSet> {
        let mut history = self.history.write().await;
        let inverse = history.redo_entry(index)?.inverted();
        debug!(index, description = %inverse.description, "Redoing change set");
        let committed = self.engine.apply(inverse).await?;
        history.complete_redo(index, committed.clone());
        Ok(committed)
    }

    /// Descriptions of undoable changes, most-recent-first.
    pub async fn undo_history(&self) -> Vec<String> {
        self.history.read().await.describe_undo_list()
    }

    /// Descriptions of redoable changes, most-recent-first.
    pub async fn redo_history(&self) -> Vec<String> {
        self.history.read().await.describe_redo_list()
    }

    /// Full detail about the undoable change at `index`.
    pub async fn undo_info(&self, index: usize) -> StrandResult<ChangeSetInfo> {
        self.history.read().await.undo_info(index)
    }

    /// Full detail about the redoable change at `index`.
    pub async fn redo_info(&self, index: usize) -> StrandResult<ChangeSetInfo> {
        self.history.read().await.redo_info(index)
    }

    // ------------------------------------------------------------------
    // Code intelligence
    // ------------------------------------------------------------------

    /// Completion candidates for the point `offset` in `code`.
    pub async fn code_assist(
        &self,
        code: &str,
        offset: usize,
        path: &str,
    ) -> StrandResult<Vec<CompletionCandidate>> {
        let path = self.resolver.resolve(path)?;
        let _guard = self.history.read().await;
        self.engine.complete(code, offset, &path).await
    }

    /// Documentation for the object at `offset` in `code`, if any.
    pub async fn get_doc(
        &self,
        code: &str,
        offset: usize,
        path: &str,
    ) -> StrandResult<Option<String>> {
        let path = self.resolver.resolve(path)?;
        let _guard = self.history.read().await;
        self.engine.doc(code, offset, &path).await
    }

    /// Location of the definition of the symbol at `offset` in `code`,
    /// normalized to a consistent two-value result: `(None, None)` when no
    /// definition is found, and the queried resource's resolved path when the
    /// engine reports a same-resource hit.
    pub async fn get_definition_location(
        &self,
        code: &str,
        offset: usize,
        path: &str,
    ) -> StrandResult<DefinitionLocation> {
        let resolved = self.resolver.resolve(path)?;
        let _guard = self.history.read().await;
        let location = self.engine.definition_location(code, offset, &resolved).await?;
        Ok(match location {
            DefinitionLocation { line: None, .. } => DefinitionLocation::none(),
            DefinitionLocation {
                path: None,
                line: Some(line),
            } => DefinitionLocation {
                path: Some(resolved),
                line: Some(line),
            },
            found => found,
        })
    }
}
