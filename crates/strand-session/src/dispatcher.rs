//! Typed refactoring requests and the compute-apply-record pipeline

use crate::history::ChangeHistory;
use crate::resolver::PathResolver;
use std::sync::Arc;
use strand_foundation::{AnalysisEngine, ChangeSet, StrandResult};
use tracing::{debug, error, info};

/// A typed refactoring request, parameterized by kind.
///
/// Extraction offsets are half-open: `end_offset` points one past the last
/// included character. A rename with no offset renames the resource itself.
#[derive(Debug, Clone)]
pub enum RefactoringRequest {
    ExtractMethod {
        name: String,
        path: String,
        start_offset: usize,
        end_offset: usize,
    },
    ExtractVariable {
        name: String,
        path: String,
        start_offset: usize,
        end_offset: usize,
    },
    Rename {
        new_name: String,
        path: String,
        offset: Option<usize>,
    },
}

impl RefactoringRequest {
    /// The client-supplied (possibly absolute) path the request targets.
    pub fn path(&self) -> &str {
        match self {
            RefactoringRequest::ExtractMethod { path, .. }
            | RefactoringRequest::ExtractVariable { path, .. }
            | RefactoringRequest::Rename { path, .. } => path,
        }
    }

    /// Short operation name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            RefactoringRequest::ExtractMethod { .. } => "extract_method",
            RefactoringRequest::ExtractVariable { .. } => "extract_variable",
            RefactoringRequest::Rename { .. } => "rename",
        }
    }
}

/// Dispatches refactoring requests: resolve the path, ask the engine for a
/// change set, apply it, and record the applied set in the history.
///
/// The sequence short-circuits on failure, so nothing is ever recorded unless
/// the engine committed the full change set.
pub struct RefactoringDispatcher {
    resolver: PathResolver,
    engine: Arc<dyn AnalysisEngine>,
}

impl RefactoringDispatcher {
    pub fn new(resolver: PathResolver, engine: Arc<dyn AnalysisEngine>) -> Self {
        Self { resolver, engine }
    }

    /// Run one refactoring to completion. The caller holds the exclusive
    /// borrow of the history for the whole compute-apply-record sequence,
    /// which is what serializes mutating operations.
    pub async fn dispatch(
        &self,
        request: RefactoringRequest,
        history: &mut ChangeHistory,
    ) -> StrandResult<ChangeSet> {
        let path = self.resolver.resolve(request.path())?;
        debug!(
            operation = request.kind(),
            path = %path,
            "Computing change set"
        );

        let computed = self.compute(&request, &path).await.map_err(|e| {
            error!(
                error_category = e.category(),
                error = %e,
                operation = request.kind(),
                path = %path,
                "Change set computation failed"
            );
            e
        })?;

        let applied = self.engine.apply(computed).await.map_err(|e| {
            error!(
                error_category = e.category(),
                error = %e,
                operation = request.kind(),
                path = %path,
                "Change set application failed, nothing recorded"
            );
            e
        })?;

        info!(
            operation = request.kind(),
            path = %path,
            description = %applied.description,
            affected = applied.changes.len(),
            "Applied and recorded change set"
        );
        history.record(applied.clone());
        Ok(applied)
    }

    async fn compute(&self, request: &RefactoringRequest, path: &str) -> StrandResult<ChangeSet> {
        match request {
            RefactoringRequest::ExtractMethod {
                name,
                start_offset,
                end_offset,
                ..
            } => {
                self.engine
                    .compute_extract_method(path, name, *start_offset, *end_offset)
                    .await
            }
            RefactoringRequest::ExtractVariable {
                name,
                start_offset,
                end_offset,
                ..
            } => {
                self.engine
                    .compute_extract_variable(path, name, *start_offset, *end_offset)
                    .await
            }
            RefactoringRequest::Rename {
                new_name, offset, ..
            } => self.engine.compute_rename(path, new_name, *offset).await,
        }
    }
}
