//! The analysis-engine contract.
//!
//! The session core treats the engine as an opaque capability: it computes
//! change sets, commits them, and answers code-intelligence queries. Any
//! language-analysis backend can sit behind this trait.

use crate::error::StrandResult;
use crate::protocol::{ChangeSet, CompletionCandidate, DefinitionLocation, Resource};
use async_trait::async_trait;

/// Interface through which the orchestrator invokes the analysis engine.
///
/// All paths are project-relative (the caller resolves them first). Offsets
/// are zero-based character indices; ranges are half-open, `end` pointing one
/// past the last included character.
///
/// The `code` parameter of the code-intelligence queries may differ from the
/// on-disk contents of the resource at `path` — editors pass in-flight buffer
/// contents. Engines must analyze the provided code, not re-read the file.
#[async_trait]
pub trait AnalysisEngine: Send + Sync {
    /// Look up a single resource.
    async fn resource(&self, path: &str) -> StrandResult<Resource>;

    /// List the direct children of a folder resource.
    async fn children(&self, path: &str) -> StrandResult<Vec<Resource>>;

    /// Compute (without applying) the change set that extracts the region
    /// `[start, end)` of `path` into a new method named `name`.
    async fn compute_extract_method(
        &self,
        path: &str,
        name: &str,
        start: usize,
        end: usize,
    ) -> StrandResult<ChangeSet>;

    /// Compute the change set that extracts the region `[start, end)` of
    /// `path` into a new variable named `name`.
    async fn compute_extract_variable(
        &self,
        path: &str,
        name: &str,
        start: usize,
        end: usize,
    ) -> StrandResult<ChangeSet>;

    /// Compute the change set that renames the symbol at `offset` in `path`
    /// to `new_name`. With no offset, the resource itself is renamed.
    async fn compute_rename(
        &self,
        path: &str,
        new_name: &str,
        offset: Option<usize>,
    ) -> StrandResult<ChangeSet>;

    /// Commit a computed change set to disk and return the committed set.
    ///
    /// Either every change in the set is applied or none is — engines roll
    /// back partial work before reporting failure, so callers never record a
    /// half-applied set.
    async fn apply(&self, change_set: ChangeSet) -> StrandResult<ChangeSet>;

    /// Completion candidates for the point `offset` in `code`.
    async fn complete(
        &self,
        code: &str,
        offset: usize,
        path: &str,
    ) -> StrandResult<Vec<CompletionCandidate>>;

    /// Documentation for the object at `offset` in `code`, if any.
    async fn doc(&self, code: &str, offset: usize, path: &str) -> StrandResult<Option<String>>;

    /// Location of the definition of the symbol at `offset` in `code`.
    async fn definition_location(
        &self,
        code: &str,
        offset: usize,
        path: &str,
    ) -> StrandResult<DefinitionLocation>;
}
