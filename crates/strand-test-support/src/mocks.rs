//! Mock implementations for testing

use async_trait::async_trait;
use mockall::mock;
use strand_foundation::{
    AnalysisEngine, ChangeSet, CompletionCandidate, DefinitionLocation, Resource, StrandResult,
};

mock! {
    pub AnalysisEngine {}

    #[async_trait]
    impl AnalysisEngine for AnalysisEngine {
        async fn resource(&self, path: &str) -> StrandResult<Resource>;
        async fn children(&self, path: &str) -> StrandResult<Vec<Resource>>;
        async fn compute_extract_method(
            &self,
            path: &str,
            name: &str,
            start: usize,
            end: usize,
        ) -> StrandResult<ChangeSet>;
        async fn compute_extract_variable(
            &self,
            path: &str,
            name: &str,
            start: usize,
            end: usize,
        ) -> StrandResult<ChangeSet>;
        async fn compute_rename(
            &self,
            path: &str,
            new_name: &str,
            offset: Option<usize>,
        ) -> StrandResult<ChangeSet>;
        async fn apply(&self, change_set: ChangeSet) -> StrandResult<ChangeSet>;
        async fn complete(
            &self,
            code: &str,
            offset: usize,
            path: &str,
        ) -> StrandResult<Vec<CompletionCandidate>>;
        async fn doc(&self, code: &str, offset: usize, path: &str) -> StrandResult<Option<String>>;
        async fn definition_location(
            &self,
            code: &str,
            offset: usize,
            path: &str,
        ) -> StrandResult<DefinitionLocation>;
    }
}

/// Create a mock analysis engine for testing
pub fn mock_engine() -> MockAnalysisEngine {
    MockAnalysisEngine::new()
}
