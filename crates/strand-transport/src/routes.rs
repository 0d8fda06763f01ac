//! RPC request handlers

use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use strand_config::logging::request_span;
use strand_foundation::{
    ChangeSetInfo, CompletionCandidate, DefinitionLocation, Resource, StrandError,
};
use tracing::Instrument;

/// Error wrapper mapping the session taxonomy onto HTTP statuses.
///
/// Client-caused failures (bad index, unresolvable path, malformed request)
/// map to 4xx; engine rejections map to 422 so editors can surface the
/// diagnostic; everything else is a 500.
pub struct RpcError(StrandError);

impl From<StrandError> for RpcError {
    fn from(err: StrandError) -> Self {
        Self(err)
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StrandError::InvalidIndex { .. }
            | StrandError::PathResolution(_)
            | StrandError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            StrandError::NotFound(_) => StatusCode::NOT_FOUND,
            StrandError::Analysis(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!(
            error_category = self.0.category(),
            error = %self.0,
            is_client_error = self.0.is_client_error(),
            "Request failed"
        );
        let body = json!({
            "error": {
                "category": self.0.category(),
                "message": self.0.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

type RpcResult<T> = Result<Json<T>, RpcError>;

fn span(operation: &str) -> tracing::Span {
    request_span(&uuid::Uuid::new_v4().to_string(), operation)
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub project_root: String,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        project_root: state.orchestrator.project_root().display().to_string(),
    })
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Resource query request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathRequest {
    /// Absolute or project-relative path
    pub path: String,
}

pub async fn children(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PathRequest>,
) -> RpcResult<Vec<Resource>> {
    async move { Ok(Json(state.orchestrator.list_children(&request.path).await?)) }
        .instrument(span("children"))
        .await
}

pub async fn all_resources(State(state): State<Arc<AppState>>) -> RpcResult<Vec<Resource>> {
    async move { Ok(Json(state.orchestrator.list_all_resources().await?)) }
        .instrument(span("all_resources"))
        .await
}

// ---------------------------------------------------------------------------
// Refactorings
// ---------------------------------------------------------------------------

/// Extraction request (method or variable)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    /// Name for the extracted method/variable
    pub name: String,
    /// Absolute or project-relative path of the source resource
    pub path: String,
    /// Start of the extraction region
    pub start_offset: usize,
    /// One past the last included character
    pub end_offset: usize,
}

/// Rename request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    /// The new name
    pub new_name: String,
    /// Absolute or project-relative path
    pub path: String,
    /// Offset of the symbol to rename; absent renames the resource itself
    #[serde(default)]
    pub offset: Option<usize>,
}

pub async fn extract_method(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExtractRequest>,
) -> RpcResult<ChangeSetInfo> {
    async move {
        let applied = state
            .orchestrator
            .extract_method(
                &request.name,
                &request.path,
                request.start_offset,
                request.end_offset,
            )
            .await?;
        Ok(Json(ChangeSetInfo::from(&applied)))
    }
    .instrument(span("extract_method"))
    .await
}

pub async fn extract_variable(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExtractRequest>,
) -> RpcResult<ChangeSetInfo> {
    async move {
        let applied = state
            .orchestrator
            .extract_variable(
                &request.name,
                &request.path,
                request.start_offset,
                request.end_offset,
            )
            .await?;
        Ok(Json(ChangeSetInfo::from(&applied)))
    }
    .instrument(span("extract_variable"))
    .await
}

pub async fn rename(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RenameRequest>,
) -> RpcResult<ChangeSetInfo> {
    async move {
        let applied = state
            .orchestrator
            .rename(&request.new_name, &request.path, request.offset)
            .await?;
        Ok(Json(ChangeSetInfo::from(&applied)))
    }
    .instrument(span("rename"))
    .await
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// History index request; defaults to the most recent entry
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRequest {
    #[serde(default)]
    pub index: usize,
}

pub async fn undo(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IndexRequest>,
) -> RpcResult<ChangeSetInfo> {
    async move {
        let committed = state.orchestrator.undo(request.index).await?;
        Ok(Json(ChangeSetInfo::from(&committed)))
    }
    .instrument(span("undo"))
    .await
}

pub async fn redo(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IndexRequest>,
) -> RpcResult<ChangeSetInfo> {
    async move {
        let committed = state.orchestrator.redo(request.index).await?;
        Ok(Json(ChangeSetInfo::from(&committed)))
    }
    .instrument(span("redo"))
    .await
}

pub async fn undo_list(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.orchestrator.undo_history().await)
}

pub async fn redo_list(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.orchestrator.redo_history().await)
}

pub async fn undo_info(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IndexRequest>,
) -> RpcResult<ChangeSetInfo> {
    async move { Ok(Json(state.orchestrator.undo_info(request.index).await?)) }
        .instrument(span("undo_info"))
        .await
}

pub async fn redo_info(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IndexRequest>,
) -> RpcResult<ChangeSetInfo> {
    async move { Ok(Json(state.orchestrator.redo_info(request.index).await?)) }
        .instrument(span("redo_info"))
        .await
}

// ---------------------------------------------------------------------------
// Code intelligence
// ---------------------------------------------------------------------------

/// Code-assist request: the code may be an unsaved editor buffer and can
/// differ from the on-disk contents of the resource at `path`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeQueryRequest {
    pub code: String,
    pub offset: usize,
    pub path: String,
}

/// Doc lookup response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocResponse {
    pub doc: Option<String>,
}

pub async fn complete(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CodeQueryRequest>,
) -> RpcResult<Vec<CompletionCandidate>> {
    async move {
        let candidates = state
            .orchestrator
            .code_assist(&request.code, request.offset, &request.path)
            .await?;
        Ok(Json(candidates))
    }
    .instrument(span("complete"))
    .await
}

pub async fn doc_lookup(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CodeQueryRequest>,
) -> RpcResult<DocResponse> {
    async move {
        let doc = state
            .orchestrator
            .get_doc(&request.code, request.offset, &request.path)
            .await?;
        Ok(Json(DocResponse { doc }))
    }
    .instrument(span("doc"))
    .await
}

pub async fn definition(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CodeQueryRequest>,
) -> RpcResult<DefinitionLocation> {
    async move {
        let location = state
            .orchestrator
            .get_definition_location(&request.code, request.offset, &request.path)
            .await?;
        Ok(Json(location))
    }
    .instrument(span("definition"))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn error_statuses_follow_the_taxonomy() {
        let cases = [
            (
                StrandError::InvalidIndex { index: 2, len: 0 },
                StatusCode::BAD_REQUEST,
            ),
            (
                StrandError::path_resolution("outside the root"),
                StatusCode::BAD_REQUEST,
            ),
            (StrandError::not_found("ghost.py"), StatusCode::NOT_FOUND),
            (
                StrandError::analysis("ambiguous extraction target"),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                StrandError::internal("lock poisoned"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            let response = RpcError::from(error).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn index_requests_default_to_the_most_recent_entry() {
        let request: IndexRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.index, 0);
    }

    #[test]
    fn rename_requests_may_omit_the_offset() {
        let request: RenameRequest =
            serde_json::from_str(r#"{"newName": "better", "path": "mod.py"}"#).unwrap();
        assert_eq!(request.offset, None);
    }
}
