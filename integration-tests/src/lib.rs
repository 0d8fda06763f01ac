//! Shared harness for the end-to-end tests: a real engine over a tempdir
//! project, the session facade, and an in-memory RPC router.

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use strand_engine::WorkspaceEngine;
use strand_foundation::AnalysisEngine;
use strand_session::SessionOrchestrator;
use strand_test_support::TestProject;
use strand_transport::AppState;
use tower::ServiceExt;

/// Bind a session (real engine, unbounded history) to a fixture project.
pub fn session(project: &TestProject) -> Arc<SessionOrchestrator> {
    let engine: Arc<dyn AnalysisEngine> = Arc::new(
        WorkspaceEngine::new(project.path()).expect("engine should bind the fixture project"),
    );
    Arc::new(
        SessionOrchestrator::new(project.path(), engine, None)
            .expect("session should bind the fixture project"),
    )
}

/// Build the RPC router over a session.
pub fn rpc_router(orchestrator: Arc<SessionOrchestrator>) -> Router {
    strand_transport::router(Arc::new(AppState::new(orchestrator)))
}

/// Issue one JSON request against the router and return (status, body).
pub async fn call(router: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build");
    let response: Response<Body> = router
        .clone()
        .oneshot(request)
        .await
        .expect("router should answer");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should collect");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };
    (status, value)
}

/// Issue a bodyless GET against the router.
pub async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router should answer");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should collect");
    let value = serde_json::from_slice(&bytes).expect("body should be JSON");
    (status, value)
}
