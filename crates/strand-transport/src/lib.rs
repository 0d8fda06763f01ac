//! HTTP RPC transport for the strand session
//!
//! One route per session operation, JSON request/response bodies, and a
//! uniform error body carrying the error category and message. The transport
//! stays thin: it deserializes, delegates to the [`SessionOrchestrator`], and
//! maps errors to HTTP statuses.

pub mod routes;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use strand_config::AppConfig;
use strand_foundation::{StrandError, StrandResult};
use strand_session::SessionOrchestrator;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tracing::info;

/// Shared state for all RPC handlers
pub struct AppState {
    /// The per-project session facade
    pub orchestrator: Arc<SessionOrchestrator>,
    /// Server start time, for health reporting
    pub start_time: Instant,
    /// Application version
    pub version: String,
}

impl AppState {
    pub fn new(orchestrator: Arc<SessionOrchestrator>) -> Self {
        Self {
            orchestrator,
            start_time: Instant::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Build the RPC router over the given state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/resources/children", post(routes::children))
        .route("/resources/all", get(routes::all_resources))
        .route("/refactor/extract-method", post(routes::extract_method))
        .route("/refactor/extract-variable", post(routes::extract_variable))
        .route("/refactor/rename", post(routes::rename))
        .route("/history/undo", post(routes::undo))
        .route("/history/redo", post(routes::redo))
        .route("/history/undo-list", get(routes::undo_list))
        .route("/history/redo-list", get(routes::redo_list))
        .route("/history/undo-info", post(routes::undo_info))
        .route("/history/redo-info", post(routes::redo_info))
        .route("/assist/complete", post(routes::complete))
        .route("/assist/doc", post(routes::doc_lookup))
        .route("/assist/definition", post(routes::definition))
        .layer(ServiceBuilder::new())
        .with_state(state)
}

/// Bind the configured address and serve the RPC surface until the process
/// exits. With port 0 the OS assigns a free port; the bound address is
/// logged either way so clients can discover it.
pub async fn serve(
    config: Arc<AppConfig>,
    orchestrator: Arc<SessionOrchestrator>,
) -> StrandResult<()> {
    let state = Arc::new(AppState::new(orchestrator));
    let app = router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| StrandError::internal(format!("failed to bind {addr}: {e}")))?;
    let local_addr = listener.local_addr()?;

    info!("RPC server listening on {}", local_addr);
    info!("Available endpoints:");
    info!("  GET  /health - Health check");
    info!("  POST /resources/children - List child resources");
    info!("  GET  /resources/all - List every project resource");
    info!("  POST /refactor/extract-method | extract-variable | rename");
    info!("  POST /history/undo | redo | undo-info | redo-info");
    info!("  GET  /history/undo-list | redo-list");
    info!("  POST /assist/complete | doc | definition");

    axum::serve(listener, app).await?;
    Ok(())
}
