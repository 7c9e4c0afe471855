//! Router assembly for the agent HTTP API.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::server::handlers;
use crate::server::state::AppState;

/// Builds the axum router with all API routes.
///
/// CORS is permissive since the demo UI is served from another origin.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/run-agent", post(handlers::run_agent))
        .route("/api/run-agent/stream", get(handlers::run_agent_stream))
        .route("/api/feedback", post(handlers::submit_feedback))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
