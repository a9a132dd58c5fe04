//! Axum router configuration with middleware.
//!
//! Routes mirror the widget's wire contract at the root (no version
//! prefix; the deployed widget hardcodes these paths).
//! Middleware: CORS, tracing.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Visitor-facing chat API
        .route("/publish", post(handlers::chat::publish))
        .route("/update", post(handlers::chat::update))
        .route("/history", get(handlers::chat::history))
        // Operator replies
        .route("/operator/publish", post(handlers::operator::publish))
        // Relay WebSocket
        .route("/subscribe/{channel}", get(handlers::ws::subscribe))
        .route("/health", get(handlers::health::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
