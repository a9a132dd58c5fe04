//! Health endpoint.

use axum::extract::State;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

/// GET /health - Liveness plus the live relay connection count.
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "active_connections": state.connections.active_count(),
    }))
}
