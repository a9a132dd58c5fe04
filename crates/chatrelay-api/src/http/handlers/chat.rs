//! Visitor-facing chat endpoints.
//!
//! Endpoints:
//! - POST /publish - Ingest a visitor message
//! - POST /update  - Complete the visitor's contact details
//! - GET  /history - Reconstruct the conversation history
//!
//! All three are session-scoped: [`SessionContext`] pulls the identity
//! headers, and its absence fails the request before any handler runs.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use chatrelay_types::message::{ChatMessage, Direction};

use crate::http::error::AppError;
use crate::http::extractors::SessionContext;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PublishBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// One history entry on the wire. Internal row ids stay internal.
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub name: String,
    pub message: String,
    pub direction: Direction,
    pub avatar: Option<String>,
    pub created_at: i64,
}

impl From<ChatMessage> for HistoryEntry {
    fn from(m: ChatMessage) -> Self {
        Self {
            name: m.name,
            message: m.message,
            direction: m.direction,
            avatar: m.avatar,
            created_at: m.created_at,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// POST /publish - Ingest a visitor message.
pub async fn publish(
    State(state): State<AppState>,
    SessionContext(scope): SessionContext,
    Json(body): Json<PublishBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let message = non_empty(body.message)
        .ok_or_else(|| AppError::Validation("No message passed.".to_string()))?;

    state.ingest_service.ingest_inbound(&scope, &message).await?;

    Ok((StatusCode::CREATED, Json(json!({ "success": 1 }))))
}

/// POST /update - Complete the visitor's contact details.
///
/// At least one of email/phone must be present; empty strings count as
/// absent, for the name too. A supplied name clears the
/// synthesized-identity flag.
pub async fn update(
    State(state): State<AppState>,
    SessionContext(scope): SessionContext,
    Json(body): Json<UpdateBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let name = non_empty(body.name);
    let email = non_empty(body.email);
    let phone = non_empty(body.phone);
    if email.is_none() && phone.is_none() {
        return Err(AppError::Validation(
            "At least one contact information required".to_string(),
        ));
    }

    state
        .visitor_service
        .create_or_update_contact(&scope, name, email, phone)
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "success": 1 }))))
}

/// GET /history - The conversation history, oldest first.
pub async fn history(
    State(state): State<AppState>,
    SessionContext(scope): SessionContext,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    let identity = state.visitor_service.resolve_or_create(&scope).await?;
    let records = state.history_service.history(&identity).await?;

    Ok(Json(records.into_iter().map(HistoryEntry::from).collect()))
}
