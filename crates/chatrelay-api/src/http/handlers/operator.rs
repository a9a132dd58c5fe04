//! Operator-facing publish endpoint.
//!
//! Agents reply into an existing conversation by channel name. Unlike the
//! visitor path this never creates an identity: an unknown channel is a
//! 404, not a first contact.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::http::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OperatorPublishBody {
    pub channel: String,
    pub name: String,
    pub message: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// POST /operator/publish - Ingest an agent reply on a channel.
pub async fn publish(
    State(state): State<AppState>,
    Json(body): Json<OperatorPublishBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    if body.message.trim().is_empty() {
        return Err(AppError::Validation("No message passed.".to_string()));
    }

    state
        .ingest_service
        .ingest_outbound(&body.channel, &body.name, &body.message, body.avatar)
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "success": 1 }))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::handlers::chat::tests::{session, test_state};
    use chatrelay_types::message::Direction;

    #[tokio::test]
    async fn unknown_channel_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir).await;

        let err = publish(
            State(state),
            Json(OperatorPublishBody {
                channel: "ghost".to_string(),
                name: "Anna".to_string(),
                message: "anyone there?".to_string(),
                avatar: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::UnknownChannel(ref c) if c == "ghost"));
    }

    #[tokio::test]
    async fn reply_lands_in_the_visitor_history() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir).await;

        // Visitor opens the conversation first.
        crate::http::handlers::chat::publish(
            State(state.clone()),
            session("s-1"),
            Json(crate::http::handlers::chat::PublishBody {
                message: Some("hi".to_string()),
            }),
        )
        .await
        .unwrap();

        let (status, _) = publish(
            State(state.clone()),
            Json(OperatorPublishBody {
                channel: "s-1".to_string(),
                name: "Anna".to_string(),
                message: "hello!".to_string(),
                avatar: Some("a.png".to_string()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let Json(entries) =
            crate::http::handlers::chat::history(State(state), session("s-1"))
                .await
                .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].direction, Direction::Out);
        assert_eq!(entries[1].name, "Anna");
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir).await;

        let err = publish(
            State(state),
            Json(OperatorPublishBody {
                channel: "s-1".to_string(),
                name: "Anna".to_string(),
                message: "  ".to_string(),
                avatar: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
