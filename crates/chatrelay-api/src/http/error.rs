//! Application error type mapping to HTTP status codes.
//!
//! Validation faults answer with the widget's `{"detail": ...}` body shape
//! and are never logged as errors; store and template faults are logged
//! and come back as opaque 500s.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use chatrelay_types::error::{IngestError, RepositoryError, TemplateError};

/// Body sent when a session-scoped route is called without a session header.
pub const NO_SESSION_DETAIL: &str = "No session found with that query.";

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Session-scoped route called without an `x-session-id` header.
    MissingSession,
    /// Request body failed validation.
    Validation(String),
    /// Operator publish against a channel nobody has opened.
    UnknownChannel(String),
    /// Missing template row for a supported language.
    Template(TemplateError),
    /// Store failure.
    Storage(RepositoryError),
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Storage(e)
    }
}

impl From<TemplateError> for AppError {
    fn from(e: TemplateError) -> Self {
        match e {
            TemplateError::Storage(e) => AppError::Storage(e),
            other => AppError::Template(other),
        }
    }
}

impl From<IngestError> for AppError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::UnknownSession(channel) => AppError::UnknownChannel(channel),
            IngestError::Storage(e) => AppError::Storage(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            AppError::MissingSession => {
                (StatusCode::BAD_REQUEST, NO_SESSION_DETAIL.to_string())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::UnknownChannel(channel) => (
                StatusCode::NOT_FOUND,
                format!("No chat found for channel '{channel}'"),
            ),
            AppError::Template(e) => {
                tracing::error!(error = %e, "template configuration fault");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Storage(e) => {
                tracing::error!(error = %e, "storage fault");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, axum::Json(json!({ "detail": detail }))).into_response()
    }
}
