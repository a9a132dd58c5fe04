//! Session context extractor.
//!
//! The browser widget carries conversation identity in headers rather
//! than a body: `x-session-id` (required), `x-accept-language`,
//! `x-forwarded-for` / `x-real-ip`, and `x-path` (the page's query string,
//! used for campaign attribution). This extractor folds them into the
//! core `SessionScope` so handlers never touch raw headers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use chatrelay_core::visitor::{client_addr, normalize_lang, SessionScope};

use crate::http::error::AppError;

/// Request-scoped session context. Extraction fails with a 400 when the
/// session header is absent.
#[derive(Debug)]
pub struct SessionContext(pub SessionScope);

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

impl<S: Send + Sync> FromRequestParts<S> for SessionContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session_id = header(parts, "x-session-id")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(AppError::MissingSession)?
            .to_string();

        let lang = normalize_lang(header(parts, "x-accept-language"));
        let client_addr = client_addr(
            header(parts, "x-forwarded-for"),
            header(parts, "x-real-ip"),
        );
        let attribution = header(parts, "x-path")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        Ok(SessionContext(SessionScope {
            session_id,
            lang,
            client_addr,
            attribution,
        }))
    }
}
