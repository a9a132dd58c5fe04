//! The durable visitor record and its construction parameters.
//!
//! A `ChatIdentity` is the "who is this visitor" row keyed by the opaque
//! session identifier the browser widget carries across reconnects. The
//! session identifier doubles as the broker channel name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Language codes the service ships templates for.
pub const SUPPORTED_LANGS: [&str; 2] = ["en", "ru"];

/// Fallback language when the client header is missing or unsupported.
pub const DEFAULT_LANG: &str = "en";

/// The durable visitor record, one row per session identifier.
///
/// Mutable fields (name, email, phone, `is_default`) follow upsert
/// semantics keyed by `session_id`; `context` is written at most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatIdentity {
    /// Store-assigned, immutable.
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: String,
    pub country: String,
    /// Two-letter language code, constrained to [`SUPPORTED_LANGS`].
    pub lang: String,
    /// Opaque, stable per visitor; unique in the store.
    pub session_id: String,
    /// Campaign-attribution blob (JSON), set at most once per identity.
    pub context: Option<String>,
    /// True when the display name was synthesized rather than supplied.
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

/// Fully-resolved parameters for the atomic upsert keyed by session
/// identifier. The session resolver fills these in (geo lookup, name
/// synthesis) before the row ever reaches the store.
#[derive(Debug, Clone)]
pub struct NewVisitor {
    pub session_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: String,
    pub country: String,
    pub lang: String,
    pub context: Option<String>,
    pub is_default: bool,
    pub client_addr: String,
}

/// City/country pair returned by the geo lookup collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeoInfo {
    pub city: String,
    pub country: String,
}

/// Sentinel geo values used when the lookup collaborator degrades.
pub const GEO_UNKNOWN: &str = "nowhere";
