//! Language-scoped, read-only reference data.
//!
//! Welcome and intro templates are seeded by migration and never created
//! or mutated by this service. A supported language without a template row
//! is a fatal configuration error, not a recoverable condition.

use serde::{Deserialize, Serialize};

/// Localized welcome message shown when a conversation has no recent history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeTemplate {
    pub lang: String,
    /// Author display name of the synthesized welcome entry.
    pub name: String,
    pub message: String,
}

/// Localized conversation opener: intro message plus quick-reply options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntroTemplate {
    pub lang: String,
    pub message: String,
    pub quick_replies: Vec<String>,
}

/// The assembled conversation-opener payload, delivered once per
/// connection establishment inside a `SYS` channel event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntroPayload {
    /// Agent display name, taken from the most recent outbound message
    /// when one exists, otherwise the default agent identity.
    pub name: String,
    pub avatar: Option<String>,
    pub message: String,
    pub quick_replies: Vec<String>,
    pub lang: String,
}
