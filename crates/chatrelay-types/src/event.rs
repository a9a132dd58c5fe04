//! The broker wire payload.
//!
//! A `ChannelEvent` is the ephemeral message fanned out on the channel
//! named after a session identifier. It is decoded into a tagged variant
//! once at the broker boundary instead of being passed around as an
//! untyped JSON object; the `direction` field is the serde tag so the
//! browser widget sees the same flat JSON shape it always has:
//!
//! ```json
//! {"direction":"IN","channel_id":"s-1","name":"-","message":"hi",
//!  "avatar":null,"created_at":1700000000}
//! ```

use serde::{Deserialize, Serialize};

use crate::template::IntroPayload;

/// One chat message or system notification on a broker channel.
///
/// Exists only on the broker; never persisted as its own record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "direction")]
pub enum ChannelEvent {
    /// Visitor-to-agent message.
    #[serde(rename = "IN")]
    Inbound {
        channel_id: String,
        name: String,
        message: String,
        avatar: Option<String>,
        /// Unix seconds.
        created_at: i64,
    },

    /// Agent-to-visitor message.
    #[serde(rename = "OUT")]
    Outbound {
        channel_id: String,
        name: String,
        message: String,
        avatar: Option<String>,
        created_at: i64,
    },

    /// Non-persisted system event carrying the conversation opener.
    #[serde(rename = "SYS")]
    System {
        channel_id: String,
        name: String,
        message: String,
        /// Whether the visitor still has a synthesized default identity,
        /// so the client can prompt for contact details immediately.
        is_default: bool,
        intro: IntroPayload,
        created_at: i64,
    },
}

impl ChannelEvent {
    /// The broker channel this event belongs to (the session identifier).
    pub fn channel_id(&self) -> &str {
        match self {
            ChannelEvent::Inbound { channel_id, .. }
            | ChannelEvent::Outbound { channel_id, .. }
            | ChannelEvent::System { channel_id, .. } => channel_id,
        }
    }
}
