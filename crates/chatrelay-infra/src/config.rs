//! Environment-based runtime configuration.
//!
//! Every knob has a default so a bare `chatrelayd` starts against a local
//! SQLite file. Malformed values log a warning and fall back rather than
//! aborting startup.

use std::net::SocketAddr;

use chatrelay_core::broker::DEFAULT_CHANNEL_CAPACITY;
use tracing::warn;

use crate::sqlite::pool::{default_database_url, default_test_database_url};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_MEDIA_URL: &str = "https://media.chatrelay.example/";
const DEFAULT_CRM_URL: &str = "http://crm-bridge:8000/bitrix";

/// Runtime settings for the relay daemon.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    /// Test mode swaps the store target to a scratch database.
    pub test_mode: bool,
    pub bind_addr: SocketAddr,
    /// Base URL for static media; the agent avatar lives under it.
    pub media_url: String,
    pub crm_base_url: String,
    /// Geo lookup base URL override; `None` keeps the client default.
    pub geo_base_url: Option<String>,
    pub broker_capacity: usize,
}

impl Settings {
    /// Load settings from `CHATRELAY_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let test_mode = lookup("CHATRELAY_TEST_MODE")
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));

        let database_url = if test_mode {
            lookup("CHATRELAY_TEST_DATABASE_URL").unwrap_or_else(default_test_database_url)
        } else {
            lookup("CHATRELAY_DATABASE_URL").unwrap_or_else(default_database_url)
        };

        let bind_addr = match lookup("CHATRELAY_BIND_ADDR") {
            Some(raw) => raw.parse().unwrap_or_else(|err| {
                warn!(%raw, %err, "invalid CHATRELAY_BIND_ADDR, using default");
                DEFAULT_BIND_ADDR.parse().unwrap()
            }),
            None => DEFAULT_BIND_ADDR.parse().unwrap(),
        };

        let media_url =
            lookup("CHATRELAY_MEDIA_URL").unwrap_or_else(|| DEFAULT_MEDIA_URL.to_string());

        let crm_base_url =
            lookup("CHATRELAY_CRM_URL").unwrap_or_else(|| DEFAULT_CRM_URL.to_string());

        let geo_base_url = lookup("CHATRELAY_GEO_URL");

        let broker_capacity = match lookup("CHATRELAY_BROKER_CAPACITY") {
            Some(raw) => raw.parse().unwrap_or_else(|err| {
                warn!(%raw, %err, "invalid CHATRELAY_BROKER_CAPACITY, using default");
                DEFAULT_CHANNEL_CAPACITY
            }),
            None => DEFAULT_CHANNEL_CAPACITY,
        };

        Self {
            database_url,
            test_mode,
            bind_addr,
            media_url,
            crm_base_url,
            geo_base_url,
            broker_capacity,
        }
    }

    /// URL of the default agent avatar under the media base.
    pub fn agent_avatar(&self) -> String {
        format!("{}agent/anna.jpg", self.media_url)
    }
}
