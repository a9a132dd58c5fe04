//! HTTP geo lookup client.
//!
//! Resolves client addresses against an ip-api.com style endpoint
//! (`GET {base}/json/{addr}`). Every failure mode collapses to `None`;
//! the session resolver substitutes sentinel values.

use std::time::Duration;

use chatrelay_core::collab::GeoLookup;
use chatrelay_types::visitor::GeoInfo;
use serde::Deserialize;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "http://ip-api.com";

/// Geo lookup backed by an external HTTP service.
pub struct HttpGeoLookup {
    client: reqwest::Client,
    base_url: String,
}

/// Response body of the lookup endpoint; only the fields we keep.
#[derive(Deserialize)]
struct GeoResponse {
    city: Option<String>,
    country: Option<String>,
}

impl HttpGeoLookup {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(3))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

impl Default for HttpGeoLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl GeoLookup for HttpGeoLookup {
    async fn lookup(&self, addr: &str) -> Option<GeoInfo> {
        let url = format!("{}/json/{addr}", self.base_url);
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                debug!(%addr, error = %err, "geo lookup request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            debug!(%addr, status = %response.status(), "geo lookup returned non-success");
            return None;
        }

        let body: GeoResponse = match response.json().await {
            Ok(body) => body,
            Err(err) => {
                debug!(%addr, error = %err, "geo lookup response malformed");
                return None;
            }
        };

        match (body.city, body.country) {
            (Some(city), Some(country)) => Some(GeoInfo { city, country }),
            _ => None,
        }
    }
}
