//! HTTP CRM webhook client.
//!
//! Delivers contact-completion and inbound-message notifications to the
//! CRM bridge (`POST {base}/deal` and `POST {base}/publish`). Callers
//! spawn these off the request path; a semaphore bounds how many webhook
//! deliveries are in flight at once.

use std::time::Duration;

use chatrelay_core::collab::{
    CollaboratorError, ContactNotification, CrmNotifier, MessageNotification,
};
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::debug;

/// Upper bound on concurrent webhook deliveries.
const MAX_IN_FLIGHT: usize = 8;

/// CRM notifier backed by an external HTTP bridge.
pub struct HttpCrmNotifier {
    client: reqwest::Client,
    base_url: String,
    permits: Semaphore,
}

impl HttpCrmNotifier {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url,
            permits: Semaphore::new(MAX_IN_FLIGHT),
        }
    }

    async fn post<T: Serialize>(&self, path: &str, payload: &T) -> Result<(), CollaboratorError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| CollaboratorError::Request(e.to_string()))?;

        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| CollaboratorError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CollaboratorError::Request(format!(
                "{path} returned {}",
                response.status()
            )));
        }

        debug!(%path, "CRM webhook delivered");
        Ok(())
    }
}

impl CrmNotifier for HttpCrmNotifier {
    async fn notify_contact(
        &self,
        notification: ContactNotification,
    ) -> Result<(), CollaboratorError> {
        self.post("/deal", &notification).await
    }

    async fn notify_message(
        &self,
        notification: MessageNotification,
    ) -> Result<(), CollaboratorError> {
        self.post("/publish", &notification).await
    }
}
