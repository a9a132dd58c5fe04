//! CRM notification collaborator trait.
//!
//! Notifications are one-way: the services spawn them off the request path
//! and only log failures. No response contract is relied upon.

use serde::Serialize;

use super::CollaboratorError;

/// Payload for the contact-completion webhook.
#[derive(Debug, Clone, Serialize)]
pub struct ContactNotification {
    pub channel_id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
}

/// Payload for the inbound-message webhook.
#[derive(Debug, Clone, Serialize)]
pub struct MessageNotification {
    pub channel_id: String,
    pub lang: String,
    pub message: String,
    /// Attribution URL extracted from the stored context, empty if none.
    pub url: String,
}

/// Outbound CRM webhook delivery.
pub trait CrmNotifier: Send + Sync + 'static {
    /// Notify the CRM that a visitor completed their contact details.
    fn notify_contact(
        &self,
        notification: ContactNotification,
    ) -> impl std::future::Future<Output = Result<(), CollaboratorError>> + Send;

    /// Notify the CRM of an inbound visitor message.
    fn notify_message(
        &self,
        notification: MessageNotification,
    ) -> impl std::future::Future<Output = Result<(), CollaboratorError>> + Send;
}
