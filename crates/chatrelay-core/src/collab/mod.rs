//! Collaborator trait definitions.
//!
//! Geo lookup and CRM notification are external services specified only at
//! their interface boundary. Both degrade gracefully: a failed geo lookup
//! yields sentinel values, a failed CRM notification is logged and dropped.

pub mod crm;
pub mod geo;

pub use crm::{ContactNotification, CrmNotifier, MessageNotification};
pub use geo::GeoLookup;

use thiserror::Error;

/// Failures talking to an external collaborator. Always absorbed locally.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("collaborator request failed: {0}")]
    Request(String),
}
