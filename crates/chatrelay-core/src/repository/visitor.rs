//! VisitorRepository trait definition.

use chatrelay_types::error::RepositoryError;
use chatrelay_types::visitor::{ChatIdentity, NewVisitor};

/// Repository trait for the durable visitor records.
///
/// The store enforces uniqueness of `session_id`; `upsert` must resolve
/// concurrent first-contact races to a single row (conflict-resolving
/// write, not application-level locking).
pub trait VisitorRepository: Send + Sync {
    /// Look up a chat identity by its session identifier.
    fn find_by_session(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<ChatIdentity>, RepositoryError>> + Send;

    /// Atomic upsert keyed by `session_id`.
    ///
    /// On conflict, mutable fields (name, email, phone, `is_default`) take
    /// the incoming values; the attribution context keeps its stored value.
    /// Returns the row as stored.
    fn upsert(
        &self,
        visitor: &NewVisitor,
    ) -> impl std::future::Future<Output = Result<ChatIdentity, RepositoryError>> + Send;

    /// Write the attribution context for a session, only if none is stored.
    ///
    /// Returns `true` when the write landed, `false` when a context was
    /// already present (the one-time-write invariant held).
    fn set_context_once(
        &self,
        session_id: &str,
        context: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
