//! MessageRepository trait definition.

use chatrelay_types::error::RepositoryError;
use chatrelay_types::message::{ChatMessage, NewMessage};

/// Repository trait for persisted chat messages.
///
/// Messages are append-only from this crate's point of view: created on
/// ingestion, never mutated or deleted.
pub trait MessageRepository: Send + Sync {
    /// Persist a new message and return it as stored (with its id).
    fn insert(
        &self,
        message: &NewMessage,
    ) -> impl std::future::Future<Output = Result<ChatMessage, RepositoryError>> + Send;

    /// The most recent approved messages for a chat identity created at or
    /// after `since` (unix seconds), newest first, at most `limit` rows.
    fn recent_approved(
        &self,
        chat_id: i64,
        since: i64,
        limit: i64,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// Whether any approved message exists for the identity at or after
    /// `since`, without fetching the rows themselves.
    fn has_recent(
        &self,
        chat_id: i64,
        since: i64,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// The most recent approved outbound (agent) message, any age.
    fn last_outbound(
        &self,
        chat_id: i64,
    ) -> impl std::future::Future<Output = Result<Option<ChatMessage>, RepositoryError>> + Send;
}
