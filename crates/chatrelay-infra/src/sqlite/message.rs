//! SQLite message repository implementation.
//!
//! Messages are append-only. History reads filter on approval status and
//! the trailing window in SQL so the service layer never sees rows it is
//! not allowed to show.

use std::str::FromStr;

use chatrelay_core::repository::MessageRepository;
use chatrelay_types::error::RepositoryError;
use chatrelay_types::message::{ApprovalStatus, ChatMessage, Direction, NewMessage};
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `MessageRepository`.
pub struct SqliteMessageRepository {
    pool: DatabasePool,
}

impl SqliteMessageRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain ChatMessage.
struct MessageRow {
    id: i64,
    chat_id: i64,
    name: String,
    message: String,
    direction: String,
    avatar: Option<String>,
    status: String,
    created_at: i64,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            name: row.try_get("name")?,
            message: row.try_get("message")?,
            direction: row.try_get("direction")?,
            avatar: row.try_get("avatar")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let direction =
            Direction::from_str(&self.direction).map_err(RepositoryError::Query)?;
        let status =
            ApprovalStatus::from_str(&self.status).map_err(RepositoryError::Query)?;

        Ok(ChatMessage {
            id: self.id,
            chat_id: self.chat_id,
            name: self.name,
            message: self.message,
            direction,
            avatar: self.avatar,
            status,
            created_at: self.created_at,
        })
    }
}

impl MessageRepository for SqliteMessageRepository {
    async fn insert(&self, message: &NewMessage) -> Result<ChatMessage, RepositoryError> {
        let row = sqlx::query(
            r#"INSERT INTO messages (chat_id, name, message, direction, avatar, created_at)
               VALUES (?, ?, ?, ?, ?, ?)
               RETURNING *"#,
        )
        .bind(message.chat_id)
        .bind(&message.name)
        .bind(&message.message)
        .bind(message.direction.to_string())
        .bind(&message.avatar)
        .bind(message.created_at)
        .fetch_one(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let message_row =
            MessageRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
        message_row.into_message()
    }

    async fn recent_approved(
        &self,
        chat_id: i64,
        since: i64,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT * FROM messages
               WHERE chat_id = ? AND created_at >= ? AND status = 'APPROVED'
               ORDER BY id DESC
               LIMIT ?"#,
        )
        .bind(chat_id)
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let message_row =
                MessageRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            messages.push(message_row.into_message()?);
        }

        Ok(messages)
    }

    async fn has_recent(&self, chat_id: i64, since: i64) -> Result<bool, RepositoryError> {
        let exists: (i64,) = sqlx::query_as(
            r#"SELECT EXISTS(
                 SELECT 1 FROM messages
                 WHERE chat_id = ? AND created_at >= ? AND status = 'APPROVED'
               )"#,
        )
        .bind(chat_id)
        .bind(since)
        .fetch_one(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(exists.0 != 0)
    }

    async fn last_outbound(&self, chat_id: i64) -> Result<Option<ChatMessage>, RepositoryError> {
        let row = sqlx::query(
            r#"SELECT * FROM messages
               WHERE chat_id = ? AND direction = 'OUT' AND status = 'APPROVED'
               ORDER BY id DESC
               LIMIT 1"#,
        )
        .bind(chat_id)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let message_row =
                    MessageRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(message_row.into_message()?))
            }
            None => Ok(None),
        }
    }
}
