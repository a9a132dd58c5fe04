//! SQLite template repository implementation.
//!
//! Templates are seeded by migration and read-only at runtime. Quick
//! replies are stored as a JSON array in a TEXT column.

use chatrelay_core::repository::TemplateRepository;
use chatrelay_types::error::RepositoryError;
use chatrelay_types::template::{IntroTemplate, WelcomeTemplate};
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `TemplateRepository`.
pub struct SqliteTemplateRepository {
    pool: DatabasePool,
}

impl SqliteTemplateRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl TemplateRepository for SqliteTemplateRepository {
    async fn welcome(&self, lang: &str) -> Result<Option<WelcomeTemplate>, RepositoryError> {
        let row = sqlx::query("SELECT lang, name, message FROM welcome_templates WHERE lang = ?")
            .bind(lang)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => Ok(Some(WelcomeTemplate {
                lang: row
                    .try_get("lang")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?,
                name: row
                    .try_get("name")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?,
                message: row
                    .try_get("message")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?,
            })),
            None => Ok(None),
        }
    }

    async fn intro(&self, lang: &str) -> Result<Option<IntroTemplate>, RepositoryError> {
        let row =
            sqlx::query("SELECT lang, message, quick_replies FROM intro_templates WHERE lang = ?")
                .bind(lang)
                .fetch_optional(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let raw: String = row
                    .try_get("quick_replies")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                let quick_replies: Vec<String> = serde_json::from_str(&raw)
                    .map_err(|e| RepositoryError::Query(format!("invalid quick_replies: {e}")))?;

                Ok(Some(IntroTemplate {
                    lang: row
                        .try_get("lang")
                        .map_err(|e| RepositoryError::Query(e.to_string()))?,
                    message: row
                        .try_get("message")
                        .map_err(|e| RepositoryError::Query(e.to_string()))?,
                    quick_replies,
                }))
            }
            None => Ok(None),
        }
    }
}
