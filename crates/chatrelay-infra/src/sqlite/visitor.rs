//! SQLite visitor repository implementation.
//!
//! Implements `VisitorRepository` from `chatrelay-core` using sqlx with
//! split read/write pools: raw queries, private Row structs, reads on the
//! reader pool and writes on the writer pool.
//!
//! The first-contact race is resolved in the store: `upsert` is a single
//! `INSERT .. ON CONFLICT(session_id) DO UPDATE .. RETURNING` statement,
//! so two concurrent first contacts both land on the same row.

use chatrelay_core::repository::VisitorRepository;
use chatrelay_types::error::RepositoryError;
use chatrelay_types::visitor::{ChatIdentity, NewVisitor};
use chrono::{DateTime, Utc};
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `VisitorRepository`.
pub struct SqliteVisitorRepository {
    pool: DatabasePool,
}

impl SqliteVisitorRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain ChatIdentity.
struct VisitorRow {
    id: i64,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    city: String,
    country: String,
    lang: String,
    session_id: String,
    context: Option<String>,
    is_default: bool,
    created_at: String,
}

impl VisitorRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            city: row.try_get("city")?,
            country: row.try_get("country")?,
            lang: row.try_get("lang")?,
            session_id: row.try_get("session_id")?,
            context: row.try_get("context")?,
            is_default: row.try_get("is_default")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_identity(self) -> Result<ChatIdentity, RepositoryError> {
        let created_at = parse_datetime(&self.created_at)?;

        Ok(ChatIdentity {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            city: self.city,
            country: self.country,
            lang: self.lang,
            session_id: self.session_id,
            context: self.context,
            is_default: self.is_default,
            created_at,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

impl VisitorRepository for SqliteVisitorRepository {
    async fn find_by_session(
        &self,
        session_id: &str,
    ) -> Result<Option<ChatIdentity>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM visitors WHERE session_id = ?")
            .bind(session_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let visitor_row =
                    VisitorRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(visitor_row.into_identity()?))
            }
            None => Ok(None),
        }
    }

    async fn upsert(&self, visitor: &NewVisitor) -> Result<ChatIdentity, RepositoryError> {
        // On conflict the stored context and created_at keep their values;
        // only the contact-form fields follow the incoming row.
        let row = sqlx::query(
            r#"INSERT INTO visitors (session_id, name, email, phone, city, country, lang, context, is_default, client_addr, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(session_id) DO UPDATE SET
                   name = excluded.name,
                   email = excluded.email,
                   phone = excluded.phone,
                   is_default = excluded.is_default
               RETURNING *"#,
        )
        .bind(&visitor.session_id)
        .bind(&visitor.name)
        .bind(&visitor.email)
        .bind(&visitor.phone)
        .bind(&visitor.city)
        .bind(&visitor.country)
        .bind(&visitor.lang)
        .bind(&visitor.context)
        .bind(visitor.is_default)
        .bind(&visitor.client_addr)
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let visitor_row =
            VisitorRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
        visitor_row.into_identity()
    }

    async fn set_context_once(
        &self,
        session_id: &str,
        context: &str,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("UPDATE visitors SET context = ? WHERE session_id = ? AND context IS NULL")
                .bind(context)
                .bind(session_id)
                .execute(&self.pool.writer)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
