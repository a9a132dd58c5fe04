//! SQLite pool split into a reader pool and a single-connection writer.
//!
//! SQLite serializes writers at the file level, so the writer pool is
//! capped at one connection and all mutations go through it. Reads fan
//! out over a small read-only pool. Both sides run in WAL mode with
//! foreign keys on and a 5 second busy timeout.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

const READER_CONNECTIONS: u32 = 8;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Read/write split over one SQLite file.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

fn connect_options(database_url: &str) -> Result<SqliteConnectOptions, sqlx::Error> {
    Ok(SqliteConnectOptions::from_str(database_url)?
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT)
        .create_if_missing(true))
}

impl DatabasePool {
    /// Open the pools and bring the schema up to date.
    ///
    /// Migrations run on the writer before the reader opens, so the
    /// reader never sees a half-migrated file.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = connect_options(database_url)?;

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options.clone())
            .await?;

        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(READER_CONNECTIONS)
            .connect_with(options.read_only(true))
            .await?;

        Ok(Self { reader, writer })
    }
}

fn data_dir() -> String {
    std::env::var("CHATRELAY_DATA_DIR").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        format!("{home}/.chatrelay")
    })
}

/// Default database URL: `CHATRELAY_DATA_DIR` when set, otherwise
/// `~/.chatrelay/chatrelay.db`.
pub fn default_database_url() -> String {
    format!("sqlite://{}/chatrelay.db", data_dir())
}

/// Scratch database URL used when the daemon runs in test mode.
pub fn default_test_database_url() -> String {
    format!("sqlite://{}/chatrelay-test.db?mode=rwc", data_dir())
}
