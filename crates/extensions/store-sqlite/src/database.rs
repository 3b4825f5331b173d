//! Connection handling shared by both stores.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use tokio_rusqlite::Connection;

use autonom_protocols::error::StoreError;

use crate::profile_store::SqliteProfileStore;
use crate::schema::init_schema;
use crate::session_store::SqliteSessionStore;

/// An open autonom database.
#[derive(Clone)]
pub struct SqliteDatabase {
    conn: Connection,
}

impl SqliteDatabase {
    /// Create a new in-memory database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().await.map_err(db_error)?;
        Self::init(conn).await
    }

    /// Open (or create) a file-backed database, creating parent directories.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StoreError::Database(e.to_string()))?;
            }
        }
        tracing::debug!(path = %path.display(), "Opening SQLite database");
        let conn = Connection::open(path).await.map_err(db_error)?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.call(|conn| Ok(init_schema(conn)?))
            .await
            .map_err(db_error)?;
        Ok(Self { conn })
    }

    pub fn session_store(&self) -> SqliteSessionStore {
        SqliteSessionStore::new(self.conn.clone())
    }

    pub fn profile_store(&self) -> SqliteProfileStore {
        SqliteProfileStore::new(self.conn.clone())
    }
}

pub(crate) fn db_error(e: tokio_rusqlite::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

/// Timestamps are stored as fixed-width RFC 3339 so they sort as text.
pub(crate) fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_time(value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Database(format!("bad timestamp {}: {}", value, e)))
}
