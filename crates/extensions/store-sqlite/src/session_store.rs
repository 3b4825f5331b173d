//! SQLite session store.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use autonom_protocols::error::StoreError;
use autonom_protocols::session::{Session, SessionKey, SessionStore, StateMap};

use crate::database::{db_error, format_time, parse_time};

#[cfg(test)]
#[path = "session_store_tests.rs"]
mod tests;

const SELECT_SESSION: &str =
    "SELECT app_name, user_id, id, state, create_time, update_time FROM sessions";

/// Raw row, decoded outside the connection thread.
struct SessionRow {
    app_name: String,
    user_id: String,
    id: String,
    state: String,
    create_time: String,
    update_time: String,
}

impl SessionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            app_name: row.get(0)?,
            user_id: row.get(1)?,
            id: row.get(2)?,
            state: row.get(3)?,
            create_time: row.get(4)?,
            update_time: row.get(5)?,
        })
    }

    fn into_session(self) -> Result<Session, StoreError> {
        Ok(Session {
            state: serde_json::from_str(&self.state)?,
            create_time: parse_time(&self.create_time)?,
            update_time: parse_time(&self.update_time)?,
            app_name: self.app_name,
            user_id: self.user_id,
            id: self.id,
        })
    }
}

/// Sessions persisted in the `sessions` table.
pub struct SqliteSessionStore {
    conn: Connection,
}

impl SqliteSessionStore {
    pub(crate) fn new(conn: Connection) -> Self {
        Self { conn }
    }

    async fn query_list(&self, sql: String, app_name: &str, user_id: &str) -> Result<Vec<Session>, StoreError> {
        let app_name = app_name.to_string();
        let user_id = user_id.to_string();
        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![app_name, user_id], SessionRow::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(db_error)?;
        rows.into_iter().map(SessionRow::into_session).collect()
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn create(&self, key: &SessionKey, initial_state: StateMap) -> Result<Session, StoreError> {
        let state = serde_json::to_string(&initial_state)?;
        let now = format_time(Utc::now());
        let session = Session {
            id: key.session_id.clone(),
            app_name: key.app_name.clone(),
            user_id: key.user_id.clone(),
            state: initial_state,
            create_time: parse_time(&now)?,
            update_time: parse_time(&now)?,
        };

        let k = key.clone();
        let inserted = self
            .conn
            .call(move |conn| {
                let result = conn.execute(
                    "INSERT INTO sessions (app_name, user_id, id, state, create_time, update_time)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                    params![k.app_name, k.user_id, k.session_id, state, now],
                );
                match result {
                    Ok(_) => Ok(true),
                    Err(rusqlite::Error::SqliteFailure(err, _))
                        if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                    {
                        Ok(false)
                    }
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(db_error)?;

        if !inserted {
            return Err(StoreError::DuplicateKey(format!("session {}", key.session_id)));
        }
        tracing::debug!(session = %key, "Created session");
        Ok(session)
    }

    async fn get(&self, key: &SessionKey) -> Result<Session, StoreError> {
        let k = key.clone();
        let row = self
            .conn
            .call(move |conn| {
                let row = conn
                    .query_row(
                        &format!("{} WHERE app_name = ?1 AND user_id = ?2 AND id = ?3", SELECT_SESSION),
                        params![k.app_name, k.user_id, k.session_id],
                        SessionRow::from_row,
                    )
                    .optional()?;
                Ok(row)
            })
            .await
            .map_err(db_error)?;

        row.ok_or_else(|| StoreError::NotFound(format!("session {}", key)))?
            .into_session()
    }

    async fn get_by_id(&self, session_id: &str) -> Result<Session, StoreError> {
        let id = session_id.to_string();
        let row = self
            .conn
            .call(move |conn| {
                let row = conn
                    .query_row(
                        &format!("{} WHERE id = ?1", SELECT_SESSION),
                        params![id],
                        SessionRow::from_row,
                    )
                    .optional()?;
                Ok(row)
            })
            .await
            .map_err(db_error)?;

        row.ok_or_else(|| StoreError::NotFound(format!("session {}", session_id)))?
            .into_session()
    }

    async fn update_state(&self, key: &SessionKey, state: StateMap) -> Result<Session, StoreError> {
        let state = serde_json::to_string(&state)?;
        let now = format_time(Utc::now());
        let k = key.clone();
        let row = self
            .conn
            .call(move |conn| {
                let changed = conn.execute(
                    "UPDATE sessions SET state = ?1, update_time = ?2
                     WHERE app_name = ?3 AND user_id = ?4 AND id = ?5",
                    params![state, now, k.app_name, k.user_id, k.session_id],
                )?;
                if changed == 0 {
                    return Ok(None);
                }
                let row = conn.query_row(
                    &format!("{} WHERE app_name = ?1 AND user_id = ?2 AND id = ?3", SELECT_SESSION),
                    params![k.app_name, k.user_id, k.session_id],
                    SessionRow::from_row,
                )?;
                Ok(Some(row))
            })
            .await
            .map_err(db_error)?;

        row.ok_or_else(|| StoreError::NotFound(format!("session {}", key)))?
            .into_session()
    }

    async fn list_for_user(&self, app_name: &str, user_id: &str) -> Result<Vec<Session>, StoreError> {
        let sql = format!(
            "{} WHERE app_name = ?1 AND user_id = ?2 ORDER BY update_time DESC, rowid DESC",
            SELECT_SESSION
        );
        self.query_list(sql, app_name, user_id).await
    }

    async fn list_active_for_user(&self, app_name: &str, user_id: &str) -> Result<Vec<Session>, StoreError> {
        let sql = format!(
            "{} WHERE app_name = ?1 AND user_id = ?2
               AND IFNULL(json_extract(state, '$.workflow_status'), '') != 'ORDER_CONFIRMED'
             ORDER BY update_time DESC, rowid DESC",
            SELECT_SESSION
        );
        self.query_list(sql, app_name, user_id).await
    }

    async fn get_state_value(
        &self,
        session_id: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, StoreError> {
        let id = session_id.to_string();
        let state = self
            .conn
            .call(move |conn| {
                let state = conn
                    .query_row("SELECT state FROM sessions WHERE id = ?1", params![id], |row| {
                        row.get::<_, String>(0)
                    })
                    .optional()?;
                Ok(state)
            })
            .await
            .map_err(db_error)?;

        match state {
            Some(text) => {
                let mut map: StateMap = serde_json::from_str(&text)?;
                Ok(map.remove(key))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &SessionKey) -> Result<bool, StoreError> {
        let k = key.clone();
        let changed = self
            .conn
            .call(move |conn| {
                Ok(conn.execute(
                    "DELETE FROM sessions WHERE app_name = ?1 AND user_id = ?2 AND id = ?3",
                    params![k.app_name, k.user_id, k.session_id],
                )?)
            })
            .await
            .map_err(db_error)?;
        Ok(changed > 0)
    }

    async fn purge(&self) -> Result<usize, StoreError> {
        let removed = self
            .conn
            .call(|conn| Ok(conn.execute("DELETE FROM sessions", [])?))
            .await
            .map_err(db_error)?;
        tracing::info!(removed, "Purged sessions");
        Ok(removed)
    }
}
