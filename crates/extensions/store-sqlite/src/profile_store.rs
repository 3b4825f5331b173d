//! SQLite user profile store.

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use autonom_protocols::error::StoreError;
use autonom_protocols::profile::{ProfileStore, Schedule, UserProfile};

use crate::database::db_error;

const SELECT_USER: &str =
    "SELECT id, name, preferences, allergies, schedule, special_instructions FROM users";

struct UserRow {
    id: String,
    name: String,
    preferences: Option<String>,
    allergies: Option<String>,
    schedule: Option<String>,
    special_instructions: Option<String>,
}

impl UserRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            preferences: row.get(2)?,
            allergies: row.get(3)?,
            schedule: row.get(4)?,
            special_instructions: row.get(5)?,
        })
    }

    /// Missing or empty columns decode to their defaults.
    fn into_profile(self) -> Result<UserProfile, StoreError> {
        Ok(UserProfile {
            id: self.id,
            name: self.name,
            preferences: decode_or_default(self.preferences)?,
            allergies: decode_or_default(self.allergies)?,
            schedule: decode_or_default::<Schedule>(self.schedule)?,
            special_instructions: self.special_instructions.unwrap_or_default(),
        })
    }
}

fn decode_or_default<T>(column: Option<String>) -> Result<T, StoreError>
where
    T: serde::de::DeserializeOwned + Default,
{
    match column.as_deref().map(str::trim) {
        None | Some("") | Some("null") => Ok(T::default()),
        Some(text) => Ok(serde_json::from_str(text)?),
    }
}

/// Profiles persisted in the `users` table.
pub struct SqliteProfileStore {
    conn: Connection,
}

impl SqliteProfileStore {
    pub(crate) fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ProfileStore for SqliteProfileStore {
    async fn upsert(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let id = profile.id.clone();
        let name = profile.name.clone();
        let preferences = serde_json::to_string(&profile.preferences)?;
        let allergies = serde_json::to_string(&profile.allergies)?;
        let schedule = serde_json::to_string(&profile.schedule)?;
        let instructions = profile.special_instructions.clone();

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO users (id, name, preferences, allergies, schedule, special_instructions)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(id) DO UPDATE SET
                        name = excluded.name,
                        preferences = excluded.preferences,
                        allergies = excluded.allergies,
                        schedule = excluded.schedule,
                        special_instructions = excluded.special_instructions",
                    params![id, name, preferences, allergies, schedule, instructions],
                )?;
                Ok(())
            })
            .await
            .map_err(db_error)?;

        tracing::debug!(user_id = %profile.id, "Upserted user profile");
        Ok(())
    }

    async fn get(&self, user_id: &str) -> Result<UserProfile, StoreError> {
        let id = user_id.to_string();
        let row = self
            .conn
            .call(move |conn| {
                let row = conn
                    .query_row(
                        &format!("{} WHERE id = ?1", SELECT_USER),
                        params![id],
                        UserRow::from_row,
                    )
                    .optional()?;
                Ok(row)
            })
            .await
            .map_err(db_error)?;

        row.ok_or_else(|| StoreError::NotFound(format!("user {}", user_id)))?
            .into_profile()
    }

    async fn list_all(&self) -> Result<Vec<UserProfile>, StoreError> {
        let rows = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_USER))?;
                let rows = stmt
                    .query_map([], UserRow::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(db_error)?;

        rows.into_iter().map(UserRow::into_profile).collect()
    }
}
