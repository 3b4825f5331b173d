//! Database schema management.

use rusqlite::Connection;

/// Initialize the database schema and apply column migrations.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)?;
    migrate_users(conn)?;
    Ok(())
}

const SCHEMA: &str = r#"
-- Sessions: whole-state JSON blob per (app, user, id)
CREATE TABLE IF NOT EXISTS sessions (
    app_name TEXT NOT NULL,
    user_id TEXT NOT NULL,
    id TEXT NOT NULL,
    state TEXT NOT NULL DEFAULT '{}',
    create_time TEXT NOT NULL,
    update_time TEXT NOT NULL,
    PRIMARY KEY (app_name, user_id, id)
);

-- Session ids are unique across apps and users
CREATE UNIQUE INDEX IF NOT EXISTS idx_sessions_id ON sessions(id);
CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(app_name, user_id, update_time);

-- User profiles; list columns hold JSON arrays
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    preferences TEXT,
    allergies TEXT,
    schedule TEXT
);
"#;

/// Columns added to `users` after the first release.
const USER_COLUMNS: &[(&str, &str)] = &[("special_instructions", "TEXT NOT NULL DEFAULT ''")];

fn migrate_users(conn: &Connection) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare("PRAGMA table_info(users)")?;
    let existing: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<_, _>>()?;

    for (column, definition) in USER_COLUMNS {
        if !existing.iter().any(|c| c == column) {
            tracing::info!(column, "Adding users column");
            conn.execute_batch(&format!(
                "ALTER TABLE users ADD COLUMN {} {}",
                column, definition
            ))?;
        }
    }
    Ok(())
}
