//! SQLite persistence for autonom.
//!
//! One database file holds two tables: `sessions`, keyed by
//! (app_name, user_id, id) with a globally unique id, and `users`.

mod database;
mod profile_store;
mod schema;
mod session_store;

pub use database::SqliteDatabase;
pub use profile_store::SqliteProfileStore;
pub use session_store::SqliteSessionStore;
