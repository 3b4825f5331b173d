//! # autonom API
//!
//! HTTP surface of the workflow host.
//!
//! - **Users**: profile upsert and lookup
//! - **Workflow**: trigger a run, resume a paused session, streaming or detached
//! - **Sessions**: point state lookup, listings, deletion and purge
//!
//! Streaming responses are Server-Sent Events: one `data:` frame per workflow
//! event, an `error` event if the invocation fails, then `event: done`.

pub mod error;
pub mod http;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use http::routes::create_router;
pub use server::{ApiConfig, ApiServer};
pub use state::AppState;
