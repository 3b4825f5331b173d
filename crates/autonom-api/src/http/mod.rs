//! HTTP routes and handlers.

pub mod routes;
pub mod sessions;
pub mod sse;
pub mod users;
pub mod workflow;
