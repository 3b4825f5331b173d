//! HTTP route definitions.
//!
//! ```text
//! GET    /                                        - Service status
//! GET    /health                                  - Liveness
//!
//! GET    /users                                   - List profiles
//! POST   /users                                   - Create or replace a profile
//! GET    /users/{id}                              - One profile
//! GET    /users/{id}/sessions                     - Sessions of a user, newest first
//! GET    /users/{id}/active-sessions              - Sessions without a confirmed order
//! GET    /users/{id}/sessions/{session_id}        - One session of a user
//! POST   /users/{id}/meals/{meal_type}/trigger    - Start or continue a run (?streaming=bool)
//!
//! POST   /sessions/{id}/resume                    - Resume a paused session (?streaming=bool)
//! GET    /sessions/{id}                           - One session
//! GET    /sessions/{id}/state/{key}               - Point state lookup
//! DELETE /sessions/{id}                           - Delete one session
//! DELETE /sessions                                - Purge every session
//! ```

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::{sessions, users, workflow};
use crate::state::AppState;

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;

pub fn create_router(state: Arc<AppState>) -> Router {
    let user_routes = Router::new()
        .route("/", get(users::list_users).post(users::upsert_user))
        .route("/{id}", get(users::get_user))
        .route("/{id}/sessions", get(sessions::list_sessions))
        .route("/{id}/active-sessions", get(sessions::list_active_sessions))
        .route("/{id}/sessions/{session_id}", get(sessions::get_user_session))
        .route("/{id}/meals/{meal_type}/trigger", post(workflow::trigger))
        .with_state(state.clone());

    let session_routes = Router::new()
        .route("/", axum::routing::delete(sessions::purge_sessions))
        .route(
            "/{id}",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/{id}/state/{key}", get(sessions::get_state_value))
        .route("/{id}/resume", post(workflow::resume))
        .with_state(state.clone());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(state)
        .nest("/users", user_routes)
        .nest("/sessions", session_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn root(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "service": "autonom",
        "app_name": state.app_name(),
        "uptime_seconds": state.uptime().as_secs(),
    }))
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}
