//! Session lookup and administration handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use autonom_protocols::error::WorkflowError;
use autonom_protocols::session::{Session, SessionKey};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /sessions/{id}/state/{key}
///
/// Unknown sessions and unset keys are both 404.
pub async fn get_state_value(
    State(state): State<Arc<AppState>>,
    Path((session_id, key)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    match state.sessions().get_state_value(&session_id, &key).await? {
        Some(value) => Ok(Json(json!({
            "session_id": session_id,
            "key": key,
            "value": value,
        }))),
        None => Err(WorkflowError::NotFound(format!(
            "state key {} of session {}",
            key, session_id
        ))
        .into()),
    }
}

/// GET /users/{id}/sessions
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Session>>, ApiError> {
    let sessions = state
        .sessions()
        .list_for_user(state.app_name(), &user_id)
        .await?;
    Ok(Json(sessions))
}

/// GET /users/{id}/active-sessions
pub async fn list_active_sessions(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Session>>, ApiError> {
    let sessions = state
        .sessions()
        .list_active_for_user(state.app_name(), &user_id)
        .await?;
    Ok(Json(sessions))
}

/// GET /users/{id}/sessions/{session_id}
pub async fn get_user_session(
    State(state): State<Arc<AppState>>,
    Path((user_id, session_id)): Path<(String, String)>,
) -> Result<Json<Session>, ApiError> {
    let key = SessionKey::new(state.app_name(), user_id, session_id);
    Ok(Json(state.sessions().get(&key).await?))
}

/// GET /sessions/{id}
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.sessions().get_by_id(&session_id).await?))
}

/// DELETE /sessions/{id}
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    // Held until the row is gone so no run can start on it meanwhile.
    let _claim = state.controller.claim(&session_id)?;
    let session = state.sessions().get_by_id(&session_id).await?;
    let deleted = state.sessions().delete(&session.key()).await?;
    info!(session_id = %session_id, "Deleted session");
    Ok(Json(json!({"session_id": session_id, "deleted": deleted})))
}

/// DELETE /sessions
///
/// Refused with 409 while any session has an invocation in flight.
pub async fn purge_sessions(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let _lock = state.controller.claim_all()?;
    let purged = state.sessions().purge().await?;
    info!(purged, "Purged sessions");
    Ok(Json(json!({"purged": purged})))
}
