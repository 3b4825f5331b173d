//! Profile handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use autonom_protocols::profile::UserProfile;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    Ok(Json(state.profiles().list_all().await?))
}

/// POST /users
///
/// Full replace: fields missing from the body take their defaults.
pub async fn upsert_user(
    State(state): State<Arc<AppState>>,
    Json(profile): Json<UserProfile>,
) -> Result<Json<UserProfile>, ApiError> {
    if profile.id.trim().is_empty() {
        return Err(ApiError::BadRequest("user id must not be empty".to_string()));
    }
    state.profiles().upsert(&profile).await?;
    info!(user_id = %profile.id, "Saved profile");
    Ok(Json(profile))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(state.profiles().get(&id).await?))
}
