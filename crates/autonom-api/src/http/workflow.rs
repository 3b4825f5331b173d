//! Workflow trigger and resume handlers.
//!
//! With `?streaming=true` the response is the invocation's event stream.
//! Otherwise the invocation runs detached and the response carries the
//! session id plus the status known at acceptance; poll the session for
//! progress.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use autonom_protocols::error::WorkflowError;
use autonom_protocols::status::WorkflowStatus;
use autonom_runtime::{ResumeRequest, RunRequest, WorkflowRun};

use crate::error::ApiError;
use crate::http::sse::event_stream;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StreamingQuery {
    #[serde(default)]
    pub streaming: bool,
}

/// Optional body of a trigger.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TriggerBody {
    pub input: Option<String>,
    pub session_id: Option<String>,
    /// Weekday override for the schedule check.
    pub mock_day: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    pub session_id: String,
    pub workflow_status: WorkflowStatus,
    pub timestamp: String,
}

impl AcceptedResponse {
    fn new(session_id: String, workflow_status: WorkflowStatus) -> Self {
        Self {
            session_id,
            workflow_status,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

fn respond(run: WorkflowRun, streaming: bool) -> Response {
    if streaming {
        let (events, _handle) = run.into_parts();
        return event_stream(events).into_response();
    }
    let (session_id, status) = run.detach();
    Json(AcceptedResponse::new(session_id, status)).into_response()
}

/// POST /users/{id}/meals/{meal_type}/trigger
pub async fn trigger(
    State(state): State<Arc<AppState>>,
    Path((user_id, meal_type)): Path<(String, String)>,
    Query(query): Query<StreamingQuery>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let body: TriggerBody = if body.iter().all(u8::is_ascii_whitespace) {
        TriggerBody::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("invalid trigger body: {}", e)))?
    };

    info!(user_id = %user_id, meal_type = %meal_type, streaming = query.streaming, "Trigger");
    let request = RunRequest {
        user_id,
        session_id: body.session_id,
        meal_type: Some(meal_type),
        input: body.input,
        mock_day: body.mock_day,
    };
    let run = state.controller.run(request).await?;
    Ok(respond(run, query.streaming))
}

/// POST /sessions/{id}/resume
///
/// Body is `{"choice": ...}`, `{"feedback": "..."}` or a bare selection.
pub async fn resume(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Query(query): Query<StreamingQuery>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let input: Value = serde_json::from_slice(&body)
        .map_err(|e| WorkflowError::MalformedResume(format!("invalid JSON body: {}", e)))?;

    info!(session_id = %session_id, streaming = query.streaming, "Resume");
    let run = state
        .controller
        .resume(ResumeRequest::new(session_id, input))
        .await?;
    Ok(respond(run, query.streaming))
}
