//! API error type and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use autonom_protocols::error::{StoreError, WorkflowError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Workflow(err.into())
    }
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Workflow(err) => err.kind(),
            Self::BadRequest(_) => "bad_request",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Workflow(err) => match err {
                WorkflowError::NotFound(_) => StatusCode::NOT_FOUND,
                WorkflowError::DuplicateKey(_) | WorkflowError::SessionBusy(_) => {
                    StatusCode::CONFLICT
                }
                WorkflowError::MalformedResume(_) => StatusCode::BAD_REQUEST,
                WorkflowError::InvalidTransition { .. }
                | WorkflowError::PlannerFailure(_)
                | WorkflowError::OrderFailure(_)
                | WorkflowError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), "Request failed: {}", self);
        } else {
            tracing::debug!(kind = self.kind(), "Request rejected: {}", self);
        }
        (
            status,
            Json(json!({"error": self.to_string(), "kind": self.kind()})),
        )
            .into_response()
    }
}
