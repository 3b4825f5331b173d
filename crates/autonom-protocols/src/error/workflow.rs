//! Workflow controller errors.

use thiserror::Error;

use super::{OrderError, PlannerError, StoreError};
use crate::status::WorkflowStatus;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition {
        from: WorkflowStatus,
        to: WorkflowStatus,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Session {0} already has a phase in flight")]
    SessionBusy(String),

    #[error("Planner failure: {0}")]
    PlannerFailure(String),

    #[error("Order failure: {0}")]
    OrderFailure(String),

    #[error("Malformed resume input: {0}")]
    MalformedResume(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl WorkflowError {
    /// Stable machine-readable kind, used in HTTP and stream error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::NotFound(_) => "not_found",
            Self::DuplicateKey(_) => "duplicate_key",
            Self::SessionBusy(_) => "session_busy",
            Self::PlannerFailure(_) => "planner_failure",
            Self::OrderFailure(_) => "order_failure",
            Self::MalformedResume(_) => "malformed_resume",
            Self::Store(_) => "store",
        }
    }
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => Self::NotFound(what),
            StoreError::DuplicateKey(what) => Self::DuplicateKey(what),
            other => Self::Store(other.to_string()),
        }
    }
}

impl From<PlannerError> for WorkflowError {
    fn from(err: PlannerError) -> Self {
        Self::PlannerFailure(err.to_string())
    }
}

impl From<OrderError> for WorkflowError {
    fn from(err: OrderError) -> Self {
        Self::OrderFailure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_propagates_unchanged() {
        let err = WorkflowError::from(StoreError::NotFound("session abc".to_string()));
        assert!(matches!(err, WorkflowError::NotFound(ref s) if s == "session abc"));
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn test_store_duplicate_key_propagates_unchanged() {
        let err = WorkflowError::from(StoreError::DuplicateKey("abc".to_string()));
        assert!(matches!(err, WorkflowError::DuplicateKey(_)));
    }

    #[test]
    fn test_store_database_becomes_store() {
        let err = WorkflowError::from(StoreError::Database("disk full".to_string()));
        assert!(matches!(err, WorkflowError::Store(ref s) if s.contains("disk full")));
    }

    #[test]
    fn test_planner_error_becomes_planner_failure() {
        let err = WorkflowError::from(PlannerError::Timeout(5));
        assert_eq!(err.kind(), "planner_failure");
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = WorkflowError::InvalidTransition {
            from: WorkflowStatus::Idle,
            to: WorkflowStatus::OrderConfirmed,
        };
        let display = err.to_string();
        assert!(display.contains("IDLE"));
        assert!(display.contains("ORDER_CONFIRMED"));
    }

    #[test]
    fn test_session_busy_display() {
        let err = WorkflowError::SessionBusy("s1".to_string());
        assert!(err.to_string().contains("s1"));
        assert_eq!(err.kind(), "session_busy");
    }
}
