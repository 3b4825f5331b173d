//! Planner errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("Planner failed: {0}")]
    Failed(String),

    #[error("Planner timed out after {0} seconds")]
    Timeout(u64),

    #[error("Unexpected planner outcome in {phase} phase: {outcome}")]
    UnexpectedOutcome { phase: String, outcome: String },
}
