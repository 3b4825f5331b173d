//! Planner protocol.
//!
//! The planner is an opaque capability. Given the accumulated context of a
//! session it returns exactly one [`PlannerOutcome`]. It may be slow and it
//! may fail; the controller does not retry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PlannerError;
use crate::meal::{MealChoice, MealOption};
use crate::order::{OrderConfirmation, OrderSummary};
use crate::profile::UserProfile;

/// Which step of the workflow the planner is asked to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanPhase {
    /// Propose meal options.
    Planning,
    /// Ask the user to confirm a choice among proposed options.
    Verification,
    /// Interpret a free-text reply to a verification prompt.
    Interpretation,
    /// Summarise placed orders.
    Confirmation,
}

impl std::fmt::Display for PlanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Planning => "planning",
            Self::Verification => "verification",
            Self::Interpretation => "interpretation",
            Self::Confirmation => "confirmation",
        };
        f.write_str(name)
    }
}

/// Context handed to the planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    pub phase: PlanPhase,
    pub session_id: String,
    pub profile: UserProfile,
    #[serde(default)]
    pub meal_type: Option<String>,
    #[serde(default)]
    pub prior_options: Vec<MealOption>,
    #[serde(default)]
    pub choices: Vec<MealChoice>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub placed_orders: Vec<OrderSummary>,
}

impl PlanRequest {
    pub fn new(phase: PlanPhase, session_id: impl Into<String>, profile: UserProfile) -> Self {
        Self {
            phase,
            session_id: session_id.into(),
            profile,
            meal_type: None,
            prior_options: Vec::new(),
            choices: Vec::new(),
            feedback: None,
            input: String::new(),
            placed_orders: Vec::new(),
        }
    }
}

/// What the planner produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlannerOutcome {
    Options(Vec<MealOption>),
    ConfirmationRequested(String),
    Choice(Vec<u32>),
    Feedback(String),
    OrderConfirmation(OrderConfirmation),
}

impl PlannerOutcome {
    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Options(_) => "options",
            Self::ConfirmationRequested(_) => "confirmationRequested",
            Self::Choice(_) => "choice",
            Self::Feedback(_) => "feedback",
            Self::OrderConfirmation(_) => "orderConfirmation",
        }
    }
}

/// The planning capability.
#[async_trait]
pub trait Planner: Send + Sync {
    /// Planner identifier for logs.
    fn name(&self) -> &str;

    /// Run one phase.
    async fn plan(&self, request: PlanRequest) -> Result<PlannerOutcome, PlannerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_wire_names() {
        let json = serde_json::to_value(PlannerOutcome::ConfirmationRequested("ok?".into())).unwrap();
        assert_eq!(json["confirmationRequested"], "ok?");
        let json = serde_json::to_value(PlannerOutcome::Choice(vec![1, 2])).unwrap();
        assert_eq!(json["choice"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_plan_request_new() {
        let request = PlanRequest::new(PlanPhase::Planning, "s1", UserProfile::new("u1", "Ada"));
        assert_eq!(request.phase, PlanPhase::Planning);
        assert!(request.feedback.is_none());
        assert!(request.prior_options.is_empty());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(PlanPhase::Verification.to_string(), "verification");
        assert_eq!(PlanPhase::Confirmation.to_string(), "confirmation");
    }
}
