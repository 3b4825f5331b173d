//! Workflow status values and the transition table.
//!
//! Every status change a session goes through must be an edge of the table
//! encoded in [`WorkflowStatus::allowed_targets`]. The guard is pure and
//! total: it never panics and never errors, callers treat `false` as
//! "leave the status unchanged".

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Phase tag of a meal-ordering session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    Idle,
    MealPlanningStarted,
    MealPlanningComplete,
    MealPlanningFailed,
    NoPlanningNeeded,
    AwaitingUserApproval,
    UserApprovalReceived,
    UserRejectionReceived,
    PlacingOrder,
    OrderConfirmed,
}

impl WorkflowStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [WorkflowStatus; 10] = [
        WorkflowStatus::Idle,
        WorkflowStatus::MealPlanningStarted,
        WorkflowStatus::MealPlanningComplete,
        WorkflowStatus::MealPlanningFailed,
        WorkflowStatus::NoPlanningNeeded,
        WorkflowStatus::AwaitingUserApproval,
        WorkflowStatus::UserApprovalReceived,
        WorkflowStatus::UserRejectionReceived,
        WorkflowStatus::PlacingOrder,
        WorkflowStatus::OrderConfirmed,
    ];

    /// Wire name, e.g. `AWAITING_USER_APPROVAL`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::MealPlanningStarted => "MEAL_PLANNING_STARTED",
            Self::MealPlanningComplete => "MEAL_PLANNING_COMPLETE",
            Self::MealPlanningFailed => "MEAL_PLANNING_FAILED",
            Self::NoPlanningNeeded => "NO_PLANNING_NEEDED",
            Self::AwaitingUserApproval => "AWAITING_USER_APPROVAL",
            Self::UserApprovalReceived => "USER_APPROVAL_RECEIVED",
            Self::UserRejectionReceived => "USER_REJECTION_RECEIVED",
            Self::PlacingOrder => "PLACING_ORDER",
            Self::OrderConfirmed => "ORDER_CONFIRMED",
        }
    }

    /// Statuses reachable in one step from `self`.
    pub fn allowed_targets(&self) -> &'static [WorkflowStatus] {
        use WorkflowStatus::*;
        match self {
            Idle => &[MealPlanningStarted, NoPlanningNeeded],
            MealPlanningStarted => &[MealPlanningComplete, MealPlanningFailed],
            MealPlanningFailed => &[MealPlanningStarted],
            MealPlanningComplete => &[AwaitingUserApproval],
            AwaitingUserApproval => &[UserApprovalReceived, UserRejectionReceived],
            UserApprovalReceived => &[PlacingOrder],
            UserRejectionReceived => &[MealPlanningStarted],
            PlacingOrder => &[OrderConfirmed],
            OrderConfirmed | NoPlanningNeeded => &[],
        }
    }

    /// Terminal statuses have no outgoing edges.
    pub fn is_terminal(&self) -> bool {
        self.allowed_targets().is_empty()
    }

    /// A session is active until its order is confirmed.
    pub fn is_active(&self) -> bool {
        *self != Self::OrderConfirmed
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown workflow status: {}", s))
    }
}

/// Whether moving from `current` to `new` is an edge of the transition table.
pub fn is_valid_transition(current: WorkflowStatus, new: WorkflowStatus) -> bool {
    current.allowed_targets().contains(&new)
}

/// String form of the guard for raw persisted values.
///
/// A source that is not a known status is inert: nothing is reachable from it.
pub fn is_valid_transition_str(current: &str, new: &str) -> bool {
    match (current.parse::<WorkflowStatus>(), new.parse::<WorkflowStatus>()) {
        (Ok(current), Ok(new)) => is_valid_transition(current, new),
        _ => false,
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
