//! Typed view of a session's state map.
//!
//! The controller works on [`SessionState`]; stores only ever see the open
//! [`StateMap`]. Keys the typed view does not know are kept in `extra` and
//! written back untouched.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::meal::{MealChoice, MealOption};
use crate::order::{OrderConfirmation, OrderSummary};
use crate::profile::{Schedule, UserProfile};
use crate::session::StateMap;
use crate::status::WorkflowStatus;

/// What is being planned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanningContext {
    #[serde(default)]
    pub meal_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default = "initial_status")]
    pub workflow_status: WorkflowStatus,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_dietary_preferences: Vec<String>,
    #[serde(default)]
    pub user_allergies: Vec<String>,
    #[serde(default)]
    pub special_instructions: String,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default)]
    pub planning: PlanningContext,
    #[serde(default)]
    pub meal_options: Vec<MealOption>,
    #[serde(default)]
    pub meal_choices: Vec<MealChoice>,
    #[serde(default)]
    pub meal_choice_verification_message: Option<String>,
    #[serde(default)]
    pub user_choice: Vec<u32>,
    #[serde(default)]
    pub user_feedback: Option<String>,
    #[serde(default)]
    pub order_status: Vec<OrderSummary>,
    #[serde(default)]
    pub order_confirmation: Option<OrderConfirmation>,
    #[serde(default)]
    pub order_confirmation_message: Option<String>,
    /// Day override for the schedule check, e.g. `"sat"`.
    #[serde(default)]
    pub mock_day: Option<String>,
    #[serde(default)]
    pub last_input: Option<String>,
    #[serde(flatten)]
    pub extra: StateMap,
}

fn initial_status() -> WorkflowStatus {
    WorkflowStatus::Idle
}

impl SessionState {
    /// Fresh `IDLE` state seeded from a profile.
    pub fn initial(profile: &UserProfile, meal_type: Option<&str>) -> Self {
        Self {
            workflow_status: WorkflowStatus::Idle,
            user_id: profile.id.clone(),
            user_name: profile.name.clone(),
            user_dietary_preferences: profile.preferences.clone(),
            user_allergies: profile.allergies.clone(),
            special_instructions: profile.special_instructions.clone(),
            schedule: profile.schedule.clone(),
            planning: PlanningContext {
                meal_type: meal_type.map(str::to_string),
            },
            meal_options: Vec::new(),
            meal_choices: Vec::new(),
            meal_choice_verification_message: None,
            user_choice: Vec::new(),
            user_feedback: None,
            order_status: Vec::new(),
            order_confirmation: None,
            order_confirmation_message: None,
            mock_day: None,
            last_input: None,
            extra: StateMap::new(),
        }
    }

    pub fn with_mock_day(mut self, day: Option<String>) -> Self {
        self.mock_day = day;
        self
    }

    /// Parse a persisted map.
    pub fn from_map(map: StateMap) -> Result<Self, StoreError> {
        Ok(serde_json::from_value(serde_json::Value::Object(map))?)
    }

    /// Serialize back to the open map form.
    pub fn to_map(&self) -> Result<StateMap, StoreError> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(StoreError::Database(format!(
                "session state serialized to non-object: {}",
                other
            ))),
        }
    }

    /// Choices selected by number, in the order given.
    pub fn selected_choices(&self) -> Vec<MealChoice> {
        self.user_choice
            .iter()
            .filter_map(|n| self.meal_choices.iter().find(|c| c.number == *n))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
