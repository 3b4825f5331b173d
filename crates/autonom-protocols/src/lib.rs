//! # autonom Protocols
//!
//! Shared definitions for the autonom meal-ordering workflow.
//! Contains the data model, the status transition table and the traits
//! implemented by stores, planners and order executors.
//!
//! ## Core Traits
//!
//! - [`SessionStore`] - Durable session records keyed by (app, user, session)
//! - [`ProfileStore`] - User profile records
//! - [`Planner`] - Opaque planning capability
//! - [`OrderExecutor`] - Places one order per restaurant

pub mod allergy;
pub mod error;
pub mod event;
pub mod meal;
pub mod order;
pub mod planner;
pub mod profile;
pub mod session;
pub mod state;
pub mod status;

pub use allergy::{item_violates_allergies, strip_allergens};
pub use error::{OrderError, PlannerError, StoreError, WorkflowError};
pub use event::{AnnotatedEvent, ToolCall, ToolResponse, WorkflowEvent};
pub use meal::{number_choices, MealChoice, MealItem, MealOption};
pub use order::{FoodOrder, OrderConfirmation, OrderExecutor, OrderLine, OrderSummary};
pub use planner::{PlanPhase, PlanRequest, Planner, PlannerOutcome};
pub use profile::{parse_weekday, MealSlot, ProfileStore, Schedule, UserProfile};
pub use session::{Session, SessionKey, SessionStore, StateMap};
pub use state::{PlanningContext, SessionState};
pub use status::{is_valid_transition, is_valid_transition_str, WorkflowStatus};
