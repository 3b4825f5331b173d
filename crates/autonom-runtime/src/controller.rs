//! Workflow controller.
//!
//! Each invocation claims the session in the [`SessionRegistry`], then a
//! spawned task drives it phase by phase until the next pause point:
//!
//! ```text
//! run     IDLE -> MEAL_PLANNING_STARTED -> MEAL_PLANNING_COMPLETE -> AWAITING_USER_APPROVAL
//!         IDLE -> NO_PLANNING_NEEDED
//! resume  AWAITING_USER_APPROVAL -> USER_APPROVAL_RECEIVED -> PLACING_ORDER -> ORDER_CONFIRMED
//!         AWAITING_USER_APPROVAL -> USER_REJECTION_RECEIVED -> MEAL_PLANNING_STARTED -> ...
//! ```
//!
//! Every status change goes through the transition guard and is persisted
//! before the next phase starts. A planner or order failure ends the
//! invocation and leaves the last persisted status in place.

use std::sync::Arc;

use chrono::{Datelike, Local, Weekday};
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use autonom_protocols::allergy::strip_allergens;
use autonom_protocols::error::{PlannerError, StoreError, WorkflowError};
use autonom_protocols::event::WorkflowEvent;
use autonom_protocols::meal::number_choices;
use autonom_protocols::order::{FoodOrder, OrderExecutor};
use autonom_protocols::planner::{PlanPhase, PlanRequest, Planner, PlannerOutcome};
use autonom_protocols::profile::{parse_weekday, ProfileStore, UserProfile};
use autonom_protocols::session::{SessionKey, SessionStore};
use autonom_protocols::state::SessionState;
use autonom_protocols::status::{is_valid_transition, WorkflowStatus};

use crate::registry::{RegistryLock, SessionGuard, SessionRegistry};
use crate::resume::{parse_resume, validate_choices, ResumeInput};
use crate::stream::{EventEmitter, StreamItem, WorkflowEventStream};

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;

const PLANNER_AUTHOR: &str = "MealPlanner";
const ORDER_AUTHOR: &str = "OrderAgent";
const WORKFLOW_AUTHOR: &str = "Workflow";

/// Controller settings.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub app_name: String,
    pub stream_buffer: usize,
    /// Skip planning on days or meals the user's schedule does not cover.
    pub enforce_schedule: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            app_name: "auto_nom_agent".to_string(),
            stream_buffer: 100,
            enforce_schedule: true,
        }
    }
}

/// Start or continue a session with a fresh utterance.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub user_id: String,
    /// Existing session to continue; a new id is generated when absent.
    pub session_id: Option<String>,
    pub meal_type: Option<String>,
    pub input: Option<String>,
    /// Weekday override for the schedule check, e.g. `"sa"`.
    pub mock_day: Option<String>,
}

impl RunRequest {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_meal_type(mut self, meal_type: impl Into<String>) -> Self {
        self.meal_type = Some(meal_type.into());
        self
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn with_mock_day(mut self, day: impl Into<String>) -> Self {
        self.mock_day = Some(day.into());
        self
    }
}

/// Continue a session paused at `AWAITING_USER_APPROVAL`.
#[derive(Debug, Clone)]
pub struct ResumeRequest {
    pub session_id: String,
    /// Selection or feedback, see [`crate::resume`].
    pub input: Value,
}

impl ResumeRequest {
    pub fn new(session_id: impl Into<String>, input: Value) -> Self {
        Self {
            session_id: session_id.into(),
            input,
        }
    }
}

/// A started invocation.
pub struct WorkflowRun {
    pub session_id: String,
    /// Status when the invocation was accepted.
    pub workflow_status: WorkflowStatus,
    pub events: WorkflowEventStream,
    handle: JoinHandle<Result<WorkflowStatus, WorkflowError>>,
}

async fn join(
    handle: JoinHandle<Result<WorkflowStatus, WorkflowError>>,
) -> Result<WorkflowStatus, WorkflowError> {
    handle
        .await
        .map_err(|e| WorkflowError::Store(format!("workflow task aborted: {}", e)))?
}

impl WorkflowRun {
    /// Ignore the events and wait for the final status.
    pub async fn wait(self) -> Result<WorkflowStatus, WorkflowError> {
        drop(self.events);
        join(self.handle).await
    }

    /// Drain every event, then return them with the final status.
    pub async fn collect(self) -> (Vec<StreamItem>, Result<WorkflowStatus, WorkflowError>) {
        use futures::StreamExt;
        let items: Vec<StreamItem> = self.events.collect().await;
        (items, join(self.handle).await)
    }

    /// Let the task finish in the background. Returns the session id and the
    /// status known at acceptance; poll the store for progress.
    pub fn detach(self) -> (String, WorkflowStatus) {
        (self.session_id, self.workflow_status)
    }

    pub fn into_parts(
        self,
    ) -> (
        WorkflowEventStream,
        JoinHandle<Result<WorkflowStatus, WorkflowError>>,
    ) {
        (self.events, self.handle)
    }
}

/// Drives sessions through the workflow.
#[derive(Clone)]
pub struct WorkflowController {
    sessions: Arc<dyn SessionStore>,
    profiles: Arc<dyn ProfileStore>,
    planner: Arc<dyn Planner>,
    orders: Arc<dyn OrderExecutor>,
    registry: SessionRegistry,
    config: ControllerConfig,
}

enum Invocation {
    Run(Option<String>),
    Resume(ResumeInput),
}

/// Per-invocation context handed to the phases.
struct Drive {
    key: SessionKey,
    profile: UserProfile,
    state: SessionState,
    emitter: EventEmitter,
}

impl WorkflowController {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        profiles: Arc<dyn ProfileStore>,
        planner: Arc<dyn Planner>,
        orders: Arc<dyn OrderExecutor>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            sessions,
            profiles,
            planner,
            orders,
            registry: SessionRegistry::new(),
            config,
        }
    }

    pub fn app_name(&self) -> &str {
        &self.config.app_name
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    pub fn profiles(&self) -> &Arc<dyn ProfileStore> {
        &self.profiles
    }

    pub fn is_busy(&self, session_id: &str) -> bool {
        self.registry.is_busy(session_id)
    }

    /// Hold `session_id` against new invocations, e.g. while deleting it.
    pub fn claim(&self, session_id: &str) -> Result<SessionGuard, WorkflowError> {
        self.registry.acquire(session_id)
    }

    /// Hold every session against new invocations. Fails with `SessionBusy`
    /// while any invocation is in flight.
    pub fn claim_all(&self) -> Result<RegistryLock, WorkflowError> {
        self.registry.acquire_all()
    }

    /// Start or continue a session with a fresh utterance.
    ///
    /// Creates the session at `IDLE` when it does not exist yet.
    pub async fn run(&self, request: RunRequest) -> Result<WorkflowRun, WorkflowError> {
        let profile = self.profiles.get(&request.user_id).await?;
        let session_id = request
            .session_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let guard = self.registry.acquire(&session_id)?;

        let key = SessionKey::new(&self.config.app_name, &profile.id, &session_id);
        let state = match self.sessions.get(&key).await {
            Ok(session) => {
                let mut state = SessionState::from_map(session.state)?;
                if request.meal_type.is_some()
                    && matches!(
                        state.workflow_status,
                        WorkflowStatus::Idle | WorkflowStatus::MealPlanningFailed
                    )
                {
                    state.planning.meal_type = request.meal_type.clone();
                }
                state
            }
            Err(StoreError::NotFound(_)) => {
                let state = SessionState::initial(&profile, request.meal_type.as_deref())
                    .with_mock_day(request.mock_day.clone());
                self.sessions.create(&key, state.to_map()?).await?;
                info!(session = %key, "Created session");
                state
            }
            Err(e) => return Err(e.into()),
        };

        let input = request.input.filter(|i| !i.trim().is_empty());
        Ok(self.spawn(guard, key, profile, state, Invocation::Run(input)))
    }

    /// Continue a paused session with a selection or feedback.
    ///
    /// A session that is not awaiting approval is left alone: the call logs
    /// a warning and returns its current status with an empty event stream.
    pub async fn resume(&self, request: ResumeRequest) -> Result<WorkflowRun, WorkflowError> {
        let guard = self.registry.acquire(&request.session_id)?;
        let session = self.sessions.get_by_id(&request.session_id).await?;
        let key = session.key();
        let state = SessionState::from_map(session.state)?;
        let status = state.workflow_status;

        if status != WorkflowStatus::AwaitingUserApproval {
            warn!(session = %key, %status, "Resume ignored, session is not awaiting approval");
            return Ok(WorkflowRun {
                session_id: request.session_id,
                workflow_status: status,
                events: WorkflowEventStream::finished(),
                handle: tokio::spawn(async move { Ok(status) }),
            });
        }

        let input = parse_resume(&request.input, state.meal_choices.len())?;
        let profile = match self.profiles.get(&key.user_id).await {
            Ok(profile) => profile,
            Err(StoreError::NotFound(_)) => profile_from_state(&state),
            Err(e) => return Err(e.into()),
        };

        Ok(self.spawn(guard, key, profile, state, Invocation::Resume(input)))
    }

    fn spawn(
        &self,
        guard: SessionGuard,
        key: SessionKey,
        profile: UserProfile,
        state: SessionState,
        invocation: Invocation,
    ) -> WorkflowRun {
        let (emitter, events) = EventEmitter::channel(
            self.sessions.clone(),
            &key.session_id,
            self.config.stream_buffer,
        );
        let session_id = key.session_id.clone();
        let workflow_status = state.workflow_status;
        let this = self.clone();

        let handle = tokio::spawn(async move {
            let mut drive = Drive {
                key,
                profile,
                state,
                emitter,
            };
            let result = match invocation {
                Invocation::Run(input) => this.drive_run(&mut drive, input).await,
                Invocation::Resume(input) => this.drive_resume(&mut drive, input).await,
            };
            match &result {
                Ok(status) => info!(session = %drive.key, %status, "Invocation finished"),
                Err(e) => {
                    error!(session = %drive.key, kind = e.kind(), "Invocation failed: {}", e);
                    drive.emitter.fail(e).await;
                }
            }
            // Release before the sentinel so a consumer reacting to it can
            // start the next invocation right away.
            drop(guard);
            drive.emitter.done().await;
            result
        });

        WorkflowRun {
            session_id,
            workflow_status,
            events,
            handle,
        }
    }

    async fn drive_run(&self, drive: &mut Drive, input: Option<String>) -> Result<WorkflowStatus, WorkflowError> {
        if input.is_some() {
            drive.state.last_input = input.clone();
        }

        match drive.state.workflow_status {
            WorkflowStatus::Idle => {
                if let Some(reason) = self.skip_reason(&drive.state) {
                    info!(session = %drive.key, "{}", reason);
                    self.transition(drive, WorkflowStatus::NoPlanningNeeded).await?;
                    drive
                        .emitter
                        .emit(WORKFLOW_AUTHOR, WorkflowEvent::text(reason, true))
                        .await;
                    return Ok(drive.state.workflow_status);
                }
                self.plan_phase(drive).await
            }
            WorkflowStatus::MealPlanningFailed => {
                // A retry starts over without the feedback that led nowhere.
                drive.state.user_feedback = None;
                drive.state.meal_options.clear();
                self.plan_phase(drive).await
            }
            WorkflowStatus::MealPlanningStarted | WorkflowStatus::UserRejectionReceived => {
                self.plan_phase(drive).await
            }
            WorkflowStatus::MealPlanningComplete => self.verify_phase(drive).await,
            WorkflowStatus::AwaitingUserApproval => match input {
                Some(utterance) => self.interpret_phase(drive, utterance).await,
                None => {
                    if let Some(prompt) = drive.state.meal_choice_verification_message.clone() {
                        drive
                            .emitter
                            .emit(PLANNER_AUTHOR, WorkflowEvent::text(prompt, true))
                            .await;
                    }
                    Ok(drive.state.workflow_status)
                }
            },
            WorkflowStatus::UserApprovalReceived | WorkflowStatus::PlacingOrder => {
                self.order_phase(drive).await
            }
            status @ (WorkflowStatus::OrderConfirmed | WorkflowStatus::NoPlanningNeeded) => {
                warn!(session = %drive.key, %status, "Run ignored, session is finished");
                Ok(status)
            }
        }
    }

    async fn drive_resume(&self, drive: &mut Drive, input: ResumeInput) -> Result<WorkflowStatus, WorkflowError> {
        match input {
            ResumeInput::Choice(numbers) => self.approve(drive, numbers).await,
            ResumeInput::Feedback(feedback) => self.reject(drive, feedback).await,
        }
    }

    async fn approve(&self, drive: &mut Drive, numbers: Vec<u32>) -> Result<WorkflowStatus, WorkflowError> {
        drive.state.user_choice = numbers;
        if !self
            .transition(drive, WorkflowStatus::UserApprovalReceived)
            .await?
        {
            return Ok(drive.state.workflow_status);
        }
        self.order_phase(drive).await
    }

    async fn reject(&self, drive: &mut Drive, feedback: String) -> Result<WorkflowStatus, WorkflowError> {
        drive.state.user_feedback = Some(feedback);
        drive.state.user_choice.clear();
        if !self
            .transition(drive, WorkflowStatus::UserRejectionReceived)
            .await?
        {
            return Ok(drive.state.workflow_status);
        }
        drive
            .emitter
            .emit(
                PLANNER_AUTHOR,
                WorkflowEvent::text("Got it, looking for something different.", false),
            )
            .await;
        self.plan_phase(drive).await
    }

    /// Why planning is not needed today, if it is not.
    fn skip_reason(&self, state: &SessionState) -> Option<String> {
        if !self.config.enforce_schedule {
            return None;
        }

        let today = match state.mock_day.as_deref() {
            Some(code) => parse_weekday(code).unwrap_or_else(|| {
                warn!(mock_day = code, "Unrecognised mock day, using today");
                Local::now().weekday()
            }),
            None => Local::now().weekday(),
        };
        if !state.schedule.is_active_on(today) {
            return Some(format!("No meals are scheduled on {}.", weekday_name(today)));
        }

        match state.planning.meal_type.as_deref() {
            Some(meal_type) if !state.schedule.has_slot_for(meal_type) => {
                Some(format!("No {} is scheduled.", meal_type))
            }
            _ => None,
        }
    }

    fn plan_request(&self, drive: &Drive, phase: PlanPhase) -> PlanRequest {
        let state = &drive.state;
        let mut request = PlanRequest::new(phase, &drive.key.session_id, drive.profile.clone());
        request.meal_type = state.planning.meal_type.clone();
        request.prior_options = state.meal_options.clone();
        request.choices = state.meal_choices.clone();
        request.feedback = state.user_feedback.clone();
        request.input = state.last_input.clone().unwrap_or_default();
        request.placed_orders = state.order_status.clone();
        request
    }

    async fn call_planner(&self, drive: &Drive, phase: PlanPhase) -> Result<PlannerOutcome, WorkflowError> {
        let request = self.plan_request(drive, phase);
        info!(session = %drive.key, planner = self.planner.name(), %phase, "Calling planner");
        Ok(self.planner.plan(request).await?)
    }

    async fn plan_phase(&self, drive: &mut Drive) -> Result<WorkflowStatus, WorkflowError> {
        if drive.state.workflow_status != WorkflowStatus::MealPlanningStarted
            && !self
                .transition(drive, WorkflowStatus::MealPlanningStarted)
                .await?
        {
            return Ok(drive.state.workflow_status);
        }

        drive
            .emitter
            .emit(
                PLANNER_AUTHOR,
                WorkflowEvent::tool_call(
                    "plan_meals",
                    json!({
                        "meal_type": drive.state.planning.meal_type,
                        "preferences": drive.profile.preferences,
                        "allergies": drive.profile.allergies,
                        "feedback": drive.state.user_feedback,
                    }),
                ),
            )
            .await;

        let options = match self.call_planner(drive, PlanPhase::Planning).await? {
            PlannerOutcome::Options(options) => options,
            other => return Err(unexpected(PlanPhase::Planning, &other)),
        };
        let (options, removed) = strip_allergens(options, &drive.profile.allergies);
        if !removed.is_empty() {
            warn!(session = %drive.key, removed = ?removed, "Dropped planner items conflicting with allergies");
        }

        drive
            .emitter
            .emit(
                PLANNER_AUTHOR,
                WorkflowEvent::tool_response(
                    "plan_meals",
                    json!({"options": options, "removed_items": removed}),
                ),
            )
            .await;

        if options.is_empty() {
            drive.state.meal_options.clear();
            drive.state.meal_choices.clear();
            self.transition(drive, WorkflowStatus::MealPlanningFailed).await?;
            drive
                .emitter
                .emit(
                    PLANNER_AUTHOR,
                    WorkflowEvent::text(
                        "I couldn't find any meals that fit your profile. Ask me to try again.",
                        true,
                    ),
                )
                .await;
            return Ok(drive.state.workflow_status);
        }

        drive.state.meal_choices = number_choices(&options);
        drive.state.meal_options = options;
        drive.state.user_choice.clear();
        if !self
            .transition(drive, WorkflowStatus::MealPlanningComplete)
            .await?
        {
            return Ok(drive.state.workflow_status);
        }
        self.verify_phase(drive).await
    }

    async fn verify_phase(&self, drive: &mut Drive) -> Result<WorkflowStatus, WorkflowError> {
        let prompt = match self.call_planner(drive, PlanPhase::Verification).await? {
            PlannerOutcome::ConfirmationRequested(prompt) => prompt,
            other => return Err(unexpected(PlanPhase::Verification, &other)),
        };

        drive.state.meal_choice_verification_message = Some(prompt.clone());
        self.transition(drive, WorkflowStatus::AwaitingUserApproval).await?;
        drive
            .emitter
            .emit(PLANNER_AUTHOR, WorkflowEvent::text(prompt, true))
            .await;
        Ok(drive.state.workflow_status)
    }

    /// Free-text reply while awaiting approval.
    async fn interpret_phase(&self, drive: &mut Drive, utterance: String) -> Result<WorkflowStatus, WorkflowError> {
        drive.state.last_input = Some(utterance);
        match self.call_planner(drive, PlanPhase::Interpretation).await? {
            PlannerOutcome::Choice(numbers) => {
                let numbers: Vec<u64> = numbers.into_iter().map(u64::from).collect();
                let selected = validate_choices(&numbers, drive.state.meal_choices.len())
                    .map_err(|e| PlannerError::Failed(format!("planner picked an invalid choice: {}", e)))?;
                self.approve(drive, selected).await
            }
            PlannerOutcome::Feedback(feedback) => self.reject(drive, feedback).await,
            other => Err(unexpected(PlanPhase::Interpretation, &other)),
        }
    }

    async fn order_phase(&self, drive: &mut Drive) -> Result<WorkflowStatus, WorkflowError> {
        if drive.state.workflow_status != WorkflowStatus::PlacingOrder
            && !self.transition(drive, WorkflowStatus::PlacingOrder).await?
        {
            return Ok(drive.state.workflow_status);
        }

        let selected = drive.state.selected_choices();
        if selected.is_empty() {
            return Err(WorkflowError::OrderFailure(
                "no selected items to order".to_string(),
            ));
        }

        for order in FoodOrder::group_by_restaurant(&selected) {
            // Orders placed by an earlier, interrupted attempt are kept.
            if drive
                .state
                .order_status
                .iter()
                .any(|placed| placed.restaurant_id == order.restaurant_id)
            {
                continue;
            }

            drive
                .emitter
                .emit(ORDER_AUTHOR, WorkflowEvent::tool_call("place_food_order", json!(order)))
                .await;
            let summary = self.orders.place_order(&order).await?;
            drive.state.order_status.push(summary.clone());
            self.persist(drive).await?;
            drive
                .emitter
                .emit(
                    ORDER_AUTHOR,
                    WorkflowEvent::tool_response("place_food_order", json!(summary)),
                )
                .await;
        }

        let confirmation = match self.call_planner(drive, PlanPhase::Confirmation).await? {
            PlannerOutcome::OrderConfirmation(confirmation) => confirmation,
            other => return Err(unexpected(PlanPhase::Confirmation, &other)),
        };

        let message = confirmation.message.clone();
        drive.state.order_confirmation_message = Some(message.clone());
        drive.state.order_confirmation = Some(confirmation);
        self.transition(drive, WorkflowStatus::OrderConfirmed).await?;
        drive
            .emitter
            .emit(ORDER_AUTHOR, WorkflowEvent::text(message, true))
            .await;
        Ok(drive.state.workflow_status)
    }

    /// Guarded status change. A rejected transition is logged and reported as
    /// `false`; the status stays as it was.
    async fn transition(&self, drive: &mut Drive, to: WorkflowStatus) -> Result<bool, WorkflowError> {
        let from = drive.state.workflow_status;
        if !is_valid_transition(from, to) {
            warn!(session = %drive.key, %from, %to, "Rejected workflow transition");
            return Ok(false);
        }

        drive.state.workflow_status = to;
        if let Err(e) = self.persist(drive).await {
            drive.state.workflow_status = from;
            return Err(e);
        }
        info!(session = %drive.key, %from, %to, "Workflow transition");
        drive
            .emitter
            .emit(WORKFLOW_AUTHOR, WorkflowEvent::StatusUpdate { from, to })
            .await;
        Ok(true)
    }

    async fn persist(&self, drive: &Drive) -> Result<(), WorkflowError> {
        self.sessions
            .update_state(&drive.key, drive.state.to_map()?)
            .await?;
        Ok(())
    }
}

fn unexpected(phase: PlanPhase, outcome: &PlannerOutcome) -> WorkflowError {
    PlannerError::UnexpectedOutcome {
        phase: phase.to_string(),
        outcome: outcome.name().to_string(),
    }
    .into()
}

/// Profile snapshot kept in the session, used when the user record is gone.
fn profile_from_state(state: &SessionState) -> UserProfile {
    UserProfile::new(&state.user_id, &state.user_name)
        .with_preferences(state.user_dietary_preferences.clone())
        .with_allergies(state.user_allergies.clone())
        .with_schedule(state.schedule.clone())
        .with_special_instructions(state.special_instructions.clone())
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
