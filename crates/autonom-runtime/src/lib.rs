//! # autonom Runtime
//!
//! Drives meal-ordering sessions through their workflow phases.
//!
//! - [`WorkflowController`] - run/resume entry points and the phase loop
//! - [`SessionRegistry`] - single-flight guard per session id
//! - [`WorkflowEventStream`] - ordered events of one run/resume invocation
//! - [`MemorySessionStore`] / [`MemoryProfileStore`] - non-durable stores
//! - [`TimeoutPlanner`] - bounds every planner call
//! - [`MockOrderExecutor`] - places orders without a real backend

pub mod controller;
pub mod executor;
pub mod memory_store;
pub mod registry;
pub mod resume;
pub mod stream;
pub mod timeout;

pub use controller::{ControllerConfig, ResumeRequest, RunRequest, WorkflowController, WorkflowRun};
pub use executor::MockOrderExecutor;
pub use memory_store::{MemoryProfileStore, MemorySessionStore};
pub use registry::{RegistryLock, SessionGuard, SessionRegistry};
pub use resume::{parse_resume, ResumeInput};
pub use stream::{EventEmitter, StreamFailure, StreamItem, WorkflowEventStream};
pub use timeout::TimeoutPlanner;
