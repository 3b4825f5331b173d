//! Error types for the autonom protocol layer.

mod order;
mod planner;
mod store;
mod workflow;

pub use order::*;
pub use planner::*;
pub use store::*;
pub use workflow::*;
