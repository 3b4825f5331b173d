//! Deterministic meal planner backed by the restaurant catalog.
//!
//! Ranks restaurants against the user's preferences, never proposes an item
//! that violates a listed allergy, and writes the user-facing prompts.

mod planner;
mod prompt;
mod ranking;

pub use planner::CatalogPlanner;
