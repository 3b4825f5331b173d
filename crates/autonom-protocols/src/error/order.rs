//! Order executor errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order rejected by {restaurant_id}: {reason}")]
    Rejected { restaurant_id: String, reason: String },

    #[error("Order backend unavailable: {0}")]
    Unavailable(String),
}
