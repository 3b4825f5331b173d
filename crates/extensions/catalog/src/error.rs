//! Catalog errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Restaurant not found: {0}")]
    NotFound(String),

    #[error("Catalog request failed: {0}")]
    Http(String),

    #[error("Invalid catalog data: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
