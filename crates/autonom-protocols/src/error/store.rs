//! Store errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = StoreError::NotFound("session s1".to_string());
        assert!(err.to_string().contains("Not found"));
        assert!(err.to_string().contains("s1"));
    }

    #[test]
    fn test_duplicate_key_display() {
        let err = StoreError::DuplicateKey("s1".to_string());
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn test_serialization_from() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = StoreError::from(json_err);
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
