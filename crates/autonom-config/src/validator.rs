//! Configuration validation.

use crate::schema::Config;

const STORAGE_BACKENDS: &[&str] = &["sqlite", "memory"];

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: &str, message: impl Into<String>) {
        self.errors.push(ValidationError {
            path: path.to_string(),
            message: message.into(),
        });
    }

    fn warning(&mut self, path: &str, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.to_string(),
            message: message.into(),
        });
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        if config.server.port == 0 {
            result.error("server.port", "Port cannot be 0");
        }
        if config.server.host.is_empty() {
            result.error("server.host", "Host cannot be empty");
        }

        if !STORAGE_BACKENDS.contains(&config.storage.backend.as_str()) {
            result.error(
                "storage.backend",
                format!(
                    "Unknown backend '{}', expected one of {:?}",
                    config.storage.backend, STORAGE_BACKENDS
                ),
            );
        }
        if config.storage.app_name.trim().is_empty() {
            result.error("storage.app_name", "app_name cannot be empty");
        }

        if config.catalog.port == 0 {
            result.error("catalog.port", "Port cannot be 0");
        }
        if let Some(url) = &config.catalog.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                result.error("catalog.base_url", "base_url must be an http(s) URL");
            }
        }

        if config.planner.options_count == 0 {
            result.error("planner.options_count", "options_count must be greater than 0");
        }
        if config.planner.items_per_option == 0 {
            result.error("planner.items_per_option", "items_per_option must be greater than 0");
        }
        if config.planner.timeout_seconds == 0 {
            result.error("planner.timeout_seconds", "timeout_seconds must be greater than 0");
        } else if config.planner.timeout_seconds > 600 {
            result.warning(
                "planner.timeout_seconds",
                "timeout is very high (>600s), sessions may sit in a phase for a long time",
            );
        }

        if config.workflow.stream_buffer == 0 {
            result.error("workflow.stream_buffer", "stream_buffer must be greater than 0");
        }

        result
    }
}
