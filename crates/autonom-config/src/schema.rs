//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub planner: PlannerConfig,

    #[serde(default)]
    pub workflow: WorkflowConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Home of autonom's data and logs (`~/.autonom`).
pub fn autonom_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".autonom"))
        .unwrap_or_else(|| PathBuf::from(".autonom"))
}

/// HTTP host of the workflow API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Session and profile persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `sqlite` or `memory`.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// SQLite database file. Defaults to `~/.autonom/autonom.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Application name written into every session identity.
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

impl StorageConfig {
    pub fn database_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| autonom_dir().join("autonom.db"))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: None,
            app_name: default_app_name(),
        }
    }
}

fn default_backend() -> String {
    "sqlite".to_string()
}

fn default_app_name() -> String {
    "auto_nom_agent".to_string()
}

/// Restaurant catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Remote catalog service. When unset the embedded catalog is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// JSON restaurant data for the embedded catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_catalog_port")]
    pub port: u16,

    #[serde(default = "default_catalog_timeout")]
    pub timeout_seconds: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            data_path: None,
            host: default_host(),
            port: default_catalog_port(),
            timeout_seconds: default_catalog_timeout(),
        }
    }
}

fn default_catalog_port() -> u16 {
    8000
}

fn default_catalog_timeout() -> u64 {
    10
}

/// Planner boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "default_planner_timeout")]
    pub timeout_seconds: u64,

    /// Restaurants proposed per planning round.
    #[serde(default = "default_options_count")]
    pub options_count: usize,

    /// Menu items proposed per restaurant.
    #[serde(default = "default_items_per_option")]
    pub items_per_option: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_planner_timeout(),
            options_count: default_options_count(),
            items_per_option: default_items_per_option(),
        }
    }
}

fn default_planner_timeout() -> u64 {
    60
}

fn default_options_count() -> usize {
    3
}

fn default_items_per_option() -> usize {
    1
}

/// Workflow controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Event channel capacity between a run and its consumer.
    #[serde(default = "default_stream_buffer")]
    pub stream_buffer: usize,

    /// Skip planning on days or meals the schedule does not cover.
    #[serde(default = "default_true")]
    pub enforce_schedule: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            stream_buffer: default_stream_buffer(),
            enforce_schedule: default_true(),
        }
    }
}

fn default_stream_buffer() -> usize {
    100
}

fn default_true() -> bool {
    true
}

/// Log output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    /// Rolling log directory. Defaults to `~/.autonom/logs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn log_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| autonom_dir().join("logs"))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: None,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
