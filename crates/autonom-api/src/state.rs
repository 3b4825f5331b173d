//! Application state.

use std::sync::Arc;
use std::time::Instant;

use autonom_protocols::profile::ProfileStore;
use autonom_protocols::session::SessionStore;
use autonom_runtime::WorkflowController;

/// Shared across handlers.
pub struct AppState {
    pub controller: WorkflowController,
    start_time: Instant,
}

impl AppState {
    pub fn new(controller: WorkflowController) -> Self {
        Self {
            controller,
            start_time: Instant::now(),
        }
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        self.controller.sessions()
    }

    pub fn profiles(&self) -> &Arc<dyn ProfileStore> {
        self.controller.profiles()
    }

    pub fn app_name(&self) -> &str {
        self.controller.app_name()
    }

    pub fn uptime(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}
