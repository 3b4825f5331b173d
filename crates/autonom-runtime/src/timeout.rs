//! Planner wrapper that bounds every call.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use autonom_protocols::error::PlannerError;
use autonom_protocols::planner::{PlanRequest, Planner, PlannerOutcome};

/// Fails a planner call that outlives `timeout` with [`PlannerError::Timeout`].
pub struct TimeoutPlanner {
    inner: Arc<dyn Planner>,
    timeout: Duration,
}

impl TimeoutPlanner {
    pub fn new(inner: Arc<dyn Planner>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl Planner for TimeoutPlanner {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn plan(&self, request: PlanRequest) -> Result<PlannerOutcome, PlannerError> {
        let phase = request.phase;
        match tokio::time::timeout(self.timeout, self.inner.plan(request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    planner = self.inner.name(),
                    %phase,
                    "Planner call timed out after {:?}",
                    self.timeout
                );
                Err(PlannerError::Timeout(self.timeout.as_secs()))
            }
        }
    }
}
