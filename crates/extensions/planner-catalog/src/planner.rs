//! Catalog-backed planner.

use std::sync::Arc;

use async_trait::async_trait;

use autonom_catalog::Catalog;
use autonom_protocols::error::PlannerError;
use autonom_protocols::order::OrderConfirmation;
use autonom_protocols::planner::{PlanPhase, PlanRequest, Planner, PlannerOutcome};

use crate::prompt::{confirmation_message, interpret, verification_prompt};
use crate::ranking::rank;

#[cfg(test)]
#[path = "planner_tests.rs"]
mod tests;

const DEFAULT_OPTIONS_COUNT: usize = 3;
const DEFAULT_ITEMS_PER_OPTION: usize = 1;

/// Planner that proposes meals straight from the catalog.
pub struct CatalogPlanner {
    catalog: Arc<dyn Catalog>,
    options_count: usize,
    items_per_option: usize,
}

impl CatalogPlanner {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self {
            catalog,
            options_count: DEFAULT_OPTIONS_COUNT,
            items_per_option: DEFAULT_ITEMS_PER_OPTION,
        }
    }

    pub fn with_options_count(mut self, count: usize) -> Self {
        self.options_count = count;
        self
    }

    pub fn with_items_per_option(mut self, count: usize) -> Self {
        self.items_per_option = count;
        self
    }

    async fn propose(&self, request: &PlanRequest) -> Result<PlannerOutcome, PlannerError> {
        let restaurants = self
            .catalog
            .restaurants()
            .await
            .map_err(|e| PlannerError::Failed(format!("catalog unavailable: {}", e)))?;

        let options = rank(&restaurants, request, self.options_count, self.items_per_option);
        tracing::debug!(
            session_id = %request.session_id,
            count = options.len(),
            feedback = request.feedback.is_some(),
            "Proposed meal options"
        );
        Ok(PlannerOutcome::Options(options))
    }
}

#[async_trait]
impl Planner for CatalogPlanner {
    fn name(&self) -> &str {
        "catalog"
    }

    async fn plan(&self, request: PlanRequest) -> Result<PlannerOutcome, PlannerError> {
        match request.phase {
            PlanPhase::Planning => self.propose(&request).await,
            PlanPhase::Verification => {
                if request.choices.is_empty() {
                    return Err(PlannerError::Failed("no choices to verify".to_string()));
                }
                Ok(PlannerOutcome::ConfirmationRequested(verification_prompt(
                    &request.profile,
                    &request.choices,
                )))
            }
            PlanPhase::Interpretation => {
                if request.input.trim().is_empty() {
                    return Err(PlannerError::Failed("empty reply".to_string()));
                }
                Ok(interpret(&request.input, &request.choices))
            }
            PlanPhase::Confirmation => {
                let mut confirmation = OrderConfirmation::new(String::new(), request.placed_orders);
                confirmation.message =
                    confirmation_message(&request.profile, &confirmation.orders, confirmation.total);
                Ok(PlannerOutcome::OrderConfirmation(confirmation))
            }
        }
    }
}
