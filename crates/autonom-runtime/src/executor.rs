//! Order executor that places orders in memory.

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use autonom_protocols::error::OrderError;
use autonom_protocols::order::{FoodOrder, OrderExecutor, OrderSummary};

pub const ORDER_PLACED: &str = "ORDER_PLACED";

/// Accepts every non-empty order and remembers what it placed.
#[derive(Default)]
pub struct MockOrderExecutor {
    placed: Mutex<Vec<OrderSummary>>,
}

impl MockOrderExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Orders placed so far, oldest first.
    pub fn placed(&self) -> Vec<OrderSummary> {
        self.placed.lock().clone()
    }
}

#[async_trait]
impl OrderExecutor for MockOrderExecutor {
    async fn place_order(&self, order: &FoodOrder) -> Result<OrderSummary, OrderError> {
        if order.lines.is_empty() {
            return Err(OrderError::Rejected {
                restaurant_id: order.restaurant_id.clone(),
                reason: "order has no items".to_string(),
            });
        }

        let summary = OrderSummary {
            order_id: Uuid::new_v4().to_string(),
            restaurant_id: order.restaurant_id.clone(),
            restaurant_name: order.restaurant_name.clone(),
            lines: order.lines.clone(),
            subtotal: order.subtotal(),
            status: ORDER_PLACED.to_string(),
        };
        tracing::info!(
            order_id = %summary.order_id,
            restaurant_id = %summary.restaurant_id,
            subtotal = summary.subtotal,
            "Placed order"
        );
        self.placed.lock().push(summary.clone());
        Ok(summary)
    }
}
