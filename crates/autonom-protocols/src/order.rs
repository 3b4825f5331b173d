//! Orders and the order executor protocol.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::OrderError;
use crate::meal::MealChoice;

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_id: String,
    pub name: String,
    pub price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl OrderLine {
    pub fn total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// An order to be placed with a single restaurant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodOrder {
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub lines: Vec<OrderLine>,
}

impl FoodOrder {
    /// Group selected choices into one order per distinct restaurant,
    /// preserving first-seen restaurant order.
    pub fn group_by_restaurant(choices: &[MealChoice]) -> Vec<FoodOrder> {
        let mut orders: Vec<FoodOrder> = Vec::new();
        for choice in choices {
            let line = OrderLine {
                item_id: choice.item.id.clone(),
                name: choice.item.name.clone(),
                price: choice.item.price,
                quantity: 1,
            };
            match orders
                .iter_mut()
                .find(|o| o.restaurant_id == choice.restaurant_id)
            {
                Some(order) => order.lines.push(line),
                None => orders.push(FoodOrder {
                    restaurant_id: choice.restaurant_id.clone(),
                    restaurant_name: choice.restaurant_name.clone(),
                    lines: vec![line],
                }),
            }
        }
        orders
    }

    pub fn subtotal(&self) -> f64 {
        round_cents(self.lines.iter().map(OrderLine::total).sum())
    }
}

/// Receipt for one placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: String,
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub lines: Vec<OrderLine>,
    pub subtotal: f64,
    pub status: String,
}

/// The single combined confirmation written after all orders are placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub message: String,
    pub orders: Vec<OrderSummary>,
    pub total: f64,
}

impl OrderConfirmation {
    pub fn new(message: impl Into<String>, orders: Vec<OrderSummary>) -> Self {
        let total = round_cents(orders.iter().map(|o| o.subtotal).sum());
        Self {
            message: message.into(),
            orders,
            total,
        }
    }
}

pub(crate) fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Places orders with restaurants.
#[async_trait]
pub trait OrderExecutor: Send + Sync {
    /// Place one order with one restaurant.
    async fn place_order(&self, order: &FoodOrder) -> Result<OrderSummary, OrderError>;
}
