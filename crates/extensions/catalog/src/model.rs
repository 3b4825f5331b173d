//! Catalog data model.

use serde::{Deserialize, Serialize};

use autonom_protocols::meal::MealItem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub cuisine: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub delivery_time_min: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub menu: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub calories: u32,
    #[serde(default)]
    pub dietary_tags: Vec<String>,
}

impl From<&MenuItem> for MealItem {
    fn from(item: &MenuItem) -> Self {
        MealItem {
            id: item.id.clone(),
            name: item.name.clone(),
            price: item.price,
            calories: item.calories,
            description: item.description.clone(),
            dietary_tags: item.dietary_tags.clone(),
        }
    }
}

/// A menu item together with the restaurant serving it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub restaurant_id: String,
    pub restaurant_name: String,
    #[serde(flatten)]
    pub item: MenuItem,
}
