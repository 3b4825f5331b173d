//! Meal options proposed by the planner and the numbered choices shown to the user.

use serde::{Deserialize, Serialize};

/// A menu item inside a meal option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub calories: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dietary_tags: Vec<String>,
}

/// One restaurant plus the items proposed from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealOption {
    pub restaurant_id: String,
    pub restaurant_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub items: Vec<MealItem>,
}

/// A single selectable item, numbered from 1 across all options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealChoice {
    pub number: u32,
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub item: MealItem,
}

/// Flatten options into choices; two items from one restaurant are two choices.
pub fn number_choices(options: &[MealOption]) -> Vec<MealChoice> {
    options
        .iter()
        .flat_map(|option| {
            option.items.iter().map(move |item| (option, item))
        })
        .enumerate()
        .map(|(index, (option, item))| MealChoice {
            number: index as u32 + 1,
            restaurant_id: option.restaurant_id.clone(),
            restaurant_name: option.restaurant_name.clone(),
            item: item.clone(),
        })
        .collect()
}
