//! Catalog lookups and the in-process catalog.

use std::collections::BTreeSet;
use std::path::Path;

use async_trait::async_trait;

use crate::error::CatalogError;
use crate::model::{MenuEntry, Restaurant};

const EMBEDDED_RESTAURANTS: &str = include_str!("../data/restaurants.json");

/// Read-only restaurant and menu lookups.
///
/// Filters are case-insensitive. An empty filter set returns everything.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn restaurants(&self) -> Result<Vec<Restaurant>, CatalogError>;

    async fn restaurant(&self, id: &str) -> Result<Restaurant, CatalogError>;

    async fn cuisines(&self) -> Result<Vec<String>, CatalogError>;

    async fn restaurants_by_cuisine(&self, cuisine: &str) -> Result<Vec<Restaurant>, CatalogError>;

    async fn tags(&self) -> Result<Vec<String>, CatalogError>;

    /// Restaurants carrying any of `tags`.
    async fn restaurants_by_tags(&self, tags: &[String]) -> Result<Vec<Restaurant>, CatalogError>;

    /// Menu items, optionally limited to one restaurant.
    async fn menu_items(&self, restaurant_id: Option<&str>) -> Result<Vec<MenuEntry>, CatalogError>;

    async fn dietary_tags(&self) -> Result<Vec<String>, CatalogError>;

    /// Menu items carrying any of `tags`.
    async fn menu_items_by_dietary_tags(&self, tags: &[String]) -> Result<Vec<MenuEntry>, CatalogError>;
}

/// Catalog held in memory, loaded once at construction.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    restaurants: Vec<Restaurant>,
}

impl StaticCatalog {
    pub fn new(restaurants: Vec<Restaurant>) -> Self {
        Self { restaurants }
    }

    /// The restaurant set shipped with the crate.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(EMBEDDED_RESTAURANTS)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub async fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = tokio::fs::read_to_string(path).await?;
        let catalog = Self::from_json(&content)?;
        tracing::info!(count = catalog.len(), path = %path.display(), "Loaded restaurant catalog");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.restaurants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }

    fn entries(&self) -> impl Iterator<Item = MenuEntry> + '_ {
        self.restaurants.iter().flat_map(|r| {
            r.menu.iter().map(move |item| MenuEntry {
                restaurant_id: r.id.clone(),
                restaurant_name: r.name.clone(),
                item: item.clone(),
            })
        })
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    values.cloned().collect::<BTreeSet<_>>().into_iter().collect()
}

fn matches_any(values: &[String], wanted: &[String]) -> bool {
    wanted.is_empty()
        || values
            .iter()
            .any(|v| wanted.iter().any(|w| w.trim().eq_ignore_ascii_case(v)))
}

#[async_trait]
impl Catalog for StaticCatalog {
    async fn restaurants(&self) -> Result<Vec<Restaurant>, CatalogError> {
        Ok(self.restaurants.clone())
    }

    async fn restaurant(&self, id: &str) -> Result<Restaurant, CatalogError> {
        self.restaurants
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    async fn cuisines(&self) -> Result<Vec<String>, CatalogError> {
        Ok(distinct(self.restaurants.iter().map(|r| &r.cuisine)))
    }

    async fn restaurants_by_cuisine(&self, cuisine: &str) -> Result<Vec<Restaurant>, CatalogError> {
        let cuisine = cuisine.trim();
        Ok(self
            .restaurants
            .iter()
            .filter(|r| cuisine.is_empty() || r.cuisine.eq_ignore_ascii_case(cuisine))
            .cloned()
            .collect())
    }

    async fn tags(&self) -> Result<Vec<String>, CatalogError> {
        Ok(distinct(self.restaurants.iter().flat_map(|r| r.tags.iter())))
    }

    async fn restaurants_by_tags(&self, tags: &[String]) -> Result<Vec<Restaurant>, CatalogError> {
        Ok(self
            .restaurants
            .iter()
            .filter(|r| matches_any(&r.tags, tags))
            .cloned()
            .collect())
    }

    async fn menu_items(&self, restaurant_id: Option<&str>) -> Result<Vec<MenuEntry>, CatalogError> {
        Ok(self
            .entries()
            .filter(|e| restaurant_id.is_none_or(|id| e.restaurant_id == id))
            .collect())
    }

    async fn dietary_tags(&self) -> Result<Vec<String>, CatalogError> {
        Ok(distinct(
            self.restaurants
                .iter()
                .flat_map(|r| r.menu.iter())
                .flat_map(|item| item.dietary_tags.iter()),
        ))
    }

    async fn menu_items_by_dietary_tags(&self, tags: &[String]) -> Result<Vec<MenuEntry>, CatalogError> {
        Ok(self
            .entries()
            .filter(|e| matches_any(&e.item.dietary_tags, tags))
            .collect())
    }
}
