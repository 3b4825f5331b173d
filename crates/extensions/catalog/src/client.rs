//! HTTP client for a remote catalog service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::model::{MenuEntry, Restaurant};

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// [`Catalog`] backed by the routes served by [`crate::catalog_router`].
pub struct HttpCatalog {
    base_url: Url,
    client: Client,
}

impl HttpCatalog {
    pub fn new(base_url: &str) -> Result<Self, CatalogError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| CatalogError::Http(format!("invalid base url {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::Http(format!("{} cannot be a base url", base_url)));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base url plus `segments`, each percent-encoded as one path segment.
    fn url(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url, CatalogError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::Http(format!("{} cannot be a base url", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let url = self.url(segments, query)?;
        tracing::debug!(url = %url, "Catalog request");

        let response = self.client.get(url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(CatalogError::NotFound(segments.join("/"))),
            status if !status.is_success() => {
                let text = response.text().await.unwrap_or_default();
                Err(CatalogError::Http(format!("{}: {}", status.as_u16(), text)))
            }
            _ => Ok(response.json().await?),
        }
    }
}

fn tags_query(tags: &[String]) -> Vec<(&'static str, String)> {
    if tags.is_empty() {
        Vec::new()
    } else {
        vec![("tags", tags.join(","))]
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn restaurants(&self) -> Result<Vec<Restaurant>, CatalogError> {
        self.get_json(&["api", "v1", "restaurants"], &[]).await
    }

    async fn restaurant(&self, id: &str) -> Result<Restaurant, CatalogError> {
        self.get_json(&["api", "v1", "restaurants", id], &[]).await.map_err(|e| match e {
            CatalogError::NotFound(_) => CatalogError::NotFound(id.to_string()),
            other => other,
        })
    }

    async fn cuisines(&self) -> Result<Vec<String>, CatalogError> {
        self.get_json(&["api", "v1", "cuisines"], &[]).await
    }

    async fn restaurants_by_cuisine(&self, cuisine: &str) -> Result<Vec<Restaurant>, CatalogError> {
        self.get_json(&["api", "v1", "cuisines", cuisine, "restaurants"], &[])
            .await
    }

    async fn tags(&self) -> Result<Vec<String>, CatalogError> {
        self.get_json(&["api", "v1", "tags"], &[]).await
    }

    async fn restaurants_by_tags(&self, tags: &[String]) -> Result<Vec<Restaurant>, CatalogError> {
        self.get_json(&["api", "v1", "tags", "restaurants"], &tags_query(tags)).await
    }

    async fn menu_items(&self, restaurant_id: Option<&str>) -> Result<Vec<MenuEntry>, CatalogError> {
        let query: Vec<_> = restaurant_id
            .map(|id| ("restaurant_id", id.to_string()))
            .into_iter()
            .collect();
        self.get_json(&["api", "v1", "menu-items"], &query).await
    }

    async fn dietary_tags(&self) -> Result<Vec<String>, CatalogError> {
        self.get_json(&["api", "v1", "dietary-tags"], &[]).await
    }

    async fn menu_items_by_dietary_tags(&self, tags: &[String]) -> Result<Vec<MenuEntry>, CatalogError> {
        self.get_json(&["api", "v1", "dietary-tags", "menu-items"], &tags_query(tags))
            .await
    }
}
