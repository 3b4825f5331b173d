//! Catalog HTTP routes.
//!
//! - GET /                                   - Service status and restaurant count
//! - GET /health                             - Liveness
//! - GET /api/v1/restaurants                 - All restaurants
//! - GET /api/v1/restaurants/{id}            - One restaurant
//! - GET /api/v1/cuisines                    - Distinct cuisines
//! - GET /api/v1/cuisines/{cuisine}/restaurants
//! - GET /api/v1/tags                        - Distinct restaurant tags
//! - GET /api/v1/tags/restaurants?tags=a,b
//! - GET /api/v1/menu-items?restaurant_id=
//! - GET /api/v1/dietary-tags                - Distinct item dietary tags
//! - GET /api/v1/dietary-tags/menu-items?tags=a,b

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::catalog::Catalog;
use crate::error::CatalogError;

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;

type CatalogState = Arc<dyn Catalog>;

#[derive(Debug, Default, Deserialize)]
pub struct TagsQuery {
    pub tags: Option<String>,
}

impl TagsQuery {
    fn split(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MenuQuery {
    pub restaurant_id: Option<String>,
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = match &self {
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::Http(_) => StatusCode::BAD_GATEWAY,
            CatalogError::Decode(_) | CatalogError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Catalog request failed: {}", self);
        }
        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}

fn respond<T: Serialize>(result: Result<T, CatalogError>) -> Response {
    match result {
        Ok(value) => Json(value).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Build the catalog router over any [`Catalog`].
pub fn catalog_router(catalog: CatalogState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/v1/restaurants", get(list_restaurants))
        .route("/api/v1/restaurants/{id}", get(get_restaurant))
        .route("/api/v1/cuisines", get(list_cuisines))
        .route("/api/v1/cuisines/{cuisine}/restaurants", get(restaurants_by_cuisine))
        .route("/api/v1/tags", get(list_tags))
        .route("/api/v1/tags/restaurants", get(restaurants_by_tags))
        .route("/api/v1/menu-items", get(list_menu_items))
        .route("/api/v1/dietary-tags", get(list_dietary_tags))
        .route("/api/v1/dietary-tags/menu-items", get(menu_items_by_dietary_tags))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(catalog)
}

async fn root(State(catalog): State<CatalogState>) -> Response {
    match catalog.restaurants().await {
        Ok(restaurants) => Json(json!({
            "status": "ok",
            "restaurant_count": restaurants.len(),
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn list_restaurants(State(catalog): State<CatalogState>) -> Response {
    respond(catalog.restaurants().await)
}

async fn get_restaurant(State(catalog): State<CatalogState>, Path(id): Path<String>) -> Response {
    respond(catalog.restaurant(&id).await)
}

async fn list_cuisines(State(catalog): State<CatalogState>) -> Response {
    respond(catalog.cuisines().await)
}

async fn restaurants_by_cuisine(
    State(catalog): State<CatalogState>,
    Path(cuisine): Path<String>,
) -> Response {
    respond(catalog.restaurants_by_cuisine(&cuisine).await)
}

async fn list_tags(State(catalog): State<CatalogState>) -> Response {
    respond(catalog.tags().await)
}

async fn restaurants_by_tags(
    State(catalog): State<CatalogState>,
    Query(query): Query<TagsQuery>,
) -> Response {
    respond(catalog.restaurants_by_tags(&query.split()).await)
}

async fn list_menu_items(
    State(catalog): State<CatalogState>,
    Query(query): Query<MenuQuery>,
) -> Response {
    respond(catalog.menu_items(query.restaurant_id.as_deref()).await)
}

async fn list_dietary_tags(State(catalog): State<CatalogState>) -> Response {
    respond(catalog.dietary_tags().await)
}

async fn menu_items_by_dietary_tags(
    State(catalog): State<CatalogState>,
    Query(query): Query<TagsQuery>,
) -> Response {
    respond(catalog.menu_items_by_dietary_tags(&query.split()).await)
}
