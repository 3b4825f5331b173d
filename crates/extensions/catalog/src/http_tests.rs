use super::*;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use tower::ServiceExt;

use crate::catalog::StaticCatalog;

fn router() -> Router {
    let catalog: CatalogState = Arc::new(StaticCatalog::embedded().unwrap());
    catalog_router(catalog)
}

async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[test]
fn test_tags_query_split() {
    let query = TagsQuery {
        tags: Some(" Spicy, ,Healthy ".to_string()),
    };
    assert_eq!(query.split(), vec!["Spicy".to_string(), "Healthy".to_string()]);
    assert!(TagsQuery::default().split().is_empty());
}

#[tokio::test]
async fn test_root_reports_count() {
    let (status, body) = get_json("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["restaurant_count"], 8);
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get_json("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_get_restaurant() {
    let (status, body) = get_json("/api/v1/restaurants/r_005").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Bangkok Street");
    assert!(body["menu"].as_array().unwrap().len() >= 3);
}

#[tokio::test]
async fn test_get_restaurant_not_found() {
    let (status, body) = get_json("/api/v1/restaurants/r_404").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("r_404"));
}

#[tokio::test]
async fn test_restaurants_by_cuisine() {
    let (status, body) = get_json("/api/v1/cuisines/thai/restaurants").await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], "r_005");
}

#[tokio::test]
async fn test_restaurants_by_tags() {
    let (_, body) = get_json("/api/v1/tags/restaurants?tags=Late%20Night,Plant-Based").await;
    let ids: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["r_006".to_string(), "r_008".to_string()]);
}

#[tokio::test]
async fn test_menu_items_for_restaurant() {
    let (_, body) = get_json("/api/v1/menu-items?restaurant_id=r_007").await;
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|i| i["restaurant_id"] == "r_007"));
    assert_eq!(items[0]["restaurant_name"], "Olive Grove");
}

#[tokio::test]
async fn test_dietary_tag_listing_and_filter() {
    let (_, tags) = get_json("/api/v1/dietary-tags").await;
    assert!(tags.as_array().unwrap().iter().any(|t| t == "Contains-Peanuts"));

    let (_, items) = get_json("/api/v1/dietary-tags/menu-items?tags=contains-peanuts").await;
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Pad Thai");
}
