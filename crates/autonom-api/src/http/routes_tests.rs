use super::*;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use tokio::sync::Notify;
use tower::ServiceExt;

use autonom_protocols::error::PlannerError;
use autonom_protocols::meal::{MealItem, MealOption};
use autonom_protocols::order::OrderConfirmation;
use autonom_protocols::planner::{PlanPhase, PlanRequest, Planner, PlannerOutcome};
use autonom_protocols::profile::UserProfile;
use autonom_runtime::{
    ControllerConfig, MemoryProfileStore, MemorySessionStore, MockOrderExecutor,
    WorkflowController,
};

struct FixedPlanner;

#[async_trait]
impl Planner for FixedPlanner {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn plan(&self, request: PlanRequest) -> Result<PlannerOutcome, PlannerError> {
        Ok(match request.phase {
            PlanPhase::Planning => PlannerOutcome::Options(vec![MealOption {
                restaurant_id: "r_001".to_string(),
                restaurant_name: "Sakura House".to_string(),
                description: String::new(),
                items: vec![MealItem {
                    id: "r_001_m_001".to_string(),
                    name: "Salmon Bowl".to_string(),
                    price: 14.0,
                    calories: 600,
                    description: String::new(),
                    dietary_tags: vec!["High-Protein".to_string()],
                }],
            }]),
            PlanPhase::Verification => PlannerOutcome::ConfirmationRequested("Pick 1".to_string()),
            PlanPhase::Interpretation => PlannerOutcome::Feedback(request.input),
            PlanPhase::Confirmation => PlannerOutcome::OrderConfirmation(OrderConfirmation::new(
                "Order confirmed",
                request.placed_orders,
            )),
        })
    }
}

/// Holds the planning phase until `release` is notified.
struct HeldPlanner {
    release: Arc<Notify>,
}

#[async_trait]
impl Planner for HeldPlanner {
    fn name(&self) -> &str {
        "held"
    }

    async fn plan(&self, request: PlanRequest) -> Result<PlannerOutcome, PlannerError> {
        if request.phase == PlanPhase::Planning {
            self.release.notified().await;
        }
        FixedPlanner.plan(request).await
    }
}

fn test_router() -> Router {
    router_with(Arc::new(FixedPlanner))
}

fn router_with(planner: Arc<dyn Planner>) -> Router {
    let controller = WorkflowController::new(
        Arc::new(MemorySessionStore::new()),
        Arc::new(MemoryProfileStore::with_profiles([UserProfile::new("u1", "Ada")])),
        planner,
        Arc::new(MockOrderExecutor::new()),
        ControllerConfig::default(),
    );
    create_router(Arc::new(AppState::new(controller)))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn json_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap()
}

async fn state_value(app: &Router, session_id: &str, key: &str) -> (StatusCode, Value) {
    let (status, body) = send(
        app,
        "GET",
        &format!("/sessions/{}/state/{}", session_id, key),
        None,
    )
    .await;
    (status, json_body(&body))
}

#[tokio::test]
async fn test_health() {
    let app = test_router();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!({"status": "ok"}));
}

#[tokio::test]
async fn test_root_reports_app_name() {
    let app = test_router();
    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["app_name"], "auto_nom_agent");
}

#[tokio::test]
async fn test_user_upsert_and_lookup() {
    let app = test_router();
    let profile = json!({
        "id": "u2",
        "name": "Bo",
        "preferences": ["Vegan"],
        "allergies": ["Gluten"],
    });
    let (status, _) = send(&app, "POST", "/users", Some(profile)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/users/u2", None).await;
    assert_eq!(status, StatusCode::OK);
    let body = json_body(&body);
    assert_eq!(body["name"], "Bo");
    assert_eq!(body["allergies"], json!(["Gluten"]));

    let (_, body) = send(&app, "GET", "/users", None).await;
    assert_eq!(json_body(&body).as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unknown_user_is_404() {
    let app = test_router();
    let (status, body) = send(&app, "GET", "/users/ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_body(&body)["kind"], "not_found");

    let (status, _) = send(&app, "POST", "/users/ghost/meals/lunch/trigger", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_user_id_rejected() {
    let app = test_router();
    let (status, body) = send(&app, "POST", "/users", Some(json!({"id": " ", "name": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body)["kind"], "bad_request");
}

#[tokio::test]
async fn test_streaming_trigger_then_resume() {
    let app = test_router();
    let (status, body) = send(
        &app,
        "POST",
        "/users/u1/meals/lunch/trigger?streaming=true",
        Some(json!({"session_id": "s1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("data: "));
    assert!(body.contains("\"type\":\"ToolCall\""));
    assert!(body.contains("\"workflow_status\":\"AWAITING_USER_APPROVAL\""));
    assert!(body.ends_with("event: done\ndata: {}\n\n"));

    let (status, value) = state_value(&app, "s1", "workflow_status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["value"], "AWAITING_USER_APPROVAL");

    let (status, body) = send(
        &app,
        "POST",
        "/sessions/s1/resume?streaming=true",
        Some(json!({"choice": [1]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("place_food_order"));
    assert!(body.contains("Order confirmed"));
    assert!(body.ends_with("event: done\ndata: {}\n\n"));

    let (_, value) = state_value(&app, "s1", "workflow_status").await;
    assert_eq!(value["value"], "ORDER_CONFIRMED");
}

#[tokio::test]
async fn test_detached_trigger_returns_acceptance() {
    let app = test_router();
    let (status, body) = send(
        &app,
        "POST",
        "/users/u1/meals/dinner/trigger",
        Some(json!({"session_id": "s2"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body = json_body(&body);
    assert_eq!(body["session_id"], "s2");
    assert_eq!(body["workflow_status"], "IDLE");
    assert!(body["timestamp"].is_string());

    let mut status = Value::Null;
    for _ in 0..100 {
        let (_, value) = state_value(&app, "s2", "workflow_status").await;
        status = value["value"].clone();
        if status == "AWAITING_USER_APPROVAL" {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(status, "AWAITING_USER_APPROVAL");
}

#[tokio::test]
async fn test_malformed_resume_is_400() {
    let app = test_router();
    send(
        &app,
        "POST",
        "/users/u1/meals/lunch/trigger?streaming=true",
        Some(json!({"session_id": "s1"})),
    )
    .await;

    let (status, body) = send(&app, "POST", "/sessions/s1/resume", Some(json!({"choice": [5]}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body)["kind"], "malformed_resume");

    let (status, _) = send(&app, "POST", "/sessions/s1/resume", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_resume_unknown_session_is_404() {
    let app = test_router();
    let (status, _) = send(&app, "POST", "/sessions/nope/resume", Some(json!({"choice": 1}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_state_lookup_of_unknown_session_is_404() {
    let app = test_router();
    let (status, value) = state_value(&app, "missing", "workflow_status").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(value["kind"], "not_found");
}

#[tokio::test]
async fn test_session_listing_delete_and_purge() {
    let app = test_router();
    for id in ["s1", "s2"] {
        send(
            &app,
            "POST",
            "/users/u1/meals/lunch/trigger?streaming=true",
            Some(json!({"session_id": id})),
        )
        .await;
    }
    send(
        &app,
        "POST",
        "/sessions/s1/resume?streaming=true",
        Some(json!(1)),
    )
    .await;

    let (_, body) = send(&app, "GET", "/users/u1/sessions", None).await;
    assert_eq!(json_body(&body).as_array().unwrap().len(), 2);
    let (_, body) = send(&app, "GET", "/users/u1/active-sessions", None).await;
    let active = json_body(&body);
    assert_eq!(active.as_array().unwrap().len(), 1);
    assert_eq!(active[0]["id"], "s2");

    let (status, body) = send(&app, "GET", "/users/u1/sessions/s2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["state"]["user_name"], "Ada");
    let (status, _) = send(&app, "GET", "/users/u9/sessions/s2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "DELETE", "/sessions/s2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["deleted"], true);
    let (status, _) = send(&app, "GET", "/sessions/s2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "DELETE", "/sessions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["purged"], 1);
    let (_, body) = send(&app, "GET", "/users/u1/sessions", None).await;
    assert_eq!(json_body(&body), json!([]));
}

#[tokio::test]
async fn test_delete_and_purge_refused_while_run_in_flight() {
    let release = Arc::new(Notify::new());
    let app = router_with(Arc::new(HeldPlanner {
        release: release.clone(),
    }));

    let (status, _) = send(
        &app,
        "POST",
        "/users/u1/meals/lunch/trigger",
        Some(json!({"session_id": "s1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "DELETE", "/sessions", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json_body(&body)["kind"], "session_busy");
    let (status, _) = send(&app, "DELETE", "/sessions/s1", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = state_value(&app, "s1", "workflow_status").await;
    assert_eq!(status, StatusCode::OK);

    release.notify_one();
    let mut purged = Value::Null;
    for _ in 0..100 {
        let (status, body) = send(&app, "DELETE", "/sessions", None).await;
        if status == StatusCode::OK {
            purged = json_body(&body)["purged"].clone();
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(purged, 1);
}
