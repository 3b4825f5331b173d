use super::*;
use crate::meal::{number_choices, MealItem};
use serde_json::json;

fn profile() -> UserProfile {
    UserProfile::new("u1", "Ada")
        .with_preferences(vec!["Vegetarian".to_string()])
        .with_allergies(vec!["Peanuts".to_string()])
        .with_special_instructions("Leave at door")
}

#[test]
fn test_initial_state_from_profile() {
    let state = SessionState::initial(&profile(), Some("lunch"));
    assert_eq!(state.workflow_status, WorkflowStatus::Idle);
    assert_eq!(state.user_id, "u1");
    assert_eq!(state.user_allergies, vec!["Peanuts".to_string()]);
    assert_eq!(state.planning.meal_type.as_deref(), Some("lunch"));
    assert!(state.meal_options.is_empty());
}

#[test]
fn test_map_round_trip_keeps_unknown_keys() {
    let mut map = SessionState::initial(&profile(), None).to_map().unwrap();
    map.insert("planner_notes".to_string(), json!({"k": "v"}));

    let state = SessionState::from_map(map).unwrap();
    assert_eq!(state.extra["planner_notes"], json!({"k": "v"}));

    let map = state.to_map().unwrap();
    assert_eq!(map["workflow_status"], "IDLE");
    assert_eq!(map["planner_notes"]["k"], "v");
    assert_eq!(map["planning"]["meal_type"], serde_json::Value::Null);
}

#[test]
fn test_from_map_missing_status_defaults_idle() {
    let mut map = StateMap::new();
    map.insert("user_id".to_string(), json!("u1"));
    let state = SessionState::from_map(map).unwrap();
    assert_eq!(state.workflow_status, WorkflowStatus::Idle);
}

#[test]
fn test_from_map_unknown_status_fails() {
    let mut map = StateMap::new();
    map.insert("workflow_status".to_string(), json!("INITIALIZE"));
    assert!(SessionState::from_map(map).is_err());
}

#[test]
fn test_selected_choices() {
    let mut state = SessionState::initial(&profile(), None);
    let item = |id: &str| MealItem {
        id: id.to_string(),
        name: id.to_string(),
        price: 5.0,
        calories: 100,
        description: String::new(),
        dietary_tags: Vec::new(),
    };
    state.meal_options = vec![
        MealOption {
            restaurant_id: "r_001".to_string(),
            restaurant_name: "One".to_string(),
            description: String::new(),
            items: vec![item("a"), item("b")],
        },
        MealOption {
            restaurant_id: "r_002".to_string(),
            restaurant_name: "Two".to_string(),
            description: String::new(),
            items: vec![item("c")],
        },
    ];
    state.meal_choices = number_choices(&state.meal_options);
    state.user_choice = vec![3, 1];

    let selected = state.selected_choices();
    assert_eq!(selected.len(), 2);
    assert_eq!(selected[0].item.id, "c");
    assert_eq!(selected[1].item.id, "a");
}
