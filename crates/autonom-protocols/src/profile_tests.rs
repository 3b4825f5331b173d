use super::*;
use serde_json::json;

fn weekday_schedule() -> Schedule {
    serde_json::from_value(json!({
        "days": ["m", "tu", "w", "th", "f"],
        "meals": [
            {"id": 1001, "type": "Lunch", "start": "12:00", "end": "13:00"},
            {"id": "meal_x", "type": "Snack", "start": "16:00", "end": "16:30", "customName": "Tea"}
        ]
    }))
    .unwrap()
}

#[test]
fn test_profile_defaults_for_older_record() {
    let profile: UserProfile = serde_json::from_value(json!({
        "id": "u1",
        "name": "Ada",
        "preferences": ["Vegetarian"],
        "allergies": ["Peanuts"]
    }))
    .unwrap();
    assert_eq!(profile.special_instructions, "");
    assert_eq!(profile.schedule, Schedule::default());
    assert_eq!(profile.allergies, vec!["Peanuts".to_string()]);
}

#[test]
fn test_meal_slot_numeric_id() {
    let schedule = weekday_schedule();
    assert_eq!(schedule.meals[0].id, "1001");
    assert_eq!(schedule.meals[1].id, "meal_x");
    assert_eq!(schedule.meals[1].custom_name.as_deref(), Some("Tea"));
}

#[test]
fn test_schedule_active_days() {
    let schedule = weekday_schedule();
    assert!(schedule.is_active_on(Weekday::Mon));
    assert!(schedule.is_active_on(Weekday::Thu));
    assert!(!schedule.is_active_on(Weekday::Sat));
    assert!(!schedule.is_active_on(Weekday::Sun));
}

#[test]
fn test_empty_schedule_is_always_active() {
    let schedule = Schedule::default();
    assert!(schedule.is_active_on(Weekday::Sun));
    assert!(schedule.has_slot_for("dinner"));
}

#[test]
fn test_slot_lookup_case_insensitive() {
    let schedule = weekday_schedule();
    assert!(schedule.has_slot_for("lunch"));
    assert!(schedule.has_slot_for("tea"));
    assert!(!schedule.has_slot_for("dinner"));
}

#[test]
fn test_parse_weekday_codes() {
    assert_eq!(parse_weekday("m"), Some(Weekday::Mon));
    assert_eq!(parse_weekday("TU"), Some(Weekday::Tue));
    assert_eq!(parse_weekday("th"), Some(Weekday::Thu));
    assert_eq!(parse_weekday("Sunday"), Some(Weekday::Sun));
    assert_eq!(parse_weekday("someday"), None);
}

#[test]
fn test_profile_builder() {
    let profile = UserProfile::new("u1", "Ada")
        .with_preferences(vec!["Vegan".to_string()])
        .with_allergies(vec!["Gluten".to_string()])
        .with_special_instructions("No cilantro");
    assert_eq!(profile.preferences.len(), 1);
    assert_eq!(profile.special_instructions, "No cilantro");
}

#[test]
fn test_meal_slot_serializes_wire_names() {
    let value = serde_json::to_value(&weekday_schedule().meals[1]).unwrap();
    assert_eq!(value["type"], "Snack");
    assert_eq!(value["customName"], "Tea");
}
