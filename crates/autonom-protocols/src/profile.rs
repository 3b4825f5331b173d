//! User profiles and the profile store protocol.

use async_trait::async_trait;
use chrono::Weekday;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::StoreError;

/// A user's standing dietary profile.
///
/// Fields added after the first schema default when absent, so older records
/// still deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub preferences: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default)]
    pub special_instructions: String,
}

impl UserProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            preferences: Vec::new(),
            allergies: Vec::new(),
            schedule: Schedule::default(),
            special_instructions: String::new(),
        }
    }

    pub fn with_preferences(mut self, preferences: Vec<String>) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn with_allergies(mut self, allergies: Vec<String>) -> Self {
        self.allergies = allergies;
        self
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_special_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.special_instructions = instructions.into();
        self
    }
}

/// Active days plus meal slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Day codes such as `m`, `tu`, `w`, `th`, `f`, `sa`, `su`.
    #[serde(default)]
    pub days: Vec<String>,
    #[serde(default)]
    pub meals: Vec<MealSlot>,
}

impl Schedule {
    /// An empty day list means every day is active.
    pub fn is_active_on(&self, day: Weekday) -> bool {
        self.days.is_empty()
            || self
                .days
                .iter()
                .filter_map(|d| parse_weekday(d))
                .any(|d| d == day)
    }

    /// An empty slot list accepts any meal type.
    pub fn has_slot_for(&self, meal_type: &str) -> bool {
        self.meals.is_empty() || self.slot_for(meal_type).is_some()
    }

    /// Slot whose type or custom name matches, case-insensitively.
    pub fn slot_for(&self, meal_type: &str) -> Option<&MealSlot> {
        let wanted = meal_type.trim();
        self.meals.iter().find(|slot| {
            slot.meal_type.eq_ignore_ascii_case(wanted)
                || slot
                    .custom_name
                    .as_deref()
                    .is_some_and(|name| name.eq_ignore_ascii_case(wanted))
        })
    }
}

/// One recurring meal window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealSlot {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "type")]
    pub meal_type: String,
    pub start: String,
    pub end: String,
    #[serde(rename = "customName", default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
}

/// Parse a day code or name (`m`, `tue`, `Thursday`, ...).
pub fn parse_weekday(code: &str) -> Option<Weekday> {
    let code = code.trim().to_ascii_lowercase();
    let weekday = match code.as_str() {
        "m" | "mo" | "mon" | "monday" => Weekday::Mon,
        "t" | "tu" | "tue" | "tues" | "tuesday" => Weekday::Tue,
        "w" | "we" | "wed" | "wednesday" => Weekday::Wed,
        "th" | "thu" | "thur" | "thurs" | "thursday" => Weekday::Thu,
        "f" | "fr" | "fri" | "friday" => Weekday::Fri,
        "s" | "sa" | "sat" | "saturday" => Weekday::Sat,
        "su" | "sun" | "sunday" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// Durable user profile storage.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Insert or fully replace the profile keyed by `profile.id`.
    async fn upsert(&self, profile: &UserProfile) -> Result<(), StoreError>;

    /// Fetch a profile, or [`StoreError::NotFound`].
    async fn get(&self, user_id: &str) -> Result<UserProfile, StoreError>;

    /// All profiles ordered by id.
    async fn list_all(&self) -> Result<Vec<UserProfile>, StoreError>;
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
