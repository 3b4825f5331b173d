//! Restaurant ranking.

use std::cmp::Ordering;

use autonom_catalog::Restaurant;
use autonom_protocols::allergy::item_violates_allergies;
use autonom_protocols::meal::{MealItem, MealOption};
use autonom_protocols::planner::PlanRequest;

const CUISINE_WEIGHT: u32 = 3;
const TAG_WEIGHT: u32 = 2;

/// Case-insensitive label comparison that treats spaces and hyphens alike.
fn normalize(label: &str) -> String {
    label.trim().to_lowercase().replace(' ', "-")
}

fn matches_preference(preferences: &[String], label: &str) -> bool {
    let label = normalize(label);
    preferences.iter().any(|p| normalize(p) == label)
}

fn item_score(item: &MealItem, preferences: &[String]) -> u32 {
    item.dietary_tags
        .iter()
        .filter(|tag| matches_preference(preferences, tag))
        .count() as u32
}

const NEGATIONS: &[&str] = &[
    "no", "not", "don't", "dont", "without", "hate", "avoid", "never", "except",
];

/// How a piece of feedback refers to a cuisine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mention {
    None,
    Wanted,
    Unwanted,
}

fn cuisine_mention(feedback: &str, cuisine: &str) -> Mention {
    let feedback = feedback.to_lowercase();
    let cuisine = cuisine.trim().to_lowercase();
    if cuisine.is_empty() || !feedback.contains(&cuisine) {
        return Mention::None;
    }
    let negated = feedback
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .any(|word| NEGATIONS.contains(&word));
    if negated {
        Mention::Unwanted
    } else {
        Mention::Wanted
    }
}

/// Restaurants the user has already turned down in this session.
///
/// Only applies when the user gave feedback: every previously proposed
/// restaurant is out, as is any cuisine the feedback rules out.
fn rejected(restaurant: &Restaurant, request: &PlanRequest) -> bool {
    let Some(feedback) = request.feedback.as_deref() else {
        return false;
    };
    request
        .prior_options
        .iter()
        .any(|o| o.restaurant_id == restaurant.id)
        || cuisine_mention(feedback, &restaurant.cuisine) == Mention::Unwanted
}

#[derive(Debug)]
struct Candidate {
    score: u32,
    rating: f64,
    option: MealOption,
}

fn candidate(restaurant: &Restaurant, request: &PlanRequest, items_per_option: usize) -> Option<Candidate> {
    let profile = &request.profile;
    let preferences = &profile.preferences;

    let mut items: Vec<(u32, MealItem)> = restaurant
        .menu
        .iter()
        .map(MealItem::from)
        .filter(|item| !item_violates_allergies(item, &profile.allergies))
        .map(|item| (item_score(&item, preferences), item))
        .collect();
    if items.is_empty() {
        return None;
    }

    let mut score: u32 = items.iter().map(|(s, _)| *s).sum();
    if matches_preference(preferences, &restaurant.cuisine) {
        score += CUISINE_WEIGHT;
    }
    if let Some(feedback) = request.feedback.as_deref() {
        if cuisine_mention(feedback, &restaurant.cuisine) == Mention::Wanted {
            score += CUISINE_WEIGHT;
        }
    }
    score += TAG_WEIGHT
        * restaurant
            .tags
            .iter()
            .filter(|tag| matches_preference(preferences, tag))
            .count() as u32;

    // Stable sort keeps menu order among equally scored items.
    items.sort_by(|a, b| b.0.cmp(&a.0));
    items.truncate(items_per_option.max(1));

    Some(Candidate {
        score,
        rating: restaurant.rating,
        option: MealOption {
            restaurant_id: restaurant.id.clone(),
            restaurant_name: restaurant.name.clone(),
            description: format!(
                "{} cuisine, rated {:.1}, about {} min",
                restaurant.cuisine, restaurant.rating, restaurant.delivery_time_min
            ),
            items: items.into_iter().map(|(_, item)| item).collect(),
        },
    })
}

/// Pick up to `options_count` restaurants, best first.
///
/// Ordering is score descending, then rating descending, then id ascending.
pub(crate) fn rank(
    restaurants: &[Restaurant],
    request: &PlanRequest,
    options_count: usize,
    items_per_option: usize,
) -> Vec<MealOption> {
    let mut candidates: Vec<Candidate> = restaurants
        .iter()
        .filter(|r| !rejected(r, request))
        .filter_map(|r| candidate(r, request, items_per_option))
        .collect();

    candidates.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal))
            .then_with(|| a.option.restaurant_id.cmp(&b.option.restaurant_id))
    });
    candidates
        .into_iter()
        .take(options_count)
        .map(|c| c.option)
        .collect()
}
