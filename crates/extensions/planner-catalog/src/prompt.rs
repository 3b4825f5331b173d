//! User-facing text and utterance interpretation.

use std::fmt::Write;

use autonom_protocols::meal::MealChoice;
use autonom_protocols::order::OrderSummary;
use autonom_protocols::planner::PlannerOutcome;
use autonom_protocols::profile::UserProfile;

const AFFIRMATIVES: &[&str] = &["yes", "y", "ok", "okay", "sure", "sounds good", "perfect", "great"];

/// Numbered list of choices followed by the question.
pub(crate) fn verification_prompt(profile: &UserProfile, choices: &[MealChoice]) -> String {
    let mut prompt = format!("{}, here are your meal options:\n", profile.name);
    for choice in choices {
        let _ = writeln!(
            prompt,
            "{}. {} from {} - ${:.2} ({} cal)",
            choice.number,
            choice.item.name,
            choice.restaurant_name,
            choice.item.price,
            choice.item.calories
        );
    }
    prompt.push_str(
        "Reply with the number(s) of the meals you want, or tell me what you would like instead.",
    );
    prompt
}

fn numbers_in(input: &str) -> Vec<u32> {
    input
        .split(|c: char| !c.is_ascii_digit())
        .filter_map(|part| part.parse().ok())
        .collect()
}

/// Turn a free-text reply into a selection or feedback.
///
/// Numbers win when every number names an existing choice. Otherwise an item
/// name mentioned in the reply selects it, and a bare "yes" accepts a single
/// proposed choice. Anything else is feedback.
pub(crate) fn interpret(input: &str, choices: &[MealChoice]) -> PlannerOutcome {
    let input = input.trim();
    let lowered = input.to_lowercase();

    let mut numbers = numbers_in(input);
    if !numbers.is_empty() && numbers.iter().all(|n| choices.iter().any(|c| c.number == *n)) {
        let mut seen = Vec::new();
        numbers.retain(|n| {
            let fresh = !seen.contains(n);
            seen.push(*n);
            fresh
        });
        return PlannerOutcome::Choice(numbers);
    }

    let named: Vec<u32> = choices
        .iter()
        .filter(|c| lowered.contains(&c.item.name.to_lowercase()))
        .map(|c| c.number)
        .collect();
    if !named.is_empty() {
        return PlannerOutcome::Choice(named);
    }

    let bare = lowered.trim_end_matches(['.', '!']);
    if choices.len() == 1 && AFFIRMATIVES.contains(&bare) {
        return PlannerOutcome::Choice(vec![choices[0].number]);
    }

    PlannerOutcome::Feedback(input.to_string())
}

/// Summary of every placed order, shown once after the last order.
pub(crate) fn confirmation_message(profile: &UserProfile, orders: &[OrderSummary], total: f64) -> String {
    let mut message = format!(
        "Thanks {}! Your {} confirmed.",
        profile.name,
        if orders.len() == 1 { "order is" } else { "orders are" }
    );
    for order in orders {
        let items: Vec<&str> = order.lines.iter().map(|l| l.name.as_str()).collect();
        let _ = write!(
            message,
            " {}: {} (order {}, ${:.2}).",
            order.restaurant_name,
            items.join(", "),
            order.order_id,
            order.subtotal
        );
    }
    let _ = write!(message, " Total: ${:.2}.", total);
    if !profile.special_instructions.trim().is_empty() {
        let _ = write!(message, " Delivery note: {}", profile.special_instructions.trim());
    }
    message
}
