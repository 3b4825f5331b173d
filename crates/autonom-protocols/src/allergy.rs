//! Allergy rules applied to every proposed meal item.
//!
//! An allergy is a hard constraint. An item violates an allergy when
//! - a `Contains-*` dietary tag names the allergen or one of its ingredients,
//! - its name or description mentions the allergen or one of its ingredients
//!   (`shrimp` for shellfish, `tofu` for soy), or
//! - the allergen is one catalogs only mark by absence (gluten, dairy, eggs)
//!   and the item is not tagged free of it.
//!
//! Terms match at word starts, so `soybeans` counts for soy and `shellfish`
//! does not count for fish.

use crate::meal::{MealItem, MealOption};

/// Allergens whose presence catalogs do not tag explicitly.
const UNTAGGED_ALLERGENS: &[&str] = &["gluten", "dairy", "egg"];

/// Ingredient words per allergen token. Allergies outside the table match
/// on their own name only.
const ALLERGEN_TERMS: &[(&str, &[&str])] = &[
    ("peanut", &["peanut", "groundnut", "satay"]),
    (
        "tree nut",
        &[
            "tree nut", "almond", "cashew", "walnut", "pecan", "pistachio", "hazelnut",
            "macadamia", "pine nut", "praline", "marzipan",
        ],
    ),
    (
        "nut",
        &[
            "nut", "peanut", "satay", "almond", "cashew", "walnut", "pecan", "pistachio",
            "hazelnut", "macadamia", "pine nut",
        ],
    ),
    (
        "shellfish",
        &[
            "shellfish", "shrimp", "prawn", "crab", "lobster", "scallop", "clam", "mussel",
            "oyster", "crawfish", "crayfish", "langoustine",
        ],
    ),
    (
        "fish",
        &[
            "fish", "salmon", "tuna", "cod", "anchov", "sardine", "tilapia", "halibut", "trout",
            "mackerel", "bonito",
        ],
    ),
    ("soy", &["soy", "tofu", "edamame", "tempeh", "miso", "teriyaki"]),
    (
        "dairy",
        &[
            "dairy", "milk", "cheese", "cheddar", "mozzarella", "parmesan", "butter", "cream",
            "paneer", "yogurt", "ghee",
        ],
    ),
    ("egg", &["egg", "omelet", "mayo", "aioli", "meringue"]),
    ("gluten", &["gluten", "wheat", "flour", "barley", "rye"]),
];

/// Normalise an allergy to a singular lowercase token (`Peanuts` -> `peanut`).
fn allergen_token(allergy: &str) -> String {
    let token = allergy.trim().to_lowercase();
    if let Some(stem) = token.strip_suffix("es") {
        if stem.ends_with("sh") || stem.ends_with("ch") {
            return stem.to_string();
        }
    }
    if let Some(stem) = token.strip_suffix('s') {
        if !stem.is_empty() && !stem.ends_with('s') {
            return stem.to_string();
        }
    }
    token
}

fn terms_for(token: &str) -> Vec<&str> {
    ALLERGEN_TERMS
        .iter()
        .find(|(allergen, _)| *allergen == token)
        .map(|(_, terms)| terms.to_vec())
        .unwrap_or_else(|| vec![token])
}

/// Lowercase words of `text`, each preceded by one space.
fn words(text: &str) -> String {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .fold(String::with_capacity(text.len() + 1), |mut out, word| {
            out.push(' ');
            out.push_str(&word.to_lowercase());
            out
        })
}

fn mentions_any(words: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| words.contains(&format!(" {}", term)))
}

fn declared_free(tags: &[String], token: &str) -> bool {
    let token_words = words(token);
    tags.iter().any(|tag| {
        let tag = tag.to_lowercase();
        if tag == "vegan" {
            return matches!(token, "dairy" | "egg");
        }
        match tag.strip_suffix("-free") {
            Some(body) => {
                let body = words(body);
                body == token_words || (body == " nut" && token.ends_with("nut"))
            }
            None => false,
        }
    })
}

fn violates(item: &MealItem, allergy: &str) -> bool {
    let token = allergen_token(allergy);
    if token.is_empty() {
        return false;
    }
    let terms = terms_for(&token);

    if item.dietary_tags.iter().any(|tag| {
        let tag = tag.to_lowercase();
        tag.strip_prefix("contains-")
            .is_some_and(|body| mentions_any(&words(body), &terms))
    }) {
        return true;
    }

    let free = declared_free(&item.dietary_tags, &token);
    let text = words(&format!("{} {}", item.name, item.description));
    if mentions_any(&text, &terms) && !free {
        return true;
    }

    UNTAGGED_ALLERGENS.contains(&token.as_str()) && !free
}

/// Whether `item` is unsafe for someone with any of `allergies`.
pub fn item_violates_allergies(item: &MealItem, allergies: &[String]) -> bool {
    allergies.iter().any(|allergy| violates(item, allergy))
}

/// Remove unsafe items, then drop options left without items.
///
/// Returns the surviving options and the ids of removed items.
pub fn strip_allergens(
    options: Vec<MealOption>,
    allergies: &[String],
) -> (Vec<MealOption>, Vec<String>) {
    let mut removed = Vec::new();
    let kept = options
        .into_iter()
        .filter_map(|mut option| {
            option.items.retain(|item| {
                let unsafe_item = item_violates_allergies(item, allergies);
                if unsafe_item {
                    removed.push(item.id.clone());
                }
                !unsafe_item
            });
            (!option.items.is_empty()).then_some(option)
        })
        .collect();
    (kept, removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, description: &str, tags: &[&str]) -> MealItem {
        MealItem {
            id: name.to_lowercase().replace(' ', "_"),
            name: name.to_string(),
            price: 10.0,
            calories: 400,
            description: description.to_string(),
            dietary_tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn allergies(list: &[&str]) -> Vec<String> {
        list.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_allergen_token() {
        assert_eq!(allergen_token("Peanuts"), "peanut");
        assert_eq!(allergen_token("Eggs"), "egg");
        assert_eq!(allergen_token("Shellfish"), "shellfish");
        assert_eq!(allergen_token("Fish"), "fish");
        assert_eq!(allergen_token("Gluten"), "gluten");
        assert_eq!(allergen_token(" Tree Nuts "), "tree nut");
    }

    #[test]
    fn test_contains_tag_violates() {
        let salmon = item("Grilled Salmon", "", &["Contains-Fish", "High-Protein"]);
        assert!(item_violates_allergies(&salmon, &allergies(&["Fish"])));
        let omelette = item("Omelette", "", &["Contains-Eggs", "Gluten-Free"]);
        assert!(item_violates_allergies(&omelette, &allergies(&["Eggs"])));
    }

    #[test]
    fn test_name_or_description_mention_violates() {
        let satay = item("Chicken Satay", "with peanut sauce", &["Gluten-Free"]);
        assert!(item_violates_allergies(&satay, &allergies(&["Peanuts"])));
        let pad_thai = item("Peanut Noodles", "", &[]);
        assert!(item_violates_allergies(&pad_thai, &allergies(&["peanut"])));
    }

    #[test]
    fn test_untagged_allergen_requires_free_tag() {
        let pasta = item("Pasta", "", &["Vegetarian"]);
        let bowl = item("Rice Bowl", "", &["Gluten-Free"]);
        assert!(item_violates_allergies(&pasta, &allergies(&["Gluten"])));
        assert!(!item_violates_allergies(&bowl, &allergies(&["Gluten"])));
    }

    #[test]
    fn test_vegan_is_dairy_and_egg_free() {
        let curry = item("Chickpea Curry", "", &["Vegan"]);
        assert!(!item_violates_allergies(&curry, &allergies(&["Dairy", "Eggs"])));
    }

    #[test]
    fn test_free_tag_with_mention_is_safe() {
        let pasta = item("Gluten-free Pasta", "", &["Gluten-Free"]);
        assert!(!item_violates_allergies(&pasta, &allergies(&["Gluten"])));
    }

    #[test]
    fn test_no_allergies_never_violates() {
        let salmon = item("Grilled Salmon", "", &["Contains-Fish"]);
        assert!(!item_violates_allergies(&salmon, &[]));
        assert!(!item_violates_allergies(&salmon, &allergies(&["  "])));
    }

    #[test]
    fn test_strip_allergens_drops_empty_options() {
        let options = vec![
            MealOption {
                restaurant_id: "r_001".to_string(),
                restaurant_name: "Sea".to_string(),
                description: String::new(),
                items: vec![item("Grilled Salmon", "", &["Contains-Fish"])],
            },
            MealOption {
                restaurant_id: "r_002".to_string(),
                restaurant_name: "Garden".to_string(),
                description: String::new(),
                items: vec![
                    item("Tuna Salad", "", &["Contains-Fish"]),
                    item("Veggie Wrap", "", &["Vegan"]),
                ],
            },
        ];
        let (kept, removed) = strip_allergens(options, &allergies(&["Fish"]));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].restaurant_id, "r_002");
        assert_eq!(kept[0].items.len(), 1);
        assert_eq!(removed, vec!["grilled_salmon".to_string(), "tuna_salad".to_string()]);
    }

    fn tom_yum() -> MealItem {
        item(
            "Tom Yum Soup",
            "Hot and sour soup with shrimp, lemongrass and lime.",
            &["Contains-Fish", "Gluten-Free", "Spicy"],
        )
    }

    fn tofu_stir_fry() -> MealItem {
        item(
            "Tofu Stir Fry",
            "Crispy tofu with mixed vegetables in a savory sauce.",
            &["Vegan", "High-Protein"],
        )
    }

    fn chana_masala() -> MealItem {
        item(
            "Chana Masala",
            "Chickpeas simmered in a spiced tomato and onion gravy.",
            &["Vegan", "Gluten-Free", "Spicy"],
        )
    }

    fn assert_unsafe(allergy: &str, items: &[MealItem]) {
        for meal in items {
            assert!(
                item_violates_allergies(meal, &allergies(&[allergy])),
                "{} should be unsafe for {}",
                meal.name,
                allergy
            );
        }
    }

    fn assert_safe(allergy: &str, items: &[MealItem]) {
        for meal in items {
            assert!(
                !item_violates_allergies(meal, &allergies(&[allergy])),
                "{} should be safe for {}",
                meal.name,
                allergy
            );
        }
    }

    #[test]
    fn test_shellfish_caught_by_ingredient() {
        assert_unsafe("Shellfish", &[tom_yum(), item("Crab Cakes", "", &["Gluten-Free"])]);
        assert_unsafe("Shellfish", &[item("Garlic Bread", "", &["Contains-Shrimp"])]);
        assert_safe(
            "Shellfish",
            &[item("Grilled Salmon", "Herb-marinated salmon.", &["Contains-Fish", "Gluten-Free"])],
        );
    }

    #[test]
    fn test_soy_caught_by_ingredient() {
        let edamame = item("Edamame", "Steamed young soybeans lightly salted.", &["Vegan", "Gluten-Free"]);
        let pad_thai = item(
            "Pad Thai",
            "Rice noodles with egg, tofu, bean sprouts and crushed peanuts.",
            &["Contains-Eggs", "Contains-Peanuts"],
        );
        assert_unsafe("Soy", &[tofu_stir_fry(), edamame, pad_thai]);
        assert_safe("Soy", &[chana_masala()]);
    }

    #[test]
    fn test_peanuts() {
        let pad_thai = item("Pad Thai", "", &["Contains-Eggs", "Contains-Peanuts"]);
        assert_unsafe("Peanuts", &[pad_thai, item("Chicken Satay", "", &[])]);
        assert_safe("Peanuts", &[chana_masala(), tofu_stir_fry()]);
    }

    #[test]
    fn test_tree_nuts() {
        let pesto = item("Pesto Linguine", "Basil, parmesan and pine nuts.", &["Vegetarian"]);
        let korma = item("Chicken Korma", "Mild curry with cashew cream.", &["Gluten-Free"]);
        assert_unsafe("Tree Nuts", &[pesto, korma, item("Brownie", "", &["Contains-Tree-Nuts"])]);
        assert_safe(
            "Tree Nuts",
            &[item("Green Curry", "Coconut green curry with vegetables.", &["Vegan"])],
        );
        assert_safe("Tree Nuts", &[item("Seed Granola", "Oats and sunflower seeds.", &["Nut-Free"])]);
    }

    #[test]
    fn test_fish() {
        let tuna = item(
            "Spicy Tuna Roll",
            "Fresh tuna with spicy mayo and cucumber.",
            &["Contains-Fish", "Spicy"],
        );
        assert_unsafe("Fish", &[tuna, tom_yum(), item("Caesar Salad", "with anchovies", &[])]);
        assert_safe("Fish", &[chana_masala(), item("Shellfish Platter", "", &[])]);
    }

    #[test]
    fn test_dairy() {
        let paneer = item("Palak Paneer", "Fresh cheese cubes in a smooth spinach sauce.", &["Vegetarian", "Gluten-Free"]);
        let butter_chicken = item("Butter Chicken", "Tandoori chicken in a creamy tomato butter sauce.", &["Gluten-Free"]);
        assert_unsafe("Dairy", &[paneer, butter_chicken]);
        assert_safe("Dairy", &[chana_masala(), item("Coconut Curry", "coconut cream", &["Dairy-Free"])]);
    }

    #[test]
    fn test_eggs() {
        let carbonara = item(
            "Spaghetti Carbonara",
            "Creamy pasta with pancetta, eggs, and Parmesan cheese.",
            &["Contains-Eggs", "High-Protein"],
        );
        assert_unsafe("Eggs", &[carbonara, item("Fish Tacos", "chipotle mayo", &["Vegetarian"])]);
        assert_safe("Eggs", &[chana_masala(), tofu_stir_fry()]);
    }

    #[test]
    fn test_gluten() {
        let falafel = item("Falafel Plate", "Crispy falafel with hummus, tabbouleh and pita.", &["Vegan"]);
        assert_unsafe("Gluten", &[falafel, tofu_stir_fry()]);
        assert_safe("Gluten", &[chana_masala(), tom_yum()]);
    }

    #[test]
    fn test_words_match_at_word_starts() {
        let text = words("Steamed soybeans, shellfish & Crème");
        assert_eq!(text, " steamed soybeans shellfish crème");
        assert!(mentions_any(&text, &["soy"]));
        assert!(!mentions_any(&text, &["fish"]));
    }

    #[test]
    fn test_strip_allergens_removes_shrimp_for_shellfish() {
        let options = vec![MealOption {
            restaurant_id: "r_005".to_string(),
            restaurant_name: "Bangkok Street".to_string(),
            description: String::new(),
            items: vec![tom_yum(), item("Green Curry", "", &["Vegan", "Gluten-Free"])],
        }];
        let (kept, removed) = strip_allergens(options, &allergies(&["Shellfish", "Soy"]));
        assert_eq!(removed, vec!["tom_yum_soup".to_string()]);
        assert_eq!(kept[0].items.len(), 1);
        assert_eq!(kept[0].items[0].name, "Green Curry");
    }
}
