//! Parsing of resume input into a selection or feedback.
//!
//! Accepted shapes:
//! - a number or an array of numbers: a selection
//! - `{"choice": ...}`: whatever the inner value parses to
//! - `{"feedback": "..."}`: feedback
//! - a string of numbers and separators (`"1, 3"`): a selection
//! - any other non-blank string: feedback
//!
//! Everything else, and any number outside `1..=choice_count`, is
//! [`WorkflowError::MalformedResume`].

use serde_json::Value;

use autonom_protocols::error::WorkflowError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeInput {
    Choice(Vec<u32>),
    Feedback(String),
}

fn malformed(reason: impl Into<String>) -> WorkflowError {
    WorkflowError::MalformedResume(reason.into())
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | ';' | '/' | '&' | '+')
}

/// `Some` when `text` holds only numbers and separators.
fn numeric_selection(text: &str) -> Option<Vec<u64>> {
    if !text.chars().all(|c| c.is_ascii_digit() || is_separator(c)) {
        return None;
    }
    let numbers: Vec<u64> = text
        .split(is_separator)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse().ok())
        .collect::<Option<_>>()?;
    if numbers.is_empty() { None } else { Some(numbers) }
}

fn number(value: &Value) -> Result<u64, WorkflowError> {
    value
        .as_u64()
        .ok_or_else(|| malformed(format!("{} is not a choice number", value)))
}

/// Validate numbers against the offered choices and drop repeats.
pub fn validate_choices(numbers: &[u64], choice_count: usize) -> Result<Vec<u32>, WorkflowError> {
    if numbers.is_empty() {
        return Err(malformed("empty selection"));
    }
    let mut selected: Vec<u32> = Vec::with_capacity(numbers.len());
    for &n in numbers {
        if n == 0 || n > choice_count as u64 {
            return Err(malformed(format!(
                "choice {} is out of range 1..={}",
                n, choice_count
            )));
        }
        let n = n as u32;
        if !selected.contains(&n) {
            selected.push(n);
        }
    }
    Ok(selected)
}

pub fn parse_resume(input: &Value, choice_count: usize) -> Result<ResumeInput, WorkflowError> {
    match input {
        Value::Number(_) => Ok(ResumeInput::Choice(validate_choices(
            &[number(input)?],
            choice_count,
        )?)),
        Value::Array(items) => {
            let numbers = items.iter().map(number).collect::<Result<Vec<_>, _>>()?;
            Ok(ResumeInput::Choice(validate_choices(&numbers, choice_count)?))
        }
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(malformed("blank input"));
            }
            match numeric_selection(text) {
                Some(numbers) => Ok(ResumeInput::Choice(validate_choices(&numbers, choice_count)?)),
                None => Ok(ResumeInput::Feedback(text.to_string())),
            }
        }
        Value::Object(map) => {
            if let Some(choice) = map.get("choice") {
                return parse_resume(choice, choice_count);
            }
            match map.get("feedback") {
                Some(Value::String(text)) if !text.trim().is_empty() => {
                    Ok(ResumeInput::Feedback(text.trim().to_string()))
                }
                Some(_) => Err(malformed("feedback must be a non-blank string")),
                None => Err(malformed("expected a choice or feedback field")),
            }
        }
        Value::Null | Value::Bool(_) => Err(malformed(format!("unsupported input {}", input))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<ResumeInput, WorkflowError> {
        parse_resume(&value, 3)
    }

    #[test]
    fn test_number_and_array_selections() {
        assert_eq!(parse(json!(2)).unwrap(), ResumeInput::Choice(vec![2]));
        assert_eq!(parse(json!([3, 1, 3])).unwrap(), ResumeInput::Choice(vec![3, 1]));
    }

    #[test]
    fn test_numeric_string_selection() {
        assert_eq!(parse(json!("1, 3")).unwrap(), ResumeInput::Choice(vec![1, 3]));
        assert_eq!(parse(json!(" 2 ")).unwrap(), ResumeInput::Choice(vec![2]));
    }

    #[test]
    fn test_text_is_feedback() {
        assert_eq!(
            parse(json!("don't like these")).unwrap(),
            ResumeInput::Feedback("don't like these".to_string())
        );
        assert_eq!(
            parse(json!("option 2 but bigger")).unwrap(),
            ResumeInput::Feedback("option 2 but bigger".to_string())
        );
    }

    #[test]
    fn test_object_forms() {
        assert_eq!(parse(json!({"choice": [1]})).unwrap(), ResumeInput::Choice(vec![1]));
        assert_eq!(parse(json!({"choice": "2"})).unwrap(), ResumeInput::Choice(vec![2]));
        assert_eq!(
            parse(json!({"choice": "something spicier"})).unwrap(),
            ResumeInput::Feedback("something spicier".to_string())
        );
        assert_eq!(
            parse(json!({"feedback": " too pricey "})).unwrap(),
            ResumeInput::Feedback("too pricey".to_string())
        );
    }

    #[test]
    fn test_malformed_inputs() {
        for value in [
            json!(null),
            json!(true),
            json!(""),
            json!("   "),
            json!([]),
            json!(0),
            json!(4),
            json!(-1),
            json!(1.5),
            json!([1, "x"]),
            json!("1, 9"),
            json!({}),
            json!({"feedback": ""}),
            json!({"feedback": 3}),
            json!({"choice": null}),
        ] {
            let err = parse(value.clone()).unwrap_err();
            assert!(
                matches!(err, WorkflowError::MalformedResume(_)),
                "{} should be malformed",
                value
            );
        }
    }

    #[test]
    fn test_no_choices_offered() {
        assert!(parse_resume(&json!(1), 0).is_err());
        assert_eq!(
            parse_resume(&json!("different please"), 0).unwrap(),
            ResumeInput::Feedback("different please".to_string())
        );
    }
}
