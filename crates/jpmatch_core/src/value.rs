//! Comparison and rendering helpers shared by filters and matchers.

use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

use crate::error::Result;

/// Converts any serializable subject into a JSON tree.
///
/// # Errors
///
/// Returns `MatchError::Serialization` if the subject cannot be represented
/// as JSON (for example a map with non-string keys).
///
/// # Examples
///
/// ```
/// use jpmatch_core::to_subject;
/// use std::collections::BTreeMap;
///
/// let mut labels = BTreeMap::new();
/// labels.insert("app", "my-deployment");
/// let value = to_subject(&labels).unwrap();
/// assert_eq!(value["app"], "my-deployment");
/// ```
pub fn to_subject<T: Serialize + ?Sized>(subject: &T) -> Result<Value> {
    Ok(serde_json::to_value(subject)?)
}

/// Numeric-aware structural equality.
///
/// Numbers compare by value (`1 == 1.0`); arrays and objects compare
/// element-wise with the same rule; everything else uses JSON equality.
pub(crate) fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => compare_numbers(a, b) == Some(Ordering::Equal),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).map_or(false, |y| json_equal(x, y)))
        }
        _ => a == b,
    }
}

/// Ordering between two numbers or two strings; `None` for anything else.
pub(crate) fn json_order(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => compare_numbers(a, b),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn compare_numbers(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return Some(x.cmp(&y));
    }
    a.as_f64()?.partial_cmp(&b.as_f64()?)
}

/// Loose equality used by `be_equivalent_to`.
///
/// On top of [`json_equal`], a string is compared with a number by parsing
/// it, and a string is compared with a boolean by its `true`/`false` text.
/// Arrays and objects apply the same rule to every member.
pub(crate) fn equivalent(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::String(s), Value::Number(_)) | (Value::Number(_), Value::String(s)) => {
            let number = if actual.is_number() { actual } else { expected };
            s.trim()
                .parse::<f64>()
                .ok()
                .zip(number.as_f64())
                .map_or(false, |(x, y)| x == y)
        }
        (Value::String(s), Value::Bool(b)) | (Value::Bool(b), Value::String(s)) => {
            s.trim() == if *b { "true" } else { "false" }
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| equivalent(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).map_or(false, |y| equivalent(x, y)))
        }
        _ => json_equal(actual, expected),
    }
}

/// Renders a value for a failure message, indented and truncated.
///
/// Mirrors the familiar "Expected\n    <actual>\nto equal\n    <expected>"
/// layout: every line is indented by four spaces.
pub(crate) fn render(value: &Value, max_len: usize) -> String {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    let text = truncate(&text, max_len);
    indent(&text)
}

fn truncate(text: &str, max_len: usize) -> String {
    if max_len == 0 || text.len() <= max_len {
        return text.to_string();
    }
    let mut cut = max_len;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!(
        "{}...\n(output truncated: {} of {} bytes shown)",
        &text[..cut],
        cut,
        text.len()
    )
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("    {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}
