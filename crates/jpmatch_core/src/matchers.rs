//! Concrete matchers.
//!
//! Every constructor returns a type implementing [`Matcher`], so matchers
//! compose freely:
//!
//! ```
//! use jpmatch_core::{all_of, have_len, contain_element, match_subject, not, be_empty};
//! use serde_json::json;
//!
//! let names = json!(["test", "sidecar"]);
//! let matcher = all_of(vec![
//!     Box::new(have_len(2)),
//!     Box::new(contain_element("sidecar")),
//!     Box::new(not(be_empty())),
//! ]);
//! assert!(match_subject(&names, &matcher).unwrap().success);
//! ```

use serde::Serialize;
use serde_json::Value;

use crate::config::MatcherConfig;
use crate::error::{MatchError, Result};
use crate::matcher::{Matcher, Verdict};
use crate::value::{equivalent, json_equal, render};

/// An expected value, or the reason it could not be serialized.
type Expected = std::result::Result<Value, String>;

fn expected_value<T: Serialize>(value: T) -> Expected {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

fn resolve_expected(expected: &Expected) -> Result<&Value> {
    expected
        .as_ref()
        .map_err(|e| MatchError::Serialization(format!("expected value: {}", e)))
}

fn describe_expected(relation: &str, expected: &Expected) -> String {
    match expected {
        Ok(v) => format!("{} {}", relation, v),
        Err(_) => format!("{} <unserializable>", relation),
    }
}

/// Standard two-part message: actual, relation, expected.
fn compare_messages(
    actual: &Value,
    relation: &str,
    expected: &Value,
    config: &MatcherConfig,
) -> (String, String) {
    let actual = render(actual, config.max_diagnostic_len);
    let expected = render(expected, config.max_diagnostic_len);
    (
        format!("Expected\n{}\nto {}\n{}", actual, relation, expected),
        format!("Expected\n{}\nnot to {}\n{}", actual, relation, expected),
    )
}

/// Failure and negated messages for a matcher without an expected value.
fn predicate_messages(actual: &Value, relation: &str, config: &MatcherConfig) -> (String, String) {
    let actual = render(actual, config.max_diagnostic_len);
    (
        format!("Expected\n{}\nto {}", actual, relation),
        format!("Expected\n{}\nnot to {}", actual, relation),
    )
}

/// Strict JSON equality (`1` and `1.0` differ).
#[derive(Debug, Clone)]
pub struct Equal {
    expected: Expected,
}

/// Matches values strictly equal to `expected` once both are JSON.
pub fn equal<T: Serialize>(expected: T) -> Equal {
    Equal {
        expected: expected_value(expected),
    }
}

impl Matcher for Equal {
    fn match_value(&self, actual: &Value) -> Result<Verdict> {
        self.match_value_with(actual, &MatcherConfig::default())
    }

    fn match_value_with(&self, actual: &Value, config: &MatcherConfig) -> Result<Verdict> {
        let expected = resolve_expected(&self.expected)?;
        let (failure, negated) = compare_messages(actual, "equal", expected, config);
        Ok(Verdict::from_outcome(actual == expected, failure, negated))
    }

    fn describe(&self) -> String {
        describe_expected("equal", &self.expected)
    }
}

/// Loose equality: numbers by value, numeric and boolean strings coerced.
#[derive(Debug, Clone)]
pub struct BeEquivalentTo {
    expected: Expected,
}

/// Matches values equivalent to `expected` (`1`, `1.0` and `"1"` all match 1).
pub fn be_equivalent_to<T: Serialize>(expected: T) -> BeEquivalentTo {
    BeEquivalentTo {
        expected: expected_value(expected),
    }
}

impl Matcher for BeEquivalentTo {
    fn match_value(&self, actual: &Value) -> Result<Verdict> {
        self.match_value_with(actual, &MatcherConfig::default())
    }

    fn match_value_with(&self, actual: &Value, config: &MatcherConfig) -> Result<Verdict> {
        let expected = resolve_expected(&self.expected)?;
        let (failure, negated) = compare_messages(actual, "be equivalent to", expected, config);
        Ok(Verdict::from_outcome(
            equivalent(actual, expected),
            failure,
            negated,
        ))
    }

    fn describe(&self) -> String {
        describe_expected("be equivalent to", &self.expected)
    }
}

/// Array membership.
#[derive(Debug, Clone)]
pub struct ContainElement {
    expected: Expected,
}

/// Matches arrays holding an element equal to `expected` (numbers by value).
pub fn contain_element<T: Serialize>(expected: T) -> ContainElement {
    ContainElement {
        expected: expected_value(expected),
    }
}

impl Matcher for ContainElement {
    fn match_value(&self, actual: &Value) -> Result<Verdict> {
        self.match_value_with(actual, &MatcherConfig::default())
    }

    fn match_value_with(&self, actual: &Value, config: &MatcherConfig) -> Result<Verdict> {
        let expected = resolve_expected(&self.expected)?;
        let Some(items) = actual.as_array() else {
            return Ok(Verdict::fail(format!(
                "Expected\n{}\nto be an array containing\n{}",
                render(actual, config.max_diagnostic_len),
                render(expected, config.max_diagnostic_len)
            )));
        };
        let (failure, negated) = compare_messages(actual, "contain element", expected, config);
        Ok(Verdict::from_outcome(
            items.iter().any(|item| json_equal(item, expected)),
            failure,
            negated,
        ))
    }

    fn describe(&self) -> String {
        describe_expected("contain element", &self.expected)
    }
}

/// Length of an array, object or string.
#[derive(Debug, Clone, Copy)]
pub struct HaveLen {
    expected: usize,
}

/// Matches arrays and objects with `len` entries, or strings of `len` characters.
pub fn have_len(len: usize) -> HaveLen {
    HaveLen { expected: len }
}

fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::Array(items) => Some(items.len()),
        Value::Object(map) => Some(map.len()),
        Value::String(s) => Some(s.chars().count()),
        _ => None,
    }
}

impl Matcher for HaveLen {
    fn match_value(&self, actual: &Value) -> Result<Verdict> {
        self.match_value_with(actual, &MatcherConfig::default())
    }

    fn match_value_with(&self, actual: &Value, config: &MatcherConfig) -> Result<Verdict> {
        let shown = render(actual, config.max_diagnostic_len);
        let Some(len) = length_of(actual) else {
            return Ok(Verdict::fail(format!(
                "Expected\n{}\nto have length {}, but it has no length",
                shown, self.expected
            )));
        };
        Ok(Verdict::from_outcome(
            len == self.expected,
            format!(
                "Expected\n{}\nto have length {} (actual length {})",
                shown, self.expected, len
            ),
            format!("Expected\n{}\nnot to have length {}", shown, self.expected),
        ))
    }

    fn describe(&self) -> String {
        format!("have length {}", self.expected)
    }
}

/// Empty string, array, object, or null.
#[derive(Debug, Clone, Copy)]
pub struct BeEmpty;

/// Matches `null`, `""`, `[]` and `{}`. Accepts a path that resolved to nothing.
pub fn be_empty() -> BeEmpty {
    BeEmpty
}

impl Matcher for BeEmpty {
    fn match_value(&self, actual: &Value) -> Result<Verdict> {
        self.match_value_with(actual, &MatcherConfig::default())
    }

    fn match_value_with(&self, actual: &Value, config: &MatcherConfig) -> Result<Verdict> {
        let empty = actual.is_null() || length_of(actual) == Some(0);
        let (failure, negated) = predicate_messages(actual, "be empty", config);
        Ok(Verdict::from_outcome(empty, failure, negated))
    }

    fn describe(&self) -> String {
        "be empty".to_string()
    }

    fn tolerates_absence(&self) -> bool {
        true
    }
}

/// JSON null.
#[derive(Debug, Clone, Copy)]
pub struct BeNull;

/// Matches `null`. Accepts a single-valued path that resolved to nothing.
pub fn be_null() -> BeNull {
    BeNull
}

impl Matcher for BeNull {
    fn match_value(&self, actual: &Value) -> Result<Verdict> {
        self.match_value_with(actual, &MatcherConfig::default())
    }

    fn match_value_with(&self, actual: &Value, config: &MatcherConfig) -> Result<Verdict> {
        let (failure, negated) = predicate_messages(actual, "be null", config);
        Ok(Verdict::from_outcome(actual.is_null(), failure, negated))
    }

    fn describe(&self) -> String {
        "be null".to_string()
    }

    fn tolerates_absence(&self) -> bool {
        true
    }
}

/// Closure-backed matcher.
pub struct Satisfy<F> {
    description: String,
    predicate: F,
}

/// Matches values for which `predicate` returns true.
///
/// ```
/// use jpmatch_core::{satisfy, match_subject};
///
/// let even = satisfy("be even", |v| v.as_i64().map_or(false, |n| n % 2 == 0));
/// assert!(match_subject(&4, &even).unwrap().success);
/// assert!(!match_subject(&3, &even).unwrap().success);
/// ```
pub fn satisfy<F>(description: impl Into<String>, predicate: F) -> Satisfy<F>
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    Satisfy {
        description: description.into(),
        predicate,
    }
}

impl<F> Matcher for Satisfy<F>
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    fn match_value(&self, actual: &Value) -> Result<Verdict> {
        self.match_value_with(actual, &MatcherConfig::default())
    }

    fn match_value_with(&self, actual: &Value, config: &MatcherConfig) -> Result<Verdict> {
        let (failure, negated) = predicate_messages(actual, &self.description, config);
        Ok(Verdict::from_outcome(
            (self.predicate)(actual),
            failure,
            negated,
        ))
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

/// Negation of another matcher.
pub struct Not<M> {
    inner: M,
}

/// Matches when `inner` does not. Errors from `inner` are passed through.
pub fn not<M: Matcher>(inner: M) -> Not<M> {
    Not { inner }
}

impl<M: Matcher> Matcher for Not<M> {
    fn match_value(&self, actual: &Value) -> Result<Verdict> {
        Ok(self.inner.match_value(actual)?.negate())
    }

    fn match_value_with(&self, actual: &Value, config: &MatcherConfig) -> Result<Verdict> {
        Ok(self.inner.match_value_with(actual, config)?.negate())
    }

    fn describe(&self) -> String {
        format!("not {}", self.inner.describe())
    }

    fn tolerates_absence(&self) -> bool {
        self.inner.tolerates_absence()
    }
}

/// Conjunction; stops at the first failing matcher.
pub struct AllOf {
    matchers: Vec<Box<dyn Matcher>>,
}

/// Matches when every matcher matches.
pub fn all_of(matchers: Vec<Box<dyn Matcher>>) -> AllOf {
    AllOf { matchers }
}

impl Matcher for AllOf {
    fn match_value(&self, actual: &Value) -> Result<Verdict> {
        self.match_value_with(actual, &MatcherConfig::default())
    }

    fn match_value_with(&self, actual: &Value, config: &MatcherConfig) -> Result<Verdict> {
        for matcher in &self.matchers {
            let verdict = matcher.match_value_with(actual, config)?;
            if !verdict.success {
                return Ok(verdict);
            }
        }
        Ok(Verdict::pass(format!(
            "Expected\n{}\nnot to {}",
            render(actual, config.max_diagnostic_len),
            self.describe()
        )))
    }

    fn describe(&self) -> String {
        let parts: Vec<String> = self.matchers.iter().map(|m| m.describe()).collect();
        format!("satisfy all of [{}]", parts.join(", "))
    }

    fn tolerates_absence(&self) -> bool {
        !self.matchers.is_empty() && self.matchers.iter().all(|m| m.tolerates_absence())
    }
}

/// Disjunction; stops at the first passing matcher.
pub struct AnyOf {
    matchers: Vec<Box<dyn Matcher>>,
}

/// Matches when at least one matcher matches.
pub fn any_of(matchers: Vec<Box<dyn Matcher>>) -> AnyOf {
    AnyOf { matchers }
}

impl Matcher for AnyOf {
    fn match_value(&self, actual: &Value) -> Result<Verdict> {
        self.match_value_with(actual, &MatcherConfig::default())
    }

    fn match_value_with(&self, actual: &Value, config: &MatcherConfig) -> Result<Verdict> {
        let mut failures = Vec::with_capacity(self.matchers.len());
        for matcher in &self.matchers {
            let verdict = matcher.match_value_with(actual, config)?;
            if verdict.success {
                return Ok(verdict);
            }
            failures.push(verdict.message);
        }
        Ok(Verdict::fail(format!(
            "Expected\n{}\nto {}\nbut every matcher failed:\n{}",
            render(actual, config.max_diagnostic_len),
            self.describe(),
            failures.join("\n---\n")
        )))
    }

    fn describe(&self) -> String {
        let parts: Vec<String> = self.matchers.iter().map(|m| m.describe()).collect();
        format!("satisfy any of [{}]", parts.join(", "))
    }

    fn tolerates_absence(&self) -> bool {
        self.matchers.iter().any(|m| m.tolerates_absence())
    }
}
