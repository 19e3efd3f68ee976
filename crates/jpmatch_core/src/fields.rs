//! Structural matchers that address a subject by field name instead of by
//! path expression.
//!
//! ```
//! use jpmatch_core::{equal, have_field, match_elements, match_fields, match_subject, Matcher};
//! use serde_json::json;
//!
//! let deployment = json!({"status": {"conditions": [
//!     {"type": "Available", "reason": "MinimumReplicasAvailable"},
//!     {"type": "Progressing", "reason": "NewReplicaSetAvailable"},
//! ]}});
//! let reason: Box<dyn Matcher> = Box::new(equal("MinimumReplicasAvailable"));
//! let available: Box<dyn Matcher> = Box::new(match_fields(true, [("reason", reason)]));
//! let matcher = have_field(
//!     "status.conditions",
//!     match_elements("type", true, [("Available", available)]),
//! );
//! assert!(match_subject(&deployment, &matcher).unwrap().success);
//! ```

use serde_json::Value;
use std::collections::HashSet;

use crate::config::MatcherConfig;
use crate::error::Result;
use crate::matcher::{Matcher, Verdict};
use crate::value::render;

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_keyed<K, I>(entries: I) -> Vec<(String, Box<dyn Matcher>)>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Box<dyn Matcher>)>,
{
    entries
        .into_iter()
        .map(|(key, matcher)| (key.into(), matcher))
        .collect()
}

fn describe_keyed(entries: &[(String, Box<dyn Matcher>)]) -> String {
    let parts: Vec<String> = entries
        .iter()
        .map(|(key, matcher)| format!("{}: {}", key, matcher.describe()))
        .collect();
    parts.join(", ")
}

/// Passing message for a keyed matcher, or the failing one listing every problem.
fn keyed_verdict(
    actual: &Value,
    description: &str,
    problems: Vec<String>,
    config: &MatcherConfig,
) -> Verdict {
    let actual = render(actual, config.max_diagnostic_len);
    if problems.is_empty() {
        Verdict::pass(format!("Expected\n{}\nnot to {}", actual, description))
    } else {
        Verdict::fail(format!(
            "Expected\n{}\nto {}\n{}",
            actual,
            description,
            problems.join("\n")
        ))
    }
}

/// A matcher applied to the value at a dotted field path.
pub struct HaveField<M> {
    path: String,
    inner: M,
}

/// Matches when the field at `path` exists and satisfies `inner`.
///
/// `path` is a dot-separated list of object keys; a segment made of digits
/// indexes into an array. A missing field is a failing verdict naming the
/// first segment that could not be followed, unless `inner` tolerates absence,
/// in which case `inner` sees `null`.
pub fn have_field<M: Matcher>(path: &str, inner: M) -> HaveField<M> {
    HaveField {
        path: path.to_string(),
        inner,
    }
}

impl<M> HaveField<M> {
    /// Follows the path, returning the value or the prefix that resolved.
    fn lookup<'a>(&self, root: &'a Value) -> std::result::Result<&'a Value, String> {
        let mut node = root;
        let mut walked: Vec<&str> = Vec::new();
        for segment in self.path.split('.') {
            let next = match node {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            match next {
                Some(child) => {
                    node = child;
                    walked.push(segment);
                }
                None if walked.is_empty() => return Err("the subject".to_string()),
                None => return Err(format!("{:?}", walked.join("."))),
            }
        }
        Ok(node)
    }
}

impl<M: Matcher> Matcher for HaveField<M> {
    fn match_value(&self, actual: &Value) -> Result<Verdict> {
        self.match_value_with(actual, &MatcherConfig::default())
    }

    fn match_value_with(&self, actual: &Value, config: &MatcherConfig) -> Result<Verdict> {
        let null = Value::Null;
        let field = match self.lookup(actual) {
            Ok(field) => field,
            Err(_) if self.inner.tolerates_absence() => &null,
            Err(resolved) => {
                let rendered = render(actual, config.max_diagnostic_len);
                return Ok(Verdict::fail(format!(
                    "Expected\n{}\nto have field {:?}, but {} has no such field",
                    rendered, self.path, resolved
                )));
            }
        };
        let verdict = self.inner.match_value_with(field, config)?;
        let message = format!("Field {:?}:\n{}", self.path, indent(&verdict.message));
        Ok(Verdict {
            success: verdict.success,
            message,
        })
    }

    fn describe(&self) -> String {
        format!("have field {:?} that {}", self.path, self.inner.describe())
    }
}

/// An array whose elements are identified by one of their fields.
pub struct MatchElements {
    id_field: String,
    ignore_extras: bool,
    elements: Vec<(String, Box<dyn Matcher>)>,
}

/// Matches an array of objects keyed by `id_field`.
///
/// Every key in `elements` must identify exactly one element, and that
/// element must satisfy the key's matcher. Elements with other keys fail the
/// match unless `ignore_extras` is set. Non-string identifiers are compared
/// by their JSON text.
pub fn match_elements<K, I>(id_field: &str, ignore_extras: bool, elements: I) -> MatchElements
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Box<dyn Matcher>)>,
{
    MatchElements {
        id_field: id_field.to_string(),
        ignore_extras,
        elements: collect_keyed(elements),
    }
}

impl MatchElements {
    fn element_id(&self, element: &Value) -> Option<String> {
        match element.get(&self.id_field)? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl Matcher for MatchElements {
    fn match_value(&self, actual: &Value) -> Result<Verdict> {
        self.match_value_with(actual, &MatcherConfig::default())
    }

    fn match_value_with(&self, actual: &Value, config: &MatcherConfig) -> Result<Verdict> {
        let description = self.describe();
        let Some(items) = actual.as_array() else {
            return Ok(Verdict::fail(format!(
                "Expected\n{}\nto {}\nbut it is not an array",
                render(actual, config.max_diagnostic_len),
                description
            )));
        };

        let mut problems = Vec::new();
        let mut seen = HashSet::new();
        for (index, item) in items.iter().enumerate() {
            let Some(id) = self.element_id(item) else {
                if !self.ignore_extras {
                    problems.push(format!("element {} has no {:?} field", index, self.id_field));
                }
                continue;
            };
            if !seen.insert(id.clone()) {
                problems.push(format!("[{}]: duplicate element", id));
                continue;
            }
            match self.elements.iter().find(|(key, _)| *key == id) {
                Some((_, matcher)) => {
                    let verdict = matcher.match_value_with(item, config)?;
                    if !verdict.success {
                        problems.push(format!("[{}]:\n{}", id, indent(&verdict.message)));
                    }
                }
                None if self.ignore_extras => {}
                None => problems.push(format!("[{}]: unexpected element", id)),
            }
        }
        for (key, _) in &self.elements {
            if !seen.contains(key) {
                problems.push(format!("[{}]: missing expected element", key));
            }
        }

        Ok(keyed_verdict(actual, &description, problems, config))
    }

    fn describe(&self) -> String {
        format!(
            "match elements keyed by {:?} {{{}}}",
            self.id_field,
            describe_keyed(&self.elements)
        )
    }
}

/// An object whose fields are matched one by one.
pub struct MatchFields {
    ignore_extras: bool,
    fields: Vec<(String, Box<dyn Matcher>)>,
}

/// Matches an object field by field.
///
/// Every named field must be present (or its matcher must tolerate absence)
/// and satisfy its matcher. Fields not named fail the match unless
/// `ignore_extras` is set.
pub fn match_fields<K, I>(ignore_extras: bool, fields: I) -> MatchFields
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Box<dyn Matcher>)>,
{
    MatchFields {
        ignore_extras,
        fields: collect_keyed(fields),
    }
}

impl Matcher for MatchFields {
    fn match_value(&self, actual: &Value) -> Result<Verdict> {
        self.match_value_with(actual, &MatcherConfig::default())
    }

    fn match_value_with(&self, actual: &Value, config: &MatcherConfig) -> Result<Verdict> {
        let description = self.describe();
        let Some(map) = actual.as_object() else {
            return Ok(Verdict::fail(format!(
                "Expected\n{}\nto {}\nbut it is not an object",
                render(actual, config.max_diagnostic_len),
                description
            )));
        };

        let null = Value::Null;
        let mut problems = Vec::new();
        for (name, matcher) in &self.fields {
            let field = match map.get(name) {
                Some(field) => field,
                None if matcher.tolerates_absence() => &null,
                None => {
                    problems.push(format!(".{}: missing expected field", name));
                    continue;
                }
            };
            let verdict = matcher.match_value_with(field, config)?;
            if !verdict.success {
                problems.push(format!(".{}:\n{}", name, indent(&verdict.message)));
            }
        }
        if !self.ignore_extras {
            for key in map.keys() {
                if !self.fields.iter().any(|(name, _)| name == key) {
                    problems.push(format!(".{}: unexpected field", key));
                }
            }
        }

        Ok(keyed_verdict(actual, &description, problems, config))
    }

    fn describe(&self) -> String {
        format!("match fields {{{}}}", describe_keyed(&self.fields))
    }
}
