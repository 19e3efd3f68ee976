//! The path matcher: extract with a path expression, judge with an inner matcher.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::{AbsencePolicy, MatcherConfig};
use crate::error::{MatchError, Result};
use crate::matcher::{Matcher, Verdict};
use crate::path::{JsonPath, SyntaxError};
use crate::value::{render, to_subject};

/// Matches a subject by evaluating a path expression and handing the
/// extracted value(s) to an inner matcher.
///
/// A single resolved node is passed as-is; several nodes are passed as a JSON
/// array in document order. The expression is parsed once, at construction.
///
/// # Examples
///
/// ```
/// use jpmatch_core::{equal, have_json_path, match_subject};
/// use serde_json::json;
///
/// let deployment = json!({"status": {"conditions": [
///     {"type": "Available", "reason": "MinimumReplicasAvailable"},
///     {"type": "Progressing", "reason": "NewReplicaSetAvailable"}
/// ]}});
///
/// let available = have_json_path(
///     r#"{.status.conditions[?(@.type=="Available")].reason}"#,
///     equal("MinimumReplicasAvailable"),
/// );
/// assert!(match_subject(&deployment, &available).unwrap().success);
///
/// let wrong = have_json_path(
///     r#"{.status.conditions[?(@.type=="Available")].reason}"#,
///     equal("X"),
/// );
/// let verdict = match_subject(&deployment, &wrong).unwrap();
/// assert!(!verdict.success);
/// assert!(verdict.message.contains("\"MinimumReplicasAvailable\""));
/// ```
pub struct HaveJsonPath<M> {
    expression: String,
    parsed: std::result::Result<JsonPath, SyntaxError>,
    inner: M,
    config: MatcherConfig,
}

/// Builds a path matcher.
///
/// A malformed expression is not reported here: every match attempt returns
/// `MatchError::PathSyntax` instead. Use [`HaveJsonPath::try_new`] to fail
/// early.
pub fn have_json_path<M: Matcher>(expression: impl Into<String>, inner: M) -> HaveJsonPath<M> {
    let expression = expression.into();
    let parsed = JsonPath::parse_detailed(&expression);
    HaveJsonPath {
        expression,
        parsed,
        inner,
        config: MatcherConfig::default(),
    }
}

impl<M: Matcher> HaveJsonPath<M> {
    /// Builds a path matcher, rejecting a malformed expression immediately.
    pub fn try_new(expression: impl Into<String>, inner: M) -> Result<Self> {
        let matcher = have_json_path(expression, inner);
        matcher.path()?;
        Ok(matcher)
    }

    /// Sets the behaviour for paths that resolve to nothing.
    pub fn with_absence(mut self, policy: AbsencePolicy) -> Self {
        self.config.absence = policy;
        self
    }

    /// Applies a whole matcher configuration.
    pub fn with_config(mut self, config: &MatcherConfig) -> Self {
        self.config = config.clone();
        self
    }

    /// The expression as written by the caller.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// The parsed path, or the syntax error it produced.
    pub fn path(&self) -> Result<&JsonPath> {
        self.parsed
            .as_ref()
            .map_err(|e| e.clone().into_match_error(&self.expression))
    }

    /// Serializes `subject` and matches it.
    ///
    /// # Errors
    ///
    /// - `MatchError::Serialization` if the subject is not representable as JSON
    /// - `MatchError::PathSyntax` if the expression is malformed
    /// - `MatchError::NotFound` if the path selects nothing and absence is not tolerated
    pub fn match_subject<T: Serialize + ?Sized>(&self, subject: &T) -> Result<Verdict> {
        let value = to_subject(subject)?;
        self.match_value(&value)
    }

    fn accepts_absence(&self) -> bool {
        self.config.absence == AbsencePolicy::EmptySequence || self.inner.tolerates_absence()
    }

    fn explain(&self, extracted: &str, inner: Verdict) -> Verdict {
        Verdict {
            success: inner.success,
            message: format!(
                "JSONPath {} resolved to\n{}\n{}",
                self.expression, extracted, inner.message
            ),
        }
    }
}

impl<M: Matcher> Matcher for HaveJsonPath<M> {
    fn match_value(&self, actual: &Value) -> Result<Verdict> {
        let path = self.path()?;
        let evaluation = path.evaluate(actual);

        debug!(
            expression = %self.expression,
            nodes = evaluation.nodes.len(),
            "Evaluated JSONPath"
        );

        if evaluation.nodes.is_empty() {
            if !self.accepts_absence() {
                return Err(MatchError::NotFound {
                    expression: self.expression.clone(),
                    resolved_prefix: path.prefix_string(evaluation.resolved),
                });
            }
            let empty = if path.is_definite() {
                Value::Null
            } else {
                Value::Array(Vec::new())
            };
            let verdict = self.inner.match_value_with(&empty, &self.config)?;
            return Ok(self.explain("    <nothing>", verdict));
        }

        let extracted = if evaluation.nodes.len() == 1 {
            evaluation.nodes[0].clone()
        } else {
            Value::Array(evaluation.nodes.into_iter().cloned().collect())
        };

        let verdict = self.inner.match_value_with(&extracted, &self.config)?;
        let rendered = render(&extracted, self.config.max_diagnostic_len);
        Ok(self.explain(&rendered, verdict))
    }

    fn describe(&self) -> String {
        format!(
            "have JSONPath {} that should {}",
            self.expression,
            self.inner.describe()
        )
    }
}
