//! The matcher capability.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::config::MatcherConfig;
use crate::error::Result;
use crate::value::to_subject;

/// Outcome of a single match attempt.
///
/// `message` always describes the opposite of what happened: when the
/// match failed it explains the failure, and when it passed it explains what
/// a negated assertion would report. `not(m)` relies on this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the value satisfied the matcher.
    pub success: bool,
    /// Human-readable explanation.
    pub message: String,
}

impl Verdict {
    /// A passing verdict; `message` is the negated failure text.
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// A failing verdict.
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }

    /// Builds a verdict from a boolean outcome and the two possible messages.
    pub fn from_outcome(success: bool, failure: String, negated: String) -> Self {
        if success {
            Self::pass(negated)
        } else {
            Self::fail(failure)
        }
    }

    /// Returns the verdict with `success` flipped and the message kept.
    pub fn negate(self) -> Self {
        Self {
            success: !self.success,
            message: self.message,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.success {
            write!(f, "passed")
        } else {
            write!(f, "failed: {}", self.message)
        }
    }
}

/// A predicate over JSON values.
///
/// Implementations must be pure: the same value always yields the same
/// verdict, and nothing is mutated. Matchers are shared freely between
/// threads.
///
/// `Ok(Verdict { success: false, .. })` is an ordinary mismatch that a
/// polling caller may retry. `Err(_)` means the assertion could not be
/// evaluated.
pub trait Matcher: Send + Sync {
    /// Judges `actual`.
    fn match_value(&self, actual: &Value) -> Result<Verdict>;

    /// Judges `actual`, rendering values in the message within the limits
    /// of `config`.
    ///
    /// Path matchers call this on their inner matcher so that
    /// `max_diagnostic_len` applies to the whole failure message. The default
    /// ignores `config`.
    fn match_value_with(&self, actual: &Value, config: &MatcherConfig) -> Result<Verdict> {
        let _ = config;
        self.match_value(actual)
    }

    /// Short description used in composed messages, e.g. `equal 1`.
    fn describe(&self) -> String;

    /// Whether this matcher accepts a missing value.
    ///
    /// When a path resolves to nothing, a tolerant matcher receives `null`
    /// (single-valued path) or `[]` (multi-valued path) instead of the path
    /// matcher raising `MatchError::NotFound`.
    fn tolerates_absence(&self) -> bool {
        false
    }
}

impl<M: Matcher + ?Sized> Matcher for Box<M> {
    fn match_value(&self, actual: &Value) -> Result<Verdict> {
        (**self).match_value(actual)
    }

    fn match_value_with(&self, actual: &Value, config: &MatcherConfig) -> Result<Verdict> {
        (**self).match_value_with(actual, config)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }

    fn tolerates_absence(&self) -> bool {
        (**self).tolerates_absence()
    }
}

impl<M: Matcher + ?Sized> Matcher for &M {
    fn match_value(&self, actual: &Value) -> Result<Verdict> {
        (**self).match_value(actual)
    }

    fn match_value_with(&self, actual: &Value, config: &MatcherConfig) -> Result<Verdict> {
        (**self).match_value_with(actual, config)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }

    fn tolerates_absence(&self) -> bool {
        (**self).tolerates_absence()
    }
}

/// Serializes `subject` and runs `matcher` against it.
///
/// # Errors
///
/// `MatchError::Serialization` if the subject is not representable as JSON,
/// plus whatever the matcher itself reports.
///
/// # Examples
///
/// ```
/// use jpmatch_core::{have_json_path, match_subject, be_equivalent_to};
/// use serde_json::json;
///
/// let subject = json!({"status": {"replicas": 1}});
/// let matcher = have_json_path("{.status.replicas}", be_equivalent_to(1));
/// assert!(match_subject(&subject, &matcher).unwrap().success);
/// ```
pub fn match_subject<T, M>(subject: &T, matcher: &M) -> Result<Verdict>
where
    T: Serialize + ?Sized,
    M: Matcher + ?Sized,
{
    let value = to_subject(subject)?;
    matcher.match_value(&value)
}
