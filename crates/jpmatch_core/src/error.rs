//! Error types for jpmatch_core operations.

use thiserror::Error;

/// Core error type for matcher and polling operations.
///
/// Every variant is a hard error: it means the assertion could not be
/// evaluated at all, as opposed to a negative [`Verdict`](crate::Verdict).
#[derive(Error, Debug)]
pub enum MatchError {
    /// The subject (or an expected value) could not be represented as JSON.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The path expression is malformed.
    #[error("invalid JSONPath {expression:?} at position {position}: {reason}")]
    PathSyntax {
        /// The expression as written by the caller
        expression: String,
        /// Byte offset of the offending character
        position: usize,
        /// What the parser expected
        reason: String,
    },

    /// The path did not resolve to any node.
    #[error("JSONPath {expression} did not resolve: nothing found after {resolved_prefix}")]
    NotFound {
        /// The expression as written by the caller
        expression: String,
        /// Canonical form of the longest prefix that still selected a node
        resolved_prefix: String,
    },

    /// A polling collaborator gave up before the matcher passed.
    #[error("timed out after {elapsed_ms}ms and {attempts} attempts: {last_failure}")]
    Timeout {
        /// Number of fetch + match attempts made
        attempts: u32,
        /// Time spent polling in milliseconds
        elapsed_ms: u64,
        /// Explanation from the last failed attempt
        last_failure: String,
    },

    /// Configuration error (loading, parsing, invalid values).
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// I/O error while reading a subject or configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MatchError {
    /// Returns true if retrying against a freshly fetched subject may succeed.
    ///
    /// A path that does not resolve yet is expected while a resource converges
    /// (a status field that has not been written). A malformed expression or an
    /// unserializable subject will fail the same way on every attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns a user-friendly recovery suggestion for the error, if available.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::PathSyntax { .. } => Some(
                "Wrap the expression in braces and use '.field', '[index]' or '[?(@.field==\"value\")]' segments, e.g. {.status.replicas}.",
            ),
            Self::NotFound { .. } => Some(
                "Check the field names against the subject, or use an absence-tolerant matcher such as be_empty().",
            ),
            Self::Timeout { .. } => {
                Some("Increase the timeout, or check that the resource is actually converging.")
            }
            Self::ConfigError(_) => Some("Fix or remove the configuration file to use defaults."),
            Self::Io(_) => Some("Check that the path exists and is a readable, writable file."),
            Self::Serialization(_) => None,
        }
    }
}

impl From<serde_json::Error> for MatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Convenience Result type for jpmatch_core operations.
pub type Result<T> = std::result::Result<T, MatchError>;
