//! Brace-delimited path expressions.
//!
//! ```text
//! {.status.replicas}
//! {.status.conditions[?(@.type=="Available")].reason}
//! {.spec.template.spec.containers[*].name}
//! ```
//!
//! An expression is parsed once into a [`JsonPath`] (a list of
//! [`Segment`]s) and can then be evaluated against any number of JSON trees.

mod ast;
mod cursor;
mod eval;
mod parser;

pub use ast::{CompareOp, FilterExpr, JsonPath, Operand, Segment};

use crate::error::{MatchError, Result};
use std::str::FromStr;

/// Where and why an expression failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Byte offset into the expression.
    pub position: usize,
    /// What the parser expected.
    pub reason: String,
}

impl SyntaxError {
    pub(crate) fn into_match_error(self, expression: &str) -> MatchError {
        MatchError::PathSyntax {
            expression: expression.to_string(),
            position: self.position,
            reason: self.reason,
        }
    }
}

impl JsonPath {
    /// Parses a path expression.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::PathSyntax` with the byte position of the first
    /// offending character.
    ///
    /// # Examples
    ///
    /// ```
    /// use jpmatch_core::{JsonPath, MatchError};
    ///
    /// let path = JsonPath::parse("{$.status['replicas']}").unwrap();
    /// assert_eq!(path.to_string(), "{.status.replicas}");
    ///
    /// let err = JsonPath::parse("{.status..}").unwrap_err();
    /// assert!(matches!(err, MatchError::PathSyntax { position: 9, .. }));
    /// ```
    pub fn parse(expression: &str) -> Result<Self> {
        parser::parse(expression).map_err(|e| e.into_match_error(expression))
    }

    pub(crate) fn parse_detailed(expression: &str) -> std::result::Result<Self, SyntaxError> {
        parser::parse(expression)
    }
}

impl FromStr for JsonPath {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
