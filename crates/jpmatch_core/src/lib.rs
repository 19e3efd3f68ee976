//! jpmatch Core Library
//!
//! Matchers for asserting on the state of structured values, providing:
//! - Brace-delimited path expressions with field, index, slice, wildcard and filter steps
//! - A composable [`Matcher`] capability with a library of concrete matchers
//! - [`HaveJsonPath`], which extracts with a path and judges with an inner matcher
//! - Field-addressed matchers ([`have_field`], [`match_elements`], [`match_fields`])
//! - [`Eventually`], which polls a freshly fetched subject until a matcher passes
//!
//! # Quick Start
//!
//! ```
//! use jpmatch_core::{be_equivalent_to, have_json_path, match_subject};
//! use serde_json::json;
//!
//! let deployment = json!({"status": {"replicas": 1}});
//! let verdict = match_subject(
//!     &deployment,
//!     &have_json_path("{.status.replicas}", be_equivalent_to(1)),
//! ).unwrap();
//! assert!(verdict.success);
//! ```
//!
//! # Features
//!
//! ## Typed Subjects
//!
//! Anything that implements `Serialize` can be matched; it is converted to a
//! JSON tree first:
//!
//! ```
//! use jpmatch_core::{equal, have_json_path, match_subject};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! #[serde(rename_all = "camelCase")]
//! struct Status {
//!     ready_replicas: u32,
//! }
//!
//! let status = Status { ready_replicas: 2 };
//! let verdict = match_subject(&status, &have_json_path("{.readyReplicas}", equal(2))).unwrap();
//! assert!(verdict.success);
//! ```
//!
//! ## Failures versus Errors
//!
//! A value that does not match yet is an `Ok` verdict with `success == false`.
//! A path that cannot be evaluated is an `Err`:
//!
//! ```
//! use jpmatch_core::{equal, have_json_path, match_subject, MatchError};
//! use serde_json::json;
//!
//! let subject = json!({"status": {"replicas": 0}});
//!
//! let mismatch = match_subject(&subject, &have_json_path("{.status.replicas}", equal(1))).unwrap();
//! assert!(!mismatch.success);
//!
//! let bad_path = match_subject(&subject, &have_json_path("{.status..}", equal(1)));
//! assert!(matches!(bad_path, Err(MatchError::PathSyntax { .. })));
//!
//! let missing = match_subject(&subject, &have_json_path("{.status.readyReplicas}", equal(1)));
//! assert!(matches!(missing, Err(MatchError::NotFound { .. })));
//! ```

mod config;
mod error;
mod eventually;
mod fields;
mod have_json_path;
mod matcher;
mod matchers;
mod path;
mod value;

pub use config::{AbsencePolicy, Config, EventuallyConfig, MatcherConfig, DEFAULT_MAX_DIAGNOSTIC_LEN};
pub use error::{MatchError, Result};
pub use eventually::{Clock, Eventually, PollReport, SystemClock};
pub use fields::{have_field, match_elements, match_fields, HaveField, MatchElements, MatchFields};
pub use have_json_path::{have_json_path, HaveJsonPath};
pub use matcher::{match_subject, Matcher, Verdict};
pub use matchers::{
    all_of, any_of, be_empty, be_equivalent_to, be_null, contain_element, equal, have_len, not,
    satisfy, AllOf, AnyOf, BeEmpty, BeEquivalentTo, BeNull, ContainElement, Equal, HaveLen, Not,
    Satisfy,
};
pub use path::{CompareOp, FilterExpr, JsonPath, Operand, Segment, SyntaxError};
pub use value::to_subject;
