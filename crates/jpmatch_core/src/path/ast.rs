//! Parsed form of a path expression.

use serde_json::Value;
use std::fmt;

/// A parsed path expression.
///
/// Built by [`JsonPath::parse`]. Displays in canonical form, so a path
/// written as `{$.status['replicas']}` prints as `{.status.replicas}`.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPath {
    pub(crate) segments: Vec<Segment>,
}

/// One step of a path.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// `.name` or `['name']`
    Field(String),
    /// `[3]`, `[-1]`
    Index(i64),
    /// `[start:end:step]`
    Slice {
        /// First index (inclusive)
        start: Option<i64>,
        /// Last index (exclusive)
        end: Option<i64>,
        /// Stride, never zero
        step: Option<i64>,
    },
    /// `.*` or `[*]`
    Wildcard,
    /// `[?(...)]`
    Filter(FilterExpr),
}

/// Boolean condition evaluated against each array element.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// `@.field`: the relative path exists and is not null.
    Exists(Vec<Segment>),
    /// `@.field == literal`
    Compare {
        left: Operand,
        op: CompareOp,
        right: Operand,
    },
    Not(Box<FilterExpr>),
    And(Box<FilterExpr>, Box<FilterExpr>),
    Or(Box<FilterExpr>, Box<FilterExpr>),
}

/// A side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Path relative to the element under test (`@`, `@.a.b`, `@[0]`).
    /// Only [`Segment::Field`] and [`Segment::Index`] steps appear here.
    Current(Vec<Segment>),
    /// A string, number, boolean or null literal.
    Literal(Value),
}

/// Comparison operators allowed inside a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// The operator as written in an expression.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

impl JsonPath {
    /// Returns the parsed segments in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns true if the path can select at most one node.
    ///
    /// Paths made only of field and index steps are definite; a filter,
    /// wildcard or slice makes the path multi-valued.
    pub fn is_definite(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, Segment::Field(_) | Segment::Index(_)))
    }

    /// Canonical form of the first `len` segments.
    pub(crate) fn prefix_string(&self, len: usize) -> String {
        let prefix = JsonPath {
            segments: self.segments[..len.min(self.segments.len())].to_vec(),
        };
        prefix.to_string()
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "{{$}}");
        }
        write!(f, "{{")?;
        for segment in &self.segments {
            write!(f, "{}", segment)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) if is_plain_identifier(name) => write!(f, ".{}", name),
            Self::Field(name) => write!(f, "[{}]", quote(name)),
            Self::Index(i) => write!(f, "[{}]", i),
            Self::Slice { start, end, step } => {
                write!(f, "[")?;
                if let Some(s) = start {
                    write!(f, "{}", s)?;
                }
                write!(f, ":")?;
                if let Some(e) = end {
                    write!(f, "{}", e)?;
                }
                if let Some(st) = step {
                    write!(f, ":{}", st)?;
                }
                write!(f, "]")
            }
            Self::Wildcard => write!(f, "[*]"),
            Self::Filter(expr) => write!(f, "[?({})]", expr),
        }
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exists(path) => write_relative(f, path),
            Self::Compare { left, op, right } => {
                write!(f, "{}{}{}", left, op.as_str(), right)
            }
            Self::Not(inner) => write!(f, "!({})", inner),
            Self::And(l, r) => {
                write_grouped(f, l)?;
                write!(f, " && ")?;
                write_grouped(f, r)
            }
            Self::Or(l, r) => write!(f, "{} || {}", l, r),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current(path) => write_relative(f, path),
            Self::Literal(value) => write!(f, "{}", value),
        }
    }
}

// `||` binds looser than `&&`, so an Or under an And needs parentheses.
fn write_grouped(f: &mut fmt::Formatter<'_>, expr: &FilterExpr) -> fmt::Result {
    match expr {
        FilterExpr::Or(..) => write!(f, "({})", expr),
        _ => write!(f, "{}", expr),
    }
}

fn write_relative(f: &mut fmt::Formatter<'_>, path: &[Segment]) -> fmt::Result {
    write!(f, "@")?;
    for segment in path {
        write!(f, "{}", segment)?;
    }
    Ok(())
}

pub(crate) fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn is_plain_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_identifier_char)
}

fn quote(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('\'');
    for c in name.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}
