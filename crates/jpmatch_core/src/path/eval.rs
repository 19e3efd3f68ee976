//! Evaluation of a parsed path against a JSON tree.
//!
//! Evaluation is a pure function of the path and the tree: nodes are
//! borrowed, never cloned or modified, and always come back in document
//! order.

use super::ast::{CompareOp, FilterExpr, JsonPath, Operand, Segment};
use crate::value::{json_equal, json_order};
use serde_json::Value;
use std::cmp::Ordering;

/// Outcome of applying a path to a tree.
#[derive(Debug)]
pub(crate) struct Evaluation<'a> {
    /// Selected nodes in document order.
    pub(crate) nodes: Vec<&'a Value>,
    /// Number of leading segments that still selected at least one node.
    pub(crate) resolved: usize,
}

impl JsonPath {
    /// Selects every node the path matches, in document order.
    ///
    /// # Examples
    ///
    /// ```
    /// use jpmatch_core::JsonPath;
    /// use serde_json::json;
    ///
    /// let doc = json!({"spec": {"containers": [{"name": "test"}, {"name": "sidecar"}]}});
    /// let path = JsonPath::parse("{.spec.containers[*].name}").unwrap();
    /// assert_eq!(path.select(&doc), vec![&json!("test"), &json!("sidecar")]);
    /// ```
    pub fn select<'a>(&self, root: &'a Value) -> Vec<&'a Value> {
        self.evaluate(root).nodes
    }

    pub(crate) fn evaluate<'a>(&self, root: &'a Value) -> Evaluation<'a> {
        let mut nodes = vec![root];
        let mut resolved = 0;
        for segment in &self.segments {
            let mut next = Vec::new();
            for node in nodes {
                apply_segment(segment, node, &mut next);
            }
            nodes = next;
            if nodes.is_empty() {
                break;
            }
            resolved += 1;
        }
        Evaluation { nodes, resolved }
    }
}

fn apply_segment<'a>(segment: &Segment, node: &'a Value, out: &mut Vec<&'a Value>) {
    match segment {
        Segment::Field(name) => {
            if let Some(child) = node.as_object().and_then(|map| map.get(name)) {
                out.push(child);
            }
        }
        Segment::Index(index) => {
            if let Some(child) = node.as_array().and_then(|items| index_into(items, *index)) {
                out.push(child);
            }
        }
        Segment::Slice { start, end, step } => {
            if let Some(items) = node.as_array() {
                for i in slice_indices(items.len(), *start, *end, step.unwrap_or(1)) {
                    out.push(&items[i]);
                }
            }
        }
        Segment::Wildcard => match node {
            Value::Array(items) => out.extend(items.iter()),
            Value::Object(map) => out.extend(map.values()),
            _ => {}
        },
        Segment::Filter(expr) => {
            if let Some(items) = node.as_array() {
                out.extend(items.iter().filter(|item| test_filter(expr, item)));
            }
        }
    }
}

fn index_into(items: &[Value], index: i64) -> Option<&Value> {
    let len = items.len() as i64;
    let i = if index < 0 { len + index } else { index };
    if (0..len).contains(&i) {
        items.get(i as usize)
    } else {
        None
    }
}

/// Indices selected by `[start:end:step]`, following Python slice rules.
fn slice_indices(len: usize, start: Option<i64>, end: Option<i64>, step: i64) -> Vec<usize> {
    let len = len as i64;
    let normalize = |i: i64| if i < 0 { len + i } else { i };
    let mut indices = Vec::new();

    if step > 0 {
        let lo = start.map(normalize).unwrap_or(0).clamp(0, len);
        let hi = end.map(normalize).unwrap_or(len).clamp(0, len);
        let mut i = lo;
        while i < hi {
            indices.push(i as usize);
            i = match i.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
    } else if step < 0 {
        let hi = start.map(normalize).unwrap_or(len - 1).clamp(-1, len - 1);
        let lo = end.map(normalize).unwrap_or(-1).clamp(-1, len - 1);
        let mut i = hi;
        while i > lo {
            indices.push(i as usize);
            i = match i.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
    }
    indices
}

fn test_filter(expr: &FilterExpr, item: &Value) -> bool {
    match expr {
        FilterExpr::Exists(path) => resolve_relative(item, path).map_or(false, |v| !v.is_null()),
        FilterExpr::Compare { left, op, right } => {
            match (operand_value(left, item), operand_value(right, item)) {
                (Some(l), Some(r)) => compare(l, *op, r),
                _ => false,
            }
        }
        FilterExpr::Not(inner) => !test_filter(inner, item),
        FilterExpr::And(l, r) => test_filter(l, item) && test_filter(r, item),
        FilterExpr::Or(l, r) => test_filter(l, item) || test_filter(r, item),
    }
}

fn operand_value<'a>(operand: &'a Operand, item: &'a Value) -> Option<&'a Value> {
    match operand {
        Operand::Current(path) => resolve_relative(item, path),
        Operand::Literal(value) => Some(value),
    }
}

fn resolve_relative<'a>(item: &'a Value, path: &[Segment]) -> Option<&'a Value> {
    path.iter().try_fold(item, |node, step| match step {
        Segment::Field(name) => node.as_object()?.get(name),
        Segment::Index(index) => index_into(node.as_array()?, *index),
        _ => None,
    })
}

fn compare(left: &Value, op: CompareOp, right: &Value) -> bool {
    match op {
        CompareOp::Eq => json_equal(left, right),
        CompareOp::Ne => !json_equal(left, right),
        CompareOp::Lt => json_order(left, right) == Some(Ordering::Less),
        CompareOp::Le => matches!(
            json_order(left, right),
            Some(Ordering::Less | Ordering::Equal)
        ),
        CompareOp::Gt => json_order(left, right) == Some(Ordering::Greater),
        CompareOp::Ge => matches!(
            json_order(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ),
    }
}
