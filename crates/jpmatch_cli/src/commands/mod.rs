//! CLI command implementations.

pub mod check;
pub mod config;
pub mod eval;

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Read;
use std::path::Path;

/// Reads a JSON document from `file`, or from stdin when `file` is absent or `-`.
pub fn read_document(file: Option<&Path>) -> Result<Value> {
    match file {
        Some(path) if path != Path::new("-") => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON from {}", path.display()))
        }
        _ => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read stdin")?;
            serde_json::from_str(&content).context("Failed to parse JSON from stdin")
        }
    }
}

/// Parses a command-line literal as JSON, falling back to a plain string.
///
/// `--equals MinimumReplicasAvailable` and `--equals '"MinimumReplicasAvailable"'`
/// mean the same thing.
pub fn parse_literal(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
