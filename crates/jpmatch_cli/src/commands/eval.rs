//! Path evaluation command.

use anyhow::{bail, Context, Result};
use console::style;
use jpmatch_core::JsonPath;
use serde_json::Value;
use std::path::Path;

use super::read_document;

/// Print the values `expression` selects from a document.
///
/// Returns `false` when the path selects nothing.
pub fn run(expression: &str, file: Option<&Path>, format: &str) -> Result<bool> {
    let path = JsonPath::parse(expression)
        .with_context(|| format!("Invalid path expression {}", expression))?;
    let document = read_document(file)?;
    let nodes = path.select(&document);

    if nodes.is_empty() {
        eprintln!(
            "{} {} resolved to nothing",
            style("×").red(),
            style(expression).bold()
        );
        return Ok(false);
    }

    match format {
        "json" => {
            let output = if nodes.len() == 1 && path.is_definite() {
                serde_json::to_string_pretty(nodes[0])?
            } else {
                serde_json::to_string_pretty(&nodes)?
            };
            println!("{}", output);
        }
        "text" => {
            for node in nodes {
                println!("{}", render_text(node));
            }
        }
        other => bail!("Unknown format '{}'. Use json or text", other),
    }

    Ok(true)
}

/// Strings print raw, everything else as compact JSON.
fn render_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
