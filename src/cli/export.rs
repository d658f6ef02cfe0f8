//! Export subcommand for the layerconf CLI
//!
//! Emits resolved configuration values as shell `export` lines, one per
//! key, suitable for `eval` in a shell:
//!
//! ```text
//! export conf_database_host="localhost"
//! export conf_database_port=5432
//! ```
//!
//! Undefined (null) values emit an empty right-hand side.

use crate::schema::{self, Schema};
use clap::Args;
use serde_json::Value;

/// Arguments for the export subcommand
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Selectors: `category` (all of its keys) or `category.key`.
    /// With no selectors, every key of every category is emitted.
    #[arg(value_name = "SELECTOR")]
    pub selectors: Vec<String>,
}

/// Emit export lines for the resolved schema to stdout.
///
/// Unknown selectors are reported on stderr (independent of the logging
/// destination) and skipped; they do not fail the command.
pub fn run_export(schema: &Schema, args: &ExportArgs) {
    let (lines, unknown) = collect_lines(schema, &args.selectors);
    for selector in &unknown {
        eprintln!("Warning: unknown configuration selector '{}'", selector);
    }
    for line in lines {
        println!("{}", line);
    }
}

/// Build the export lines for the given selectors (all keys when empty).
pub fn export_lines(schema: &Schema, selectors: &[String]) -> Vec<String> {
    collect_lines(schema, selectors).0
}

/// Build export lines plus the selectors that matched nothing.
fn collect_lines(schema: &Schema, selectors: &[String]) -> (Vec<String>, Vec<String>) {
    let mut lines = Vec::new();
    let mut unknown = Vec::new();

    if selectors.is_empty() {
        for (category, entry) in schema {
            emit_category(category, entry, &mut lines);
        }
        return (lines, unknown);
    }

    for selector in selectors {
        match selector.split_once('.') {
            Some((category, key)) => match schema::entry(schema, category, key) {
                Some(value) => lines.push(export_line(category, key, value)),
                None => unknown.push(selector.clone()),
            },
            None => match schema.get(selector.as_str()) {
                Some(entry) => emit_category(selector, entry, &mut lines),
                None => unknown.push(selector.clone()),
            },
        }
    }

    (lines, unknown)
}

fn emit_category(category: &str, entry: &Value, lines: &mut Vec<String>) {
    if let Value::Object(keys) = entry {
        for (key, value) in keys {
            lines.push(export_line(category, key, value));
        }
    }
}

/// Format one `export conf_<category>_<key>=<json>` line. Null values
/// emit nothing after the `=`.
fn export_line(category: &str, key: &str, value: &Value) -> String {
    let rendered = if value.is_null() {
        String::new()
    } else {
        value.to_string()
    };
    format!("export conf_{category}_{key}={rendered}")
}
