//! Schema file loading.
//!
//! Two files live in the working directory:
//! - `.conf.default.yaml` (or `.conf.default.json`) - the default schema,
//!   required when no schema object is supplied programmatically
//! - `.conf.yaml` (or `.conf.json`) - the secret schema, optional and
//!   typically excluded from source control
//!
//! Loading goes through the [`SourceLoader`] trait so the resolver can be
//! exercised against in-memory schemas in tests.

use crate::error::{ConfigError, ConfigResult};
use crate::schema::Schema;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Candidate file names for the default schema, in lookup order.
const DEFAULT_FILES: [&str; 2] = [".conf.default.yaml", ".conf.default.json"];

/// Candidate file names for the secret schema, in lookup order.
const SECRET_FILES: [&str; 2] = [".conf.yaml", ".conf.json"];

/// Loads the default and secret schemas for a working directory.
pub trait SourceLoader {
    /// Load the default schema. Fails if no default schema file exists or
    /// it cannot be parsed; there is no fallback.
    fn load_default(&self, dir: &Path) -> ConfigResult<Schema>;

    /// Load the secret schema, best-effort. Any failure (missing file,
    /// unreadable, bad syntax, non-object root) degrades to an empty
    /// schema and resolution continues.
    fn load_secret(&self, dir: &Path) -> Schema;
}

/// Filesystem-backed schema loader.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl FsLoader {
    /// Read the first candidate file that exists. `Ok(None)` means none of
    /// the candidates were found.
    fn read_first(&self, dir: &Path, candidates: &[&str]) -> ConfigResult<Option<Schema>> {
        for name in candidates {
            let path = dir.join(name);
            if path.exists() {
                return read_schema_file(&path).map(Some);
            }
        }
        Ok(None)
    }
}

impl SourceLoader for FsLoader {
    fn load_default(&self, dir: &Path) -> ConfigResult<Schema> {
        self.read_first(dir, &DEFAULT_FILES)?
            .ok_or_else(|| ConfigError::MissingDefaultSchema {
                dir: dir.to_path_buf(),
                message: format!("none of {} found", DEFAULT_FILES.join(", ")),
            })
    }

    fn load_secret(&self, dir: &Path) -> Schema {
        match self.read_first(dir, &SECRET_FILES) {
            Ok(Some(schema)) => schema,
            Ok(None) => Schema::new(),
            Err(e) => {
                debug!("Ignoring unusable secret schema in {}: {}", dir.display(), e);
                Schema::new()
            }
        }
    }
}

/// Read one schema file into a two-level mapping.
///
/// YAML is accepted for both extensions (JSON is a subset of YAML 1.2, and
/// `.json` files parse identically). The root must be an object.
fn read_schema_file(path: &Path) -> ConfigResult<Schema> {
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidSchema {
        path: display.clone(),
        message: e.to_string(),
    })?;
    let value: Value =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::InvalidSchema {
            path: display.clone(),
            message: e.to_string(),
        })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ConfigError::InvalidSchema {
            path: display,
            message: format!("root must be an object, found {}", kind_of(&other)),
        }),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
