//! Error types for configuration resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned while loading or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No default schema file was found (or it failed to load) and no
    /// schema object was supplied directly. Fatal, no fallback.
    #[error("no default schema in {}: {message}", .dir.display())]
    MissingDefaultSchema { dir: PathBuf, message: String },

    /// A schema does not have the required two-level shape.
    #[error("invalid schema at {path}: {message}")]
    InvalidSchema { path: String, message: String },

    /// Strict mode found a value still undefined after all sources were
    /// applied. Carries the dotted path of the first undefined leaf.
    #[error("configuration value undefined at {path}")]
    Undefined { path: String },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
