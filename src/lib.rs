//! Layered configuration resolution.
//!
//! Resolves a two-level configuration schema (category -> key -> value) by
//! walking four value sources in ascending priority:
//! 1. **Defaults** - the schema's own values (lowest priority)
//! 2. **Secret file** - `.conf.yaml` / `.conf.json` in the working directory
//! 3. **Environment** - `conf_<category>_<key>` variables, with JSON/numeric coercion
//! 4. **Overrides** - programmatic values passed to the resolver (highest priority)
//!
//! Higher-priority values replace lower ones wholesale; there is no deep
//! merge inside a leaf value. An optional strict mode fails resolution if
//! any leaf remains undefined (null) after all sources are applied.

pub mod check;
pub mod cli;
pub mod env;
pub mod error;
pub mod resolver;
pub mod schema;
pub mod source;

pub use check::find_undefined;
pub use env::{EnvReader, MapEnv, ProcessEnv};
pub use error::ConfigError;
pub use resolver::ConfigResolver;
pub use schema::{Schema, into_typed};
pub use source::{FsLoader, SourceLoader};
