//! Priority-merge resolution across the four value sources.
//!
//! For every category/key pair present in the schema, the first source with
//! a defined value wins (lowest to highest priority shown last-to-first):
//! 1. Programmatic overrides
//! 2. `conf_<category>_<key>` environment variables (coerced unless raw)
//! 3. The secret schema file
//! 4. The schema's own default value
//!
//! Keys absent from the schema are never populated, regardless of what the
//! other sources contain for them.

use crate::check::find_undefined;
use crate::env::{EnvReader, ProcessEnv};
use crate::error::{ConfigError, ConfigResult};
use crate::schema::{self, Schema};
use crate::source::{FsLoader, SourceLoader};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Category holding resolver-level settings inside the schema itself.
const SETTINGS_CATEGORY: &str = "config";

/// Key (within [`SETTINGS_CATEGORY`]) that enables strict mode.
const STRICT_KEY: &str = "errorOnUndefined";

/// Resolves a configuration schema against overrides, environment
/// variables, and a secret schema file.
///
/// # Example
/// ```
/// use layerconf::{ConfigResolver, MapEnv};
/// use serde_json::json;
///
/// let schema = json!({ "database": { "host": "localhost", "port": 5432 } });
/// let resolved = ConfigResolver::new()
///     .with_env(MapEnv::new().set("conf_database_port", "9000"))
///     .resolve(Some(schema.as_object().unwrap().clone()))
///     .unwrap();
/// assert_eq!(resolved["database"]["port"], json!(9000));
/// ```
pub struct ConfigResolver {
    overrides: Option<Schema>,
    working_dir: PathBuf,
    raw_env: bool,
    loader: Box<dyn SourceLoader>,
    env: Box<dyn EnvReader>,
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigResolver {
    /// Create a resolver with no overrides, the current directory as the
    /// working directory, filesystem schema loading, and the process
    /// environment.
    pub fn new() -> Self {
        Self {
            overrides: None,
            working_dir: PathBuf::from("."),
            raw_env: false,
            loader: Box::new(FsLoader),
            env: Box::new(ProcessEnv),
        }
    }

    /// Set the highest-priority value source. Null entries count as "not
    /// specified" and do not shadow lower sources.
    pub fn with_overrides(mut self, overrides: Schema) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Set the directory searched for the default and secret schema files.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// When enabled, environment values are applied as raw strings with no
    /// JSON or numeric coercion.
    pub fn with_raw_env(mut self, raw: bool) -> Self {
        self.raw_env = raw;
        self
    }

    /// Substitute the schema file loader.
    pub fn with_source_loader(mut self, loader: impl SourceLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    /// Substitute the environment reader.
    pub fn with_env(mut self, env: impl EnvReader + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    /// Resolve a schema, consuming and returning it with every leaf value
    /// replaced by the highest-priority source that defines it.
    ///
    /// When `schema` is `None` the default schema is loaded from the
    /// working directory; failure to load it is fatal. The secret schema
    /// is loaded best-effort and treated as empty when absent or broken.
    ///
    /// After resolution, if the resolved schema's `config.errorOnUndefined`
    /// is truthy, any remaining null leaf fails with
    /// [`ConfigError::Undefined`] naming the first undefined path.
    pub fn resolve(&self, schema: Option<Schema>) -> ConfigResult<Schema> {
        let mut schema = match schema {
            Some(schema) => schema,
            None => self.loader.load_default(&self.working_dir)?,
        };
        let secret = self.loader.load_secret(&self.working_dir);

        for (category, entry) in schema.iter_mut() {
            let Value::Object(keys) = entry else {
                // The schema is strictly two-level: category -> key -> value
                return Err(ConfigError::InvalidSchema {
                    path: category.clone(),
                    message: "category must be an object".to_string(),
                });
            };
            for (key, slot) in keys.iter_mut() {
                if let Some(value) = self.lookup(category, key, &secret) {
                    *slot = value;
                }
            }
        }

        if self.strict_enabled(&schema) {
            for (category, entry) in &schema {
                if let Some(path) = find_undefined(entry, category) {
                    error!("Configuration value undefined at {}", path);
                    return Err(ConfigError::Undefined { path });
                }
            }
        }

        Ok(schema)
    }

    /// Walk the override, environment, and secret sources for one key.
    /// Returns `None` when no source defines it, leaving the default.
    fn lookup(&self, category: &str, key: &str, secret: &Schema) -> Option<Value> {
        if let Some(overrides) = &self.overrides {
            if let Some(value) = schema::entry(overrides, category, key) {
                if schema::is_defined(value) {
                    return Some(value.clone());
                }
            }
        }

        let name = format!("conf_{category}_{key}");
        if let Some(raw) = self.env.get(&name) {
            if !raw.is_empty() {
                debug!("Using environment value for {}", name);
                return Some(if self.raw_env {
                    Value::String(raw)
                } else {
                    coerce_env_value(&raw)
                });
            }
        }

        if let Some(value) = schema::entry(secret, category, key) {
            if schema::is_defined(value) {
                return Some(value.clone());
            }
        }

        None
    }

    fn strict_enabled(&self, schema: &Schema) -> bool {
        schema::entry(schema, SETTINGS_CATEGORY, STRICT_KEY).is_some_and(schema::is_truthy)
    }
}

/// Coerce an environment string into a typed value.
///
/// The string is first parsed as JSON; on failure it stays a string. A
/// string result (either unparseable input or a JSON string literal) that
/// is genuinely numeric then becomes a number. JSON-parsed booleans,
/// objects, and arrays are never numeric-coerced, so `"true"` stays `true`.
fn coerce_env_value(raw: &str) -> Value {
    let parsed: Value =
        serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    if let Value::String(s) = &parsed {
        if let Some(number) = parse_number(s) {
            return number;
        }
    }
    parsed
}

/// Parse a string as a JSON number if its trimmed form is one.
///
/// Integers stay integers (`"042"` becomes `42`, not `42.0`); non-finite
/// floats and empty/whitespace-only strings are rejected.
fn parse_number(s: &str) -> Option<Value> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(Value::Number(int.into()));
    }
    if let Ok(float) = trimmed.parse::<f64>() {
        if float.is_finite() {
            return serde_json::Number::from_f64(float).map(Value::Number);
        }
    }
    None
}

/// Resolve the default schema from `dir` with no overrides and the process
/// environment. Convenience wrapper over [`ConfigResolver`].
pub fn resolve_dir(dir: impl AsRef<Path>) -> ConfigResult<Schema> {
    ConfigResolver::new()
        .with_working_dir(dir.as_ref())
        .resolve(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnv;
    use serde_json::json;

    fn schema_of(value: Value) -> Schema {
        value.as_object().expect("test schema must be an object").clone()
    }

    /// A loader serving fixed in-memory schemas.
    struct FixedLoader {
        default: Option<Schema>,
        secret: Schema,
    }

    impl FixedLoader {
        fn new() -> Self {
            Self {
                default: None,
                secret: Schema::new(),
            }
        }

        fn with_default(mut self, value: Value) -> Self {
            self.default = Some(schema_of(value));
            self
        }

        fn with_secret(mut self, value: Value) -> Self {
            self.secret = schema_of(value);
            self
        }
    }

    impl SourceLoader for FixedLoader {
        fn load_default(&self, dir: &std::path::Path) -> ConfigResult<Schema> {
            self.default
                .clone()
                .ok_or_else(|| ConfigError::MissingDefaultSchema {
                    dir: dir.to_path_buf(),
                    message: "no default schema".to_string(),
                })
        }

        fn load_secret(&self, _dir: &std::path::Path) -> Schema {
            self.secret.clone()
        }
    }

    fn resolver() -> ConfigResolver {
        ConfigResolver::new()
            .with_source_loader(FixedLoader::new())
            .with_env(MapEnv::new())
    }

    #[test]
    fn test_identity_with_no_sources() {
        let schema = schema_of(json!({
            "database": { "host": "localhost", "port": 5432 },
            "flags": { "beta": false }
        }));
        let resolved = resolver().resolve(Some(schema.clone())).unwrap();
        assert_eq!(resolved, schema);
    }

    #[test]
    fn test_overrides_win_over_everything() {
        let schema = schema_of(json!({ "aws": { "key": "default" } }));
        let resolved = ConfigResolver::new()
            .with_overrides(schema_of(json!({ "aws": { "key": "override" } })))
            .with_env(MapEnv::new().set("conf_aws_key", "from-env"))
            .with_source_loader(
                FixedLoader::new().with_secret(json!({ "aws": { "key": "from-secret" } })),
            )
            .resolve(Some(schema))
            .unwrap();
        assert_eq!(resolved["aws"]["key"], json!("override"));
    }

    #[test]
    fn test_env_wins_over_secret() {
        let schema = schema_of(json!({ "aws": { "key": "default" } }));
        let resolved = ConfigResolver::new()
            .with_env(MapEnv::new().set("conf_aws_key", "from-env"))
            .with_source_loader(
                FixedLoader::new().with_secret(json!({ "aws": { "key": "from-secret" } })),
            )
            .resolve(Some(schema))
            .unwrap();
        assert_eq!(resolved["aws"]["key"], json!("from-env"));
    }

    #[test]
    fn test_secret_wins_over_default() {
        let schema = schema_of(json!({ "aws": { "key": "default" } }));
        let resolved = ConfigResolver::new()
            .with_env(MapEnv::new())
            .with_source_loader(
                FixedLoader::new().with_secret(json!({ "aws": { "key": "from-secret" } })),
            )
            .resolve(Some(schema))
            .unwrap();
        assert_eq!(resolved["aws"]["key"], json!("from-secret"));
    }

    #[test]
    fn test_null_override_does_not_shadow() {
        let schema = schema_of(json!({ "aws": { "key": "default" } }));
        let resolved = resolver()
            .with_overrides(schema_of(json!({ "aws": { "key": null } })))
            .resolve(Some(schema))
            .unwrap();
        assert_eq!(resolved["aws"]["key"], json!("default"));
    }

    #[test]
    fn test_keys_outside_schema_are_never_added() {
        let schema = schema_of(json!({ "aws": { "key": "default" } }));
        let resolved = ConfigResolver::new()
            .with_overrides(schema_of(json!({
                "aws": { "extra": 1 },
                "unknown": { "x": 2 }
            })))
            .with_env(MapEnv::new().set("conf_aws_other", "3"))
            .with_source_loader(
                FixedLoader::new().with_secret(json!({ "aws": { "more": 4 } })),
            )
            .resolve(Some(schema))
            .unwrap();
        assert_eq!(resolved, schema_of(json!({ "aws": { "key": "default" } })));
    }

    #[test]
    fn test_objects_replaced_wholesale() {
        let schema = schema_of(json!({ "db": { "pool": { "min": 1, "max": 10 } } }));
        let resolved = resolver()
            .with_overrides(schema_of(json!({ "db": { "pool": { "max": 20 } } })))
            .resolve(Some(schema))
            .unwrap();
        // No deep merge below the key level: "min" is gone
        assert_eq!(resolved["db"]["pool"], json!({ "max": 20 }));
    }

    #[test]
    fn test_env_numeric_coercion() {
        let schema = schema_of(json!({ "server": { "port": 80 } }));
        let resolved = resolver()
            .with_env(MapEnv::new().set("conf_server_port", "42"))
            .resolve(Some(schema))
            .unwrap();
        assert_eq!(resolved["server"]["port"], json!(42));
    }

    #[test]
    fn test_env_json_coercion() {
        let schema = schema_of(json!({
            "flags": { "beta": false },
            "server": { "hosts": [] }
        }));
        let resolved = resolver()
            .with_env(
                MapEnv::new()
                    .set("conf_flags_beta", "true")
                    .set("conf_server_hosts", r#"["a", "b"]"#),
            )
            .resolve(Some(schema))
            .unwrap();
        // A JSON boolean stays a boolean; it is not numeric-coerced to 1
        assert_eq!(resolved["flags"]["beta"], json!(true));
        assert_eq!(resolved["server"]["hosts"], json!(["a", "b"]));
    }

    #[test]
    fn test_env_non_json_stays_string() {
        let schema = schema_of(json!({ "aws": { "region": "us-east-1" } }));
        let resolved = resolver()
            .with_env(MapEnv::new().set("conf_aws_region", "not json"))
            .resolve(Some(schema))
            .unwrap();
        assert_eq!(resolved["aws"]["region"], json!("not json"));
    }

    #[test]
    fn test_env_numeric_coercion_of_non_json_number() {
        // "042" is not valid JSON but is genuinely numeric
        let schema = schema_of(json!({ "server": { "port": 80 } }));
        let resolved = resolver()
            .with_env(MapEnv::new().set("conf_server_port", "042"))
            .resolve(Some(schema))
            .unwrap();
        assert_eq!(resolved["server"]["port"], json!(42));
    }

    #[test]
    fn test_env_whitespace_string_not_coerced() {
        let schema = schema_of(json!({ "aws": { "sep": "," } }));
        let resolved = resolver()
            .with_env(MapEnv::new().set("conf_aws_sep", " "))
            .resolve(Some(schema))
            .unwrap();
        assert_eq!(resolved["aws"]["sep"], json!(" "));
    }

    #[test]
    fn test_env_empty_string_is_unset() {
        let schema = schema_of(json!({ "aws": { "key": "default" } }));
        let resolved = resolver()
            .with_env(MapEnv::new().set("conf_aws_key", ""))
            .resolve(Some(schema))
            .unwrap();
        assert_eq!(resolved["aws"]["key"], json!("default"));
    }

    #[test]
    fn test_raw_env_disables_coercion() {
        let schema = schema_of(json!({ "server": { "port": 80 } }));
        let resolved = resolver()
            .with_raw_env(true)
            .with_env(MapEnv::new().set("conf_server_port", "42"))
            .resolve(Some(schema))
            .unwrap();
        assert_eq!(resolved["server"]["port"], json!("42"));
    }

    #[test]
    fn test_missing_default_schema_is_fatal() {
        let err = resolver().resolve(None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingDefaultSchema { .. }));
    }

    #[test]
    fn test_default_schema_loaded_when_none_supplied() {
        let resolved = ConfigResolver::new()
            .with_env(MapEnv::new())
            .with_source_loader(
                FixedLoader::new().with_default(json!({ "aws": { "key": "from-file" } })),
            )
            .resolve(None)
            .unwrap();
        assert_eq!(resolved["aws"]["key"], json!("from-file"));
    }

    #[test]
    fn test_strict_mode_fails_on_undefined_leaf() {
        let schema = schema_of(json!({
            "config": { "errorOnUndefined": true },
            "aws": { "key": null }
        }));
        let err = resolver().resolve(Some(schema)).unwrap_err();
        match err {
            ConfigError::Undefined { path } => assert_eq!(path, "aws.key"),
            other => panic!("expected Undefined, got {other:?}"),
        }
    }

    #[test]
    fn test_strict_mode_passes_once_sources_fill_leaves() {
        let schema = schema_of(json!({
            "config": { "errorOnUndefined": true },
            "aws": { "key": null }
        }));
        let resolved = resolver()
            .with_overrides(schema_of(json!({ "aws": { "key": "supplied" } })))
            .resolve(Some(schema))
            .unwrap();
        assert_eq!(resolved["aws"]["key"], json!("supplied"));
    }

    #[test]
    fn test_strict_mode_checks_nested_values() {
        let schema = schema_of(json!({
            "config": { "errorOnUndefined": true },
            "db": { "pool": { "min": 1, "max": null } }
        }));
        let err = resolver().resolve(Some(schema)).unwrap_err();
        match err {
            ConfigError::Undefined { path } => assert_eq!(path, "db.pool.max"),
            other => panic!("expected Undefined, got {other:?}"),
        }
    }

    #[test]
    fn test_lenient_mode_keeps_undefined_leaf() {
        let schema = schema_of(json!({ "aws": { "key": null } }));
        let resolved = resolver().resolve(Some(schema)).unwrap();
        assert_eq!(resolved["aws"]["key"], Value::Null);
    }

    #[test]
    fn test_strict_flag_truthiness() {
        // Falsy flag values disable the check
        for flag in [json!(false), json!(0), json!(""), Value::Null] {
            let schema = schema_of(json!({
                "config": { "errorOnUndefined": flag },
                "aws": { "key": null }
            }));
            assert!(resolver().resolve(Some(schema)).is_ok());
        }
        // Any truthy value enables it
        let schema = schema_of(json!({
            "config": { "errorOnUndefined": "yes" },
            "aws": { "key": null }
        }));
        assert!(resolver().resolve(Some(schema)).is_err());
    }

    #[test]
    fn test_strict_flag_respects_sources() {
        // The flag itself resolves through the priority chain before the
        // check runs: an override can switch strict mode on
        let schema = schema_of(json!({
            "config": { "errorOnUndefined": false },
            "aws": { "key": null }
        }));
        let err = resolver()
            .with_overrides(schema_of(json!({ "config": { "errorOnUndefined": true } })))
            .resolve(Some(schema))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Undefined { .. }));
    }

    #[test]
    fn test_empty_string_leaf_is_defined() {
        let schema = schema_of(json!({
            "config": { "errorOnUndefined": true },
            "aws": { "key": "" }
        }));
        assert!(resolver().resolve(Some(schema)).is_ok());
    }

    #[test]
    fn test_non_object_category_rejected() {
        let schema = schema_of(json!({ "flat": 42 }));
        let err = resolver().resolve(Some(schema)).unwrap_err();
        match err {
            ConfigError::InvalidSchema { path, .. } => assert_eq!(path, "flat"),
            other => panic!("expected InvalidSchema, got {other:?}"),
        }
    }

    #[test]
    fn test_coerce_env_value() {
        assert_eq!(coerce_env_value("42"), json!(42));
        assert_eq!(coerce_env_value("4.5"), json!(4.5));
        assert_eq!(coerce_env_value("true"), json!(true));
        assert_eq!(coerce_env_value("null"), Value::Null);
        assert_eq!(coerce_env_value(r#"{"a": 1}"#), json!({ "a": 1 }));
        assert_eq!(coerce_env_value("not json"), json!("not json"));
        assert_eq!(coerce_env_value("042"), json!(42));
        assert_eq!(coerce_env_value(" 7 "), json!(7));
        // A JSON string literal that is numeric still coerces
        assert_eq!(coerce_env_value(r#""13""#), json!(13));
        // Infinity is not a JSON number
        assert_eq!(coerce_env_value("inf"), json!("inf"));
    }
}
