//! The two-level configuration schema model.
//!
//! A schema maps category names to categories; a category maps key names to
//! arbitrary JSON values. The shape is fixed at exactly two levels: values
//! below a key are opaque and replaced wholesale by higher-priority sources.
//!
//! `Value::Null` plays the role of "undefined": a key present with a null
//! value is resolvable but carries no default, and a null entry in an
//! override or secret source means "not specified" rather than "set to null".

use serde::de::DeserializeOwned;
use serde_json::Value;

/// A configuration schema: category name -> key name -> value.
///
/// Categories preserve their file/insertion order. Every value at the top
/// level is expected to be a JSON object (the category's key map).
pub type Schema = serde_json::Map<String, Value>;

/// Whether a value counts as defined (anything but null).
///
/// Strings are always defined, even when empty.
pub fn is_defined(value: &Value) -> bool {
    !value.is_null()
}

/// JS-style truthiness: null, `false`, `0`, and `""` are falsy; every
/// other value (including empty objects and arrays) is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Object(_) | Value::Array(_) => true,
    }
}

/// Look up `schema[category][key]`, returning `None` when the category is
/// absent, is not an object, or does not contain the key.
pub fn entry<'a>(schema: &'a Schema, category: &str, key: &str) -> Option<&'a Value> {
    schema.get(category)?.as_object()?.get(key)
}

/// Deserialize a resolved schema into a typed configuration struct.
///
/// Convenience for callers that want strongly typed access after
/// resolution instead of indexing into the value tree.
pub fn into_typed<T: DeserializeOwned>(schema: Schema) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(schema))
}
