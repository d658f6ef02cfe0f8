//! Recursive undefined-leaf detection.
//!
//! Used by strict mode to verify that every leaf of a resolved schema
//! carries a value. Null is the "undefined" marker; strings are opaque and
//! always count as defined, even when empty.

use serde_json::Value;

/// Find the first undefined (null) leaf in `value`, depth-first.
///
/// Returns the dotted path of the first null encountered, rooted at `path`,
/// or `None` when the value is fully defined. Remaining siblings are not
/// visited once a null is found. Array elements contribute their index as
/// a path segment.
pub fn find_undefined(value: &Value, path: &str) -> Option<String> {
    match value {
        Value::Null => Some(path.to_string()),
        Value::Object(map) => map
            .iter()
            .find_map(|(key, child)| find_undefined(child, &join(path, key))),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .find_map(|(idx, child)| find_undefined(child, &join(path, &idx.to_string()))),
        // Scalars (including empty strings) are always defined
        _ => None,
    }
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{path}.{segment}")
    }
}
