//! Document flattening - collapse nested objects into path-qualified keys
//!
//! Nested objects recurse; arrays and scalars are leaves. Arrays are kept
//! as-is so a downstream stage can decide whether to serialize them.

use serde_json::{Map, Value};

/// Default separator used to join nested key paths
pub const DEFAULT_SEPARATOR: &str = "_";

/// Flatten a nested document into a single-level map.
///
/// `{"a": 1, "b": {"c": 2}}` becomes `{"a": 1, "b_c": 2}` with the default
/// separator. Flattening an already-flat document is a no-op.
///
/// If two distinct nested paths join to the same compound key, the value
/// observed later during traversal silently overwrites the earlier one.
/// This matches the reference behavior and is deliberately not treated as
/// an error, since colliding paths are vanishingly rare in practice.
pub fn flatten_doc(doc: &Map<String, Value>, separator: &str) -> Map<String, Value> {
    let mut flat = Map::new();
    flatten_into(doc, "", separator, &mut flat);
    flat
}

fn flatten_into(
    doc: &Map<String, Value>,
    prefix: &str,
    separator: &str,
    out: &mut Map<String, Value>,
) {
    for (key, value) in doc.iter() {
        let joined = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}{}{}", prefix, separator, key)
        };

        match value {
            Value::Object(nested) => {
                flatten_into(nested, &joined, separator, out);
            }
            _ => {
                // Scalars and arrays are both leaves
                out.insert(joined, value.clone());
            }
        }
    }
}
