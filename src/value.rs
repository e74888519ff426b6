//! Dotted-path access into JSON trees.

use serde_json::Value;

/// Look up a dotted path (`composer.extra.regions`) inside a JSON value.
///
/// Object segments are matched by key and array segments by numeric index.
/// A missing segment at any depth, or a `null` leaf, yields `None`.
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    if current.is_null() { None } else { Some(current) }
}
