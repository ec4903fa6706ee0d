//! Dotted-path reads and immutable writes against the data model.
//!
//! Paths are split on `.` and walk nested JSON objects only; arrays and
//! scalars end a lookup.

use serde_json::Value;

use crate::protocol::JsonMap;

/// Look up `path` in `data`.
///
/// Returns `None` as soon as a segment is missing or the current value is
/// not an object. Never panics.
#[must_use]
pub fn resolve_binding<'a>(data: &'a JsonMap, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = data.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Return a copy of `data` with `value` written at `path`.
///
/// Missing intermediate objects are created. An intermediate that holds a
/// non-object value is replaced by a fresh object, losing the old value.
#[must_use]
pub fn set_binding(data: &JsonMap, path: &str, value: Value) -> JsonMap {
    let mut next = data.clone();
    write_path(&mut next, path, value);
    next
}

fn write_path(target: &mut JsonMap, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            target.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let slot = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(JsonMap::new()));
            if !slot.is_object() {
                tracing::debug!(
                    target: "a2ui.binding",
                    segment = head,
                    "overwriting non-object intermediate"
                );
                *slot = Value::Object(JsonMap::new());
            }
            if let Value::Object(inner) = slot {
                write_path(inner, rest, value);
            }
        }
    }
}
