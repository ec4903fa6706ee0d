//! Immutable application of add/remove/update/replace instructions.
//!
//! Every function here takes the current [`Response`] by reference and
//! returns a new one. There is no error channel: an update that names an
//! unknown target or carries a malformed component is a structural no-op,
//! so a late or duplicated instruction from a producer cannot break the UI.
//! `remove` is the exception: it still scrubs dangling `children` entries
//! naming the target. The `data` patch of an update is always merged.

use serde_json::Value;

use crate::protocol::{Component, JsonMap, Response, Update, UpdateOperation};

/// Component fields merged key-wise by `update` instead of replaced.
const MERGED_FIELDS: [&str; 3] = ["props", "events", "bindings"];

/// Apply one update, producing a new response.
#[must_use]
pub fn apply_update(response: &Response, update: &Update) -> Response {
    let mut next = response.clone();
    let target = update.target_id.as_str();

    let changed = match update.operation {
        UpdateOperation::Add => add_component(&mut next, update),
        UpdateOperation::Remove => remove_component(&mut next, target),
        UpdateOperation::Update | UpdateOperation::Replace => {
            rewrite_components(&mut next, update)
        }
    };

    if let Some(patch) = &update.data {
        for (key, value) in patch {
            next.data.insert(key.clone(), value.clone());
        }
    }

    if changed {
        tracing::debug!(
            target: "a2ui.update",
            operation = %update.operation,
            target_id = target,
            components = next.components.len(),
            "update applied"
        );
    } else {
        tracing::debug!(
            target: "a2ui.update",
            operation = %update.operation,
            target_id = target,
            "structural no-op"
        );
    }
    next
}

/// Apply updates left to right; later updates see earlier effects.
#[must_use]
pub fn apply_updates(response: &Response, updates: &[Update]) -> Response {
    let _span = tracing::debug_span!("a2ui.apply_updates", count = updates.len()).entered();
    updates
        .iter()
        .fold(response.clone(), |acc, update| apply_update(&acc, update))
}

fn add_component(next: &mut Response, update: &Update) -> bool {
    let Some(payload) = &update.component else {
        return false;
    };
    match serde_json::from_value::<Component>(Value::Object(payload.clone())) {
        Ok(component) => {
            next.components.push(component);
            true
        }
        Err(error) => {
            tracing::debug!(
                target: "a2ui.update",
                error = %error,
                "add payload is not a component"
            );
            false
        }
    }
}

/// Drops every component named `target` and every `children` entry that
/// points at it, declared or not.
fn remove_component(next: &mut Response, target: &str) -> bool {
    let before = next.components.len();
    next.components.retain(|c| c.id != target);
    let mut changed = next.components.len() != before;
    for component in &mut next.components {
        let refs = component.children.len();
        component.children.retain(|child| child != target);
        changed |= component.children.len() != refs;
    }
    changed
}

fn rewrite_components(next: &mut Response, update: &Update) -> bool {
    let Some(patch) = &update.component else {
        return false;
    };
    let mut changed = false;
    for component in next
        .components
        .iter_mut()
        .filter(|c| c.id == update.target_id)
    {
        let rebuilt = match update.operation {
            UpdateOperation::Replace => replaced(&update.target_id, patch),
            _ => merged(component, patch),
        };
        if let Some(rebuilt) = rebuilt {
            *component = rebuilt;
            changed = true;
        }
    }
    changed
}

/// `component` with `patch` laid over it. `null` in the patch clears a
/// field; `id` is never changed.
fn merged(component: &Component, patch: &JsonMap) -> Option<Component> {
    let Ok(Value::Object(mut fields)) = serde_json::to_value(component) else {
        return None;
    };
    for (key, value) in patch {
        if key == "id" {
            continue;
        }
        if value.is_null() {
            fields.remove(key);
            continue;
        }
        let key_wise = MERGED_FIELDS.contains(&key.as_str())
            && value.is_object()
            && fields.get(key).is_some_and(Value::is_object);
        if !key_wise {
            fields.insert(key.clone(), value.clone());
            continue;
        }
        if let (Some(Value::Object(existing)), Value::Object(incoming)) =
            (fields.get_mut(key), value)
        {
            for (k, v) in incoming {
                existing.insert(k.clone(), v.clone());
            }
        }
    }
    from_fields(fields)
}

/// A component built from `patch` alone, keeping `id`.
fn replaced(id: &str, patch: &JsonMap) -> Option<Component> {
    let mut fields: JsonMap = patch
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    fields.insert("id".to_string(), Value::String(id.to_string()));
    from_fields(fields)
}

fn from_fields(fields: JsonMap) -> Option<Component> {
    match serde_json::from_value(Value::Object(fields)) {
        Ok(component) => Some(component),
        Err(error) => {
            tracing::debug!(
                target: "a2ui.update",
                error = %error,
                "patched component is malformed"
            );
            None
        }
    }
}
