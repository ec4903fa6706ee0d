#![forbid(unsafe_code)]

//! The interaction loop: a mutable handle over an immutable response.
//!
//! A [`Surface`] holds the current [`Response`] and replaces it wholesale
//! on every change. Local input goes through [`Surface::write_binding`] or
//! [`Surface::input`]; producer instructions go through [`Surface::apply`].
//! Each change bumps [`Surface::revision`] so hosts can tell when to walk
//! the tree again.

use a2ui_core::{
    JsonMap, Response, Update, apply_update, apply_updates, find_component, set_binding,
};
use serde::Serialize;
use serde_json::Value;

/// An event raised by a component, with its opaque action descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventDispatch {
    #[serde(rename = "componentId")]
    pub component_id: String,
    pub event: String,
    pub action: Value,
}

/// Current UI state plus a change counter.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    response: Response,
    revision: u64,
}

impl Surface {
    #[must_use]
    pub fn new(response: Response) -> Self {
        Self {
            response,
            revision: 0,
        }
    }

    #[must_use]
    pub fn response(&self) -> &Response {
        &self.response
    }

    #[must_use]
    pub fn into_response(self) -> Response {
        self.response
    }

    #[must_use]
    pub fn data(&self) -> &JsonMap {
        &self.response.data
    }

    /// Number of changes since construction.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Swap in a new response from the producer.
    pub fn reset(&mut self, response: Response) {
        self.commit(response);
    }

    /// Write `value` at the dotted `path` of the data model.
    pub fn write_binding(&mut self, path: &str, value: Value) {
        let mut next = self.response.clone();
        next.data = set_binding(&self.response.data, path, value);
        tracing::debug!(target: "a2ui.render", path, revision = self.revision + 1, "binding written");
        self.commit(next);
    }

    /// Route user input for `prop` of `component_id` through its binding.
    ///
    /// Returns `false`, changing nothing, when the component does not exist
    /// or does not bind `prop`.
    pub fn input(&mut self, component_id: &str, prop: &str, value: Value) -> bool {
        let Some(path) = find_component(&self.response, component_id)
            .and_then(|c| c.bindings.get(prop))
            .cloned()
        else {
            tracing::debug!(
                target: "a2ui.render",
                component_id,
                prop,
                "input on unbound prop ignored"
            );
            return false;
        };
        self.write_binding(&path, value);
        true
    }

    /// Apply one producer update.
    pub fn apply(&mut self, update: &Update) {
        let next = apply_update(&self.response, update);
        self.commit(next);
    }

    /// Apply a batch of producer updates in order.
    pub fn apply_all(&mut self, updates: &[Update]) {
        if updates.is_empty() {
            return;
        }
        let next = apply_updates(&self.response, updates);
        self.commit(next);
    }

    /// Look up the action bound to `event` on `component_id`.
    #[must_use]
    pub fn dispatch(&self, component_id: &str, event: &str) -> Option<EventDispatch> {
        let component = find_component(&self.response, component_id)?;
        let action = component.events.get(event)?;
        tracing::debug!(target: "a2ui.render", component_id, event, "event dispatched");
        Some(EventDispatch {
            component_id: component_id.to_string(),
            event: event.to_string(),
            action: action.clone(),
        })
    }

    fn commit(&mut self, next: Response) {
        self.response = next;
        self.revision += 1;
    }
}
