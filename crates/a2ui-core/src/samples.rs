//! Canned responses mirroring what the demo application ships.
//!
//! Enabled with the `test-helpers` feature.

use serde_json::json;

use crate::protocol::{Accessibility, Component, JsonMap, PROTOCOL_VERSION, Response};

fn response(root: &str, components: Vec<Component>, data: JsonMap) -> Response {
    Response {
        version: PROTOCOL_VERSION.to_string(),
        root: root.to_string(),
        components,
        data,
        meta: None,
    }
}

/// A single text component.
#[must_use]
pub fn greeting() -> Response {
    response(
        "greeting",
        vec![
            Component::new("greeting", "text")
                .prop("content", "I'm ready to assist you.")
                .prop("variant", "body"),
        ],
        JsonMap::new(),
    )
}

/// A task dashboard exercising bindings, conditions, events and most
/// built-in component types.
#[must_use]
pub fn dashboard() -> Response {
    let mut data = JsonMap::new();
    data.insert("user".into(), json!({"name": "Ada", "admin": true}));
    data.insert("tasks".into(), json!({"open": 2, "filter": ""}));
    data.insert("showChart".into(), json!(false));

    let mut submit = Component::new("refresh", "button")
        .prop("label", "Refresh")
        .prop("variant", "primary");
    submit
        .events
        .insert("click".into(), json!({"action": "refresh", "payload": {"scope": "tasks"}}));
    submit.accessibility = Some(Accessibility {
        label: Some("Refresh tasks".into()),
        ..Accessibility::default()
    });

    response(
        "root",
        vec![
            Component::new("root", "container")
                .prop("layout", "vertical")
                .prop("gap", "md")
                .child("header")
                .child("tasks-card")
                .child("chart")
                .child("admin-chip")
                .child("refresh"),
            Component::new("header", "text")
                .prop("variant", "h2")
                .bind("content", "user.name"),
            Component::new("tasks-card", "card")
                .prop("title", "Tasks")
                .child("task-list")
                .child("filter")
                .child("task-table"),
            Component::new("task-list", "list").prop("variant", "checklist").prop(
                "items",
                json!([
                    {"id": "t1", "text": "Write parser", "status": "completed"},
                    {"id": "t2", "text": "Wire renderer", "status": "in-progress"},
                    {"id": "t3", "text": "Ship", "status": "pending"}
                ]),
            ),
            Component::new("filter", "input")
                .prop("placeholder", "Filter tasks")
                .bind("value", "tasks.filter"),
            Component::new("task-table", "data-table")
                .prop(
                    "columns",
                    json!([
                        {"key": "name", "label": "Name"},
                        {"key": "count", "label": "Count", "align": "right"}
                    ]),
                )
                .prop(
                    "data",
                    json!([
                        {"name": "open", "count": 2},
                        {"name": "closed", "count": 14}
                    ]),
                ),
            Component::new("chart", "chart")
                .prop("chartType", "bar")
                .prop("title", "Throughput")
                .prop(
                    "data",
                    json!({"labels": ["Mon", "Tue"], "datasets": [{"label": "done", "data": [3, 5]}]}),
                )
                .when("data.showChart === true"),
            Component::new("admin-chip", "chip")
                .prop("label", "Admin")
                .prop("variant", "success")
                .when("data.user.admin"),
            submit,
        ],
        data,
    )
}

/// Every sample with its name.
#[must_use]
pub fn all() -> Vec<(&'static str, Response)> {
    vec![("greeting", greeting()), ("dashboard", dashboard())]
}
