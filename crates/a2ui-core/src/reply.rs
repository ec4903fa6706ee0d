//! Agent replies: the `{ "text": ..., "a2ui": ... }` envelope a model
//! returns, and normalization of the loose payload shape models produce.
//!
//! Models are prompted with nested components (children written inline as
//! objects), rarely emit `root` or `data`, and often wrap the whole reply
//! in a markdown code fence. [`parse_agent_reply`] peels the fence and the
//! envelope; [`normalize_payload`] turns the nested payload into the flat
//! wire shape the rest of the crate expects.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::id::{generate_id, unused_id};
use crate::protocol::{JsonMap, PROTOCOL_VERSION, Response};
use crate::validate::{ValidationResult, validate_response};

/// Why a reply could not produce a renderable response.
#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("reply carries no A2UI payload")]
    NoPayload,

    #[error("A2UI payload is invalid ({} error(s))", .0.errors.len())]
    Invalid(ValidationResult),

    #[error("A2UI payload does not deserialize: {0}")]
    Json(#[from] serde_json::Error),
}

/// A parsed agent reply.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentReply {
    /// Plain-text part of the reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Raw A2UI payload, not yet normalized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a2ui: Option<Value>,
}

impl AgentReply {
    /// Normalize and validate the payload into a [`Response`].
    pub fn response(&self) -> Result<Response, ReplyError> {
        let payload = self.a2ui.as_ref().ok_or(ReplyError::NoPayload)?;
        let normalized = normalize_payload(payload);
        let result = validate_response(&normalized);
        if !result.valid {
            return Err(ReplyError::Invalid(result));
        }
        Ok(serde_json::from_value(normalized)?)
    }
}

/// Remove a wrapping markdown code fence.
///
/// The opening fence line (with any language tag) is dropped; the closing
/// fence is dropped only when it is the last line.
#[must_use]
pub fn strip_code_fence(content: &str) -> String {
    if !content.starts_with("```") {
        return content.to_string();
    }
    let lines: Vec<&str> = content.split('\n').collect();
    let body = match lines.last() {
        Some(last) if lines.len() > 1 && last.trim_end() == "```" => &lines[1..lines.len() - 1],
        _ => &lines[1..],
    };
    body.join("\n")
}

/// Parse raw model output.
///
/// Content that is not a JSON object becomes a text-only reply. A JSON
/// object without `text`/`a2ui` keys but with `components` is taken to be
/// a bare payload.
#[must_use]
pub fn parse_agent_reply(content: &str) -> AgentReply {
    let trimmed = content.trim();
    let body = strip_code_fence(trimmed);
    match serde_json::from_str::<Value>(&body) {
        Ok(Value::Object(obj)) if obj.contains_key("text") || obj.contains_key("a2ui") => {
            AgentReply {
                text: obj.get("text").and_then(Value::as_str).map(str::to_string),
                a2ui: obj.get("a2ui").filter(|v| !v.is_null()).cloned(),
            }
        }
        Ok(Value::Object(obj)) if obj.contains_key("components") => AgentReply {
            text: None,
            a2ui: Some(Value::Object(obj)),
        },
        _ => {
            tracing::debug!(
                target: "a2ui.reply",
                len = trimmed.len(),
                "reply is not a JSON envelope; treating as text"
            );
            AgentReply {
                text: Some(trimmed.to_string()),
                a2ui: None,
            }
        }
    }
}

/// Bring a loose payload into wire shape.
///
/// * inline child objects are hoisted into `components` (parent first) and
///   replaced by their id; objects without an id get a generated one;
/// * a missing `version` becomes [`PROTOCOL_VERSION`];
/// * a missing `root` becomes the only top-level component, or a new
///   `container` wrapping all top-level components;
/// * a missing `data` becomes `{}`.
///
/// Anything else is passed through for the validator to judge. Already
/// normalized payloads come back unchanged.
#[must_use]
pub fn normalize_payload(raw: &Value) -> Value {
    let Some(obj) = raw.as_object() else {
        return raw.clone();
    };
    let mut out = obj.clone();

    if let Some(Value::Array(items)) = obj.get("components") {
        let mut flat = Vec::with_capacity(items.len());
        let mut top_ids = Vec::new();
        for item in items {
            if let Some(id) = hoist(item, &mut flat) {
                top_ids.push(id);
            }
        }
        let hoisted = flat.len() - items.len();

        if !out.contains_key("root") {
            match top_ids.as_slice() {
                [] => {}
                [only] => {
                    out.insert("root".into(), Value::String(only.clone()));
                }
                many => {
                    let taken = flat
                        .iter()
                        .filter_map(|c| c.get("id").and_then(Value::as_str));
                    let root_id = unused_id(taken, "root");
                    let mut container = JsonMap::new();
                    container.insert("id".into(), Value::String(root_id.clone()));
                    container.insert("type".into(), Value::String("container".into()));
                    container.insert(
                        "children".into(),
                        Value::Array(many.iter().cloned().map(Value::String).collect()),
                    );
                    flat.insert(0, Value::Object(container));
                    out.insert("root".into(), Value::String(root_id));
                }
            }
        }

        tracing::debug!(
            target: "a2ui.reply",
            components = flat.len(),
            hoisted,
            "payload normalized"
        );
        out.insert("components".into(), Value::Array(flat));
    }

    out.entry("version")
        .or_insert_with(|| Value::String(PROTOCOL_VERSION.to_string()));
    out.entry("data")
        .or_insert_with(|| Value::Object(JsonMap::new()));
    Value::Object(out)
}

/// Push `item` and its inline descendants onto `flat`; returns the id of
/// `item` when it is an object.
fn hoist(item: &Value, flat: &mut Vec<Value>) -> Option<String> {
    let Value::Object(source) = item else {
        flat.push(item.clone());
        return None;
    };
    let mut component = source.clone();
    let id = match component.get("id").and_then(Value::as_str) {
        Some(id) => id.to_string(),
        None => {
            let prefix = component
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("component");
            let id = generate_id(prefix);
            component.insert("id".into(), Value::String(id.clone()));
            id
        }
    };

    let slot = flat.len();
    flat.push(Value::Null);
    if let Some(Value::Array(children)) = source.get("children") {
        let mut refs = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Value::Object(_) => {
                    if let Some(child_id) = hoist(child, flat) {
                        refs.push(Value::String(child_id));
                    }
                }
                other => refs.push(other.clone()),
            }
        }
        component.insert("children".into(), Value::Array(refs));
    }
    flat[slot] = Value::Object(component);
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fence_with_closing_line_is_removed() {
        let raw = "```json\n{\"text\":\"hi\"}\n```";
        assert_eq!(strip_code_fence(raw), "{\"text\":\"hi\"}");
    }

    #[test]
    fn fence_without_closing_line_drops_only_opening() {
        assert_eq!(strip_code_fence("```\n{}"), "{}");
        assert_eq!(strip_code_fence("{}"), "{}");
    }

    #[test]
    fn envelope_is_split() {
        let reply = parse_agent_reply(
            r#"  {"text": "Hello", "a2ui": {"version": "1.0", "components": []}}  "#,
        );
        assert_eq!(reply.text.as_deref(), Some("Hello"));
        assert_eq!(reply.a2ui, Some(json!({"version": "1.0", "components": []})));
    }

    #[test]
    fn plain_text_reply() {
        let reply = parse_agent_reply("Sure, here you go.");
        assert_eq!(reply.text.as_deref(), Some("Sure, here you go."));
        assert!(reply.a2ui.is_none());
        assert!(matches!(reply.response(), Err(ReplyError::NoPayload)));
    }

    #[test]
    fn bare_payload_is_recognized() {
        let reply = parse_agent_reply(r#"{"components": [{"id": "t", "type": "text"}]}"#);
        assert!(reply.text.is_none());
        let response = reply.response().unwrap();
        assert_eq!(response.root, "t");
        assert_eq!(response.version, PROTOCOL_VERSION);
    }

    #[test]
    fn nested_children_are_flattened_parent_first() {
        let payload = json!({
            "version": "1.0",
            "components": [{
                "id": "main-card",
                "type": "card",
                "props": {"title": "Topic"},
                "children": [
                    {"id": "info", "type": "text", "props": {"content": "Details"}},
                    {"type": "list", "props": {"items": []}}
                ]
            }]
        });
        let normalized = normalize_payload(&payload);
        let components = normalized["components"].as_array().unwrap();
        assert_eq!(components.len(), 3);
        assert_eq!(components[0]["id"], "main-card");
        assert_eq!(components[1]["id"], "info");
        let generated = components[2]["id"].as_str().unwrap();
        assert!(generated.starts_with("list-"));
        assert_eq!(components[0]["children"], json!(["info", generated]));
        assert_eq!(normalized["root"], "main-card");
        assert_eq!(normalized["data"], json!({}));
        assert!(validate_response(&normalized).valid);
    }

    #[test]
    fn several_top_level_components_get_a_container_root() {
        let payload = json!({
            "components": [
                {"id": "a", "type": "text"},
                {"id": "b", "type": "chart"}
            ]
        });
        let normalized = normalize_payload(&payload);
        assert_eq!(normalized["root"], "root");
        assert_eq!(normalized["components"][0]["type"], "container");
        assert_eq!(normalized["components"][0]["children"], json!(["a", "b"]));
    }

    #[test]
    fn synthesized_root_avoids_existing_id() {
        let payload = json!({
            "components": [
                {"id": "root", "type": "text"},
                {"id": "b", "type": "text"}
            ]
        });
        let normalized = normalize_payload(&payload);
        let root = normalized["root"].as_str().unwrap();
        assert_ne!(root, "root");
        assert!(validate_response(&normalized).valid);
    }

    #[test]
    fn normalized_payload_is_stable() {
        let payload = json!({
            "version": "0.8",
            "root": "r",
            "components": [{"id": "r", "type": "container", "children": ["t"]}, {"id": "t", "type": "text"}],
            "data": {"x": 1}
        });
        assert_eq!(normalize_payload(&payload), payload);
    }

    #[test]
    fn invalid_payload_reports_validation() {
        let reply = AgentReply {
            text: None,
            a2ui: Some(json!({"components": [{"id": "a"}]})),
        };
        match reply.response() {
            Err(ReplyError::Invalid(result)) => {
                assert_eq!(result.errors[0].path, "components[0].type");
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn non_object_payload_passes_through() {
        assert_eq!(normalize_payload(&json!("x")), json!("x"));
    }
}
