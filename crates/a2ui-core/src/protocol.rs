//! Wire contract for A2UI responses, components and updates.
//!
//! A [`Response`] owns a flat list of [`Component`]s. Components refer to
//! their children by identifier only; the tree shape is recovered by
//! [`crate::tree::build_component_tree`]. Every type here is a plain value:
//! nothing in this module mutates shared state.
//!
//! # Example
//!
//! ```
//! use a2ui_core::protocol::Response;
//!
//! let raw = r#"{"version":"0.8","root":"r","components":[{"id":"r","type":"container","children":[]}],"data":{}}"#;
//! let response: Response = serde_json::from_str(raw).unwrap();
//! assert_eq!(response.root, "r");
//! assert_eq!(response.components[0].kind, "container");
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Protocol version stamped on responses created by this crate.
pub const PROTOCOL_VERSION: &str = "0.8";

/// JSON object type used for props, events and the data model.
pub type JsonMap = Map<String, Value>;

// ── Response ─────────────────────────────────────────────────────────────

/// The top-level payload emitted by an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Protocol version tag.
    pub version: String,
    /// Identifier of the entry component.
    pub root: String,
    /// Flat component list. Order is preserved for stable serialization
    /// but carries no tree meaning.
    pub components: Vec<Component>,
    /// Data model the UI binds against.
    #[serde(default)]
    pub data: JsonMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl Response {
    /// Number of declared components, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

// ── Component ────────────────────────────────────────────────────────────

/// One node of the UI tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    /// Renderer registry key. Open-ended: unknown values are legal and are
    /// rendered through the registry fallback.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub props: JsonMap,
    /// Ordered child identifiers (render order).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
    /// Event name to opaque action descriptor.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub events: JsonMap,
    /// Prop name to dotted path into the data model.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bindings: BTreeMap<String, String>,
    /// Condition gating whether the node renders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<Accessibility>,
}

impl Component {
    /// Create a component with the given id and type and nothing else.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Append a child identifier.
    #[must_use]
    pub fn child(mut self, id: impl Into<String>) -> Self {
        self.children.push(id.into());
        self
    }

    /// Set a static prop.
    #[must_use]
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    /// Bind a prop to a data path.
    #[must_use]
    pub fn bind(mut self, prop: impl Into<String>, path: impl Into<String>) -> Self {
        self.bindings.insert(prop.into(), path.into());
        self
    }

    /// Gate rendering on a condition expression.
    #[must_use]
    pub fn when(mut self, expr: impl Into<String>) -> Self {
        self.when = Some(expr.into());
        self
    }
}

/// Accessibility metadata forwarded to the renderer untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessibility {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
}

// ── Update ───────────────────────────────────────────────────────────────

/// The closed set of update operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateOperation {
    Add,
    Remove,
    Update,
    Replace,
}

impl UpdateOperation {
    pub const ALL: [Self; 4] = [Self::Add, Self::Remove, Self::Update, Self::Replace];

    /// Wire name of the operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Update => "update",
            Self::Replace => "replace",
        }
    }

    /// Parse a wire name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }
}

impl std::fmt::Display for UpdateOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single mutation instruction.
///
/// `component` is kept as a raw JSON object because `update` patches are
/// partial: fields absent from the patch must stay absent rather than be
/// filled with defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub operation: UpdateOperation,
    #[serde(rename = "targetId")]
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<JsonMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonMap>,
}

impl Update {
    fn bare(operation: UpdateOperation, target_id: impl Into<String>) -> Self {
        Self {
            operation,
            target_id: target_id.into(),
            component: None,
            data: None,
        }
    }

    /// Append `component` as a new node. `context_id` names the sibling
    /// context and is not required to exist.
    #[must_use]
    pub fn add(context_id: impl Into<String>, component: &Component) -> Self {
        let mut update = Self::bare(UpdateOperation::Add, context_id);
        update.component = component_to_map(component);
        update
    }

    #[must_use]
    pub fn remove(target_id: impl Into<String>) -> Self {
        Self::bare(UpdateOperation::Remove, target_id)
    }

    /// Merge `patch` into the target component.
    #[must_use]
    pub fn patch(target_id: impl Into<String>, patch: JsonMap) -> Self {
        let mut update = Self::bare(UpdateOperation::Update, target_id);
        update.component = Some(patch);
        update
    }

    /// Rebuild the target component from `patch`, keeping only its id.
    #[must_use]
    pub fn replace(target_id: impl Into<String>, patch: JsonMap) -> Self {
        let mut update = Self::bare(UpdateOperation::Replace, target_id);
        update.component = Some(patch);
        update
    }

    /// Attach a data-model patch merged after the structural operation.
    #[must_use]
    pub fn with_data(mut self, data: JsonMap) -> Self {
        self.data = Some(data);
        self
    }
}

fn component_to_map(component: &Component) -> Option<JsonMap> {
    match serde_json::to_value(component) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────

/// Copy a response. Responses are plain values, so this is a deep clone.
#[must_use]
pub fn clone_response(response: &Response) -> Response {
    response.clone()
}

/// A response holding a single empty `container` named `root`.
#[must_use]
pub fn create_empty_response() -> Response {
    Response {
        version: PROTOCOL_VERSION.to_string(),
        root: "root".to_string(),
        components: vec![Component::new("root", "container")],
        data: JsonMap::new(),
        meta: None,
    }
}
