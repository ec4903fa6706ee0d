#![forbid(unsafe_code)]

//! Tree walk from `root` to widgets.
//!
//! The [`Renderer`] visits components depth-first in `children` order. For
//! each node it evaluates `when` against the data model, overlays resolved
//! bindings on the static props, renders children first and hands the
//! result to the factory registered for the node's `type`.
//!
//! Problems never abort the walk. They are collected as
//! [`RenderDiagnostic`]s next to whatever could be rendered:
//!
//! | kind                  | effect                                   |
//! |-----------------------|------------------------------------------|
//! | `UNKNOWN_TYPE`        | node rendered through the fallback       |
//! | `MISSING_ROOT`        | nothing rendered                         |
//! | `MISSING_CHILD`       | child skipped                            |
//! | `CYCLE_PRUNED`        | child skipped                            |
//! | `DEPTH_EXCEEDED`      | node and subtree skipped                 |
//! | `UNRESOLVED_BINDING`  | static prop (if any) kept                |
//! | `INVALID_PAYLOAD`     | validation failed (strict: no render)    |
//! | `MALFORMED_PAYLOAD`   | payload did not deserialize              |

use a2ui_core::{
    Accessibility, Component, ComponentIndex, JsonMap, Response, ValidationResult,
    evaluate_condition, index_components, resolve_binding, validate_response,
};
use serde::Serialize;
use serde_json::Value;
use web_time::Instant;

use crate::policy_config::RenderPolicy;
use crate::registry::Registry;

// ── Resolved component ───────────────────────────────────────────────────

/// A component as a factory sees it: static props with bindings applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedComponent<'a> {
    component: &'a Component,
    props: JsonMap,
    depth: usize,
}

impl<'a> ResolvedComponent<'a> {
    #[must_use]
    pub fn new(component: &'a Component, props: JsonMap, depth: usize) -> Self {
        Self {
            component,
            props,
            depth,
        }
    }

    #[must_use]
    pub fn id(&self) -> &'a str {
        &self.component.id
    }

    #[must_use]
    pub fn kind(&self) -> &'a str {
        &self.component.kind
    }

    /// Underlying wire component, bindings not applied.
    #[must_use]
    pub fn component(&self) -> &'a Component {
        self.component
    }

    /// Effective props.
    #[must_use]
    pub fn props(&self) -> &JsonMap {
        &self.props
    }

    #[must_use]
    pub fn prop(&self, name: &str) -> Option<&Value> {
        self.props.get(name)
    }

    /// String prop, `None` when absent or not a string.
    #[must_use]
    pub fn prop_str(&self, name: &str) -> Option<&str> {
        self.props.get(name).and_then(Value::as_str)
    }

    #[must_use]
    pub fn prop_bool(&self, name: &str) -> bool {
        self.props.get(name).and_then(Value::as_bool).unwrap_or(false)
    }

    #[must_use]
    pub fn events(&self) -> &'a JsonMap {
        &self.component.events
    }

    #[must_use]
    pub fn accessibility(&self) -> Option<&'a Accessibility> {
        self.component.accessibility.as_ref()
    }

    /// Distance from the root; the root is 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }
}

// ── Diagnostics ──────────────────────────────────────────────────────────

/// Category of a render-time problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticKind {
    UnknownType,
    MissingRoot,
    MissingChild,
    CyclePruned,
    DepthExceeded,
    UnresolvedBinding,
    InvalidPayload,
    MalformedPayload,
}

impl DiagnosticKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownType => "UNKNOWN_TYPE",
            Self::MissingRoot => "MISSING_ROOT",
            Self::MissingChild => "MISSING_CHILD",
            Self::CyclePruned => "CYCLE_PRUNED",
            Self::DepthExceeded => "DEPTH_EXCEEDED",
            Self::UnresolvedBinding => "UNRESOLVED_BINDING",
            Self::InvalidPayload => "INVALID_PAYLOAD",
            Self::MalformedPayload => "MALFORMED_PAYLOAD",
        }
    }
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One problem met during a walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderDiagnostic {
    pub kind: DiagnosticKind,
    /// Component the problem was found on; empty for payload-level issues.
    #[serde(rename = "componentId")]
    pub component_id: String,
    pub message: String,
}

impl RenderDiagnostic {
    fn new(kind: DiagnosticKind, component_id: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            component_id: component_id.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for RenderDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.component_id.is_empty() {
            write!(f, "[{}] {}", self.kind, self.message)
        } else {
            write!(f, "[{}] #{}: {}", self.kind, self.component_id, self.message)
        }
    }
}

/// Result of a walk.
#[derive(Debug, Clone)]
pub struct RenderOutcome<W> {
    /// Widget for `root`; `None` when the root is missing, hidden or the
    /// payload was rejected.
    pub root: Option<W>,
    pub diagnostics: Vec<RenderDiagnostic>,
    /// Ids of components whose `when` evaluated false.
    pub hidden: Vec<String>,
    /// Number of factory invocations.
    pub rendered: usize,
    /// Present when the payload was validated before rendering.
    pub validation: Option<ValidationResult>,
}

impl<W> RenderOutcome<W> {
    fn empty() -> Self {
        Self {
            root: None,
            diagnostics: Vec::new(),
            hidden: Vec::new(),
            rendered: 0,
            validation: None,
        }
    }

    /// Number of diagnostics of `kind`.
    #[must_use]
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }

    /// `true` when something was rendered and nothing was diagnosed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.root.is_some() && self.diagnostics.is_empty()
    }
}

// ── Renderer ─────────────────────────────────────────────────────────────

/// Walks responses into widgets of type `W` using its own [`Registry`].
#[derive(Debug)]
pub struct Renderer<W> {
    registry: Registry<W>,
    policy: RenderPolicy,
}

impl<W> Renderer<W> {
    /// Renderer with the default policy.
    #[must_use]
    pub fn new(registry: Registry<W>) -> Self {
        Self::with_policy(registry, RenderPolicy::default())
    }

    #[must_use]
    pub fn with_policy(registry: Registry<W>, policy: RenderPolicy) -> Self {
        Self { registry, policy }
    }

    #[must_use]
    pub fn registry(&self) -> &Registry<W> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry<W> {
        &mut self.registry
    }

    #[must_use]
    pub fn policy(&self) -> &RenderPolicy {
        &self.policy
    }

    pub fn set_policy(&mut self, policy: RenderPolicy) {
        self.policy = policy;
    }

    /// Render a typed response.
    pub fn render(&self, response: &Response) -> RenderOutcome<W> {
        let _span = tracing::debug_span!(
            "a2ui.render",
            root = %response.root,
            components = response.components.len()
        )
        .entered();
        let started = Instant::now();

        let mut walk = Walk {
            renderer: self,
            index: index_components(response),
            data: &response.data,
            ancestry: Vec::new(),
            outcome: RenderOutcome::empty(),
        };
        match walk.index.get(response.root.as_str()).copied() {
            Some(root) => {
                let widget = walk.node(root, 0);
                walk.outcome.root = widget;
            }
            None => walk.outcome.diagnostics.push(RenderDiagnostic::new(
                DiagnosticKind::MissingRoot,
                "",
                format!("root `{}` does not match any component", response.root),
            )),
        }

        let outcome = walk.outcome;
        tracing::debug!(
            target: "a2ui.render",
            rendered = outcome.rendered,
            hidden = outcome.hidden.len(),
            diagnostics = outcome.diagnostics.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "render complete"
        );
        outcome
    }

    /// Render an untyped payload, validating first when the policy asks for
    /// it.
    pub fn render_value(&self, raw: &Value) -> RenderOutcome<W> {
        let validation = self
            .policy
            .validate_before_render
            .then(|| validate_response(raw));
        let invalid = validation.as_ref().is_some_and(|v| !v.valid);

        if invalid && self.policy.strict {
            let mut outcome = RenderOutcome::empty();
            let errors = validation.as_ref().map_or(0, |v| v.errors.len());
            tracing::warn!(target: "a2ui.render", errors, "strict policy rejected payload");
            outcome.diagnostics.push(RenderDiagnostic::new(
                DiagnosticKind::InvalidPayload,
                "",
                format!("payload has {errors} validation error(s)"),
            ));
            outcome.validation = validation;
            return outcome;
        }

        let response = match serde_json::from_value::<Response>(raw.clone()) {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(target: "a2ui.render", error = %error, "payload does not deserialize");
                let mut outcome = RenderOutcome::empty();
                outcome.diagnostics.push(RenderDiagnostic::new(
                    DiagnosticKind::MalformedPayload,
                    "",
                    error.to_string(),
                ));
                outcome.validation = validation;
                return outcome;
            }
        };

        let mut outcome = self.render(&response);
        if invalid {
            let errors = validation.as_ref().map_or(0, |v| v.errors.len());
            outcome.diagnostics.insert(
                0,
                RenderDiagnostic::new(
                    DiagnosticKind::InvalidPayload,
                    "",
                    format!("rendering leniently despite {errors} validation error(s)"),
                ),
            );
        }
        outcome.validation = validation;
        outcome
    }
}

struct Walk<'r, 'a, W> {
    renderer: &'r Renderer<W>,
    index: ComponentIndex<'a>,
    data: &'a JsonMap,
    ancestry: Vec<&'a str>,
    outcome: RenderOutcome<W>,
}

impl<'a, W> Walk<'_, 'a, W> {
    fn diagnose(&mut self, kind: DiagnosticKind, component_id: &str, message: String) {
        self.outcome
            .diagnostics
            .push(RenderDiagnostic::new(kind, component_id, message));
    }

    fn node(&mut self, component: &'a Component, depth: usize) -> Option<W> {
        let renderer = self.renderer;
        let max_depth = renderer.policy.max_depth;
        if depth >= max_depth {
            self.diagnose(
                DiagnosticKind::DepthExceeded,
                &component.id,
                format!("depth {depth} reaches the limit of {max_depth}"),
            );
            return None;
        }
        if let Some(expr) = component.when.as_deref()
            && !evaluate_condition(expr, self.data)
        {
            tracing::debug!(
                target: "a2ui.render",
                component_id = %component.id,
                expr,
                "hidden by condition"
            );
            self.outcome.hidden.push(component.id.clone());
            return None;
        }

        self.ancestry.push(component.id.as_str());
        let mut children = Vec::with_capacity(component.children.len());
        for child_id in &component.children {
            let Some(child) = self.index.get(child_id.as_str()).copied() else {
                self.diagnose(
                    DiagnosticKind::MissingChild,
                    &component.id,
                    format!("child `{child_id}` does not match any component"),
                );
                continue;
            };
            if self.ancestry.contains(&child.id.as_str()) {
                tracing::warn!(
                    target: "a2ui.render",
                    parent = %component.id,
                    child = %child_id,
                    "pruned cyclic child reference"
                );
                self.diagnose(
                    DiagnosticKind::CyclePruned,
                    &component.id,
                    format!("child `{child_id}` is an ancestor"),
                );
                continue;
            }
            if let Some(widget) = self.node(child, depth + 1) {
                children.push(widget);
            }
        }
        self.ancestry.pop();

        let props = self.resolve_props(component);
        let resolved = ResolvedComponent::new(component, props, depth);
        let (factory, fallback) = renderer.registry.resolve(&component.kind);
        if fallback {
            tracing::debug!(
                target: "a2ui.render",
                component_id = %component.id,
                kind = %component.kind,
                "unknown component type"
            );
            self.diagnose(
                DiagnosticKind::UnknownType,
                &component.id,
                format!("no widget registered for type `{}`", component.kind),
            );
        }
        self.outcome.rendered += 1;
        Some(factory.build(&resolved, children))
    }

    fn resolve_props(&mut self, component: &Component) -> JsonMap {
        let mut props = component.props.clone();
        if !self.renderer.policy.resolve_bindings {
            return props;
        }
        let data = self.data;
        for (prop, path) in &component.bindings {
            match resolve_binding(data, path) {
                Some(value) => {
                    props.insert(prop.clone(), value.clone());
                }
                None => self.diagnose(
                    DiagnosticKind::UnresolvedBinding,
                    &component.id,
                    format!("`{prop}` is bound to missing path `{path}`"),
                ),
            }
        }
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a2ui_core::PROTOCOL_VERSION;
    use serde_json::json;

    /// Widgets as `kind#id[children]` strings.
    fn string_renderer() -> Renderer<String> {
        let mut registry: Registry<String> =
            Registry::new(|c: &ResolvedComponent<'_>, _: Vec<String>| format!("?{}", c.id()));
        for kind in ["container", "text", "card"] {
            registry.register(kind, |c: &ResolvedComponent<'_>, children: Vec<String>| {
                if children.is_empty() {
                    format!("{}#{}", c.kind(), c.id())
                } else {
                    format!("{}#{}[{}]", c.kind(), c.id(), children.join(","))
                }
            });
        }
        Renderer::new(registry)
    }

    fn response(root: &str, components: Vec<Component>, data: Value) -> Response {
        let Value::Object(data) = data else {
            panic!("data must be an object");
        };
        Response {
            version: PROTOCOL_VERSION.to_string(),
            root: root.to_string(),
            components,
            data,
            meta: None,
        }
    }

    #[test]
    fn renders_children_in_order() {
        let r = response(
            "root",
            vec![
                Component::new("root", "container").child("b").child("a"),
                Component::new("a", "text"),
                Component::new("b", "text"),
            ],
            json!({}),
        );
        let outcome = string_renderer().render(&r);
        assert_eq!(
            outcome.root.as_deref(),
            Some("container#root[text#b,text#a]")
        );
        assert!(outcome.is_clean());
        assert_eq!(outcome.rendered, 3);
    }

    #[test]
    fn unknown_type_uses_fallback_and_is_diagnosed() {
        let r = response(
            "root",
            vec![
                Component::new("root", "container").child("x"),
                Component::new("x", "hologram"),
            ],
            json!({}),
        );
        let outcome = string_renderer().render(&r);
        assert_eq!(outcome.root.as_deref(), Some("container#root[?x]"));
        assert_eq!(outcome.count(DiagnosticKind::UnknownType), 1);
        assert_eq!(outcome.diagnostics[0].component_id, "x");
    }

    #[test]
    fn false_condition_hides_subtree() {
        let r = response(
            "root",
            vec![
                Component::new("root", "container").child("gated").child("plain"),
                Component::new("gated", "card").child("inner").when("data.flag === true"),
                Component::new("inner", "text"),
                Component::new("plain", "text"),
            ],
            json!({"flag": false}),
        );
        let outcome = string_renderer().render(&r);
        assert_eq!(outcome.root.as_deref(), Some("container#root[text#plain]"));
        assert_eq!(outcome.hidden, vec!["gated".to_string()]);
    }

    #[test]
    fn broken_condition_fails_open() {
        let r = response(
            "t",
            vec![Component::new("t", "text").when("not a valid $$ expr")],
            json!({}),
        );
        let outcome = string_renderer().render(&r);
        assert_eq!(outcome.root.as_deref(), Some("text#t"));
        assert!(outcome.hidden.is_empty());
    }

    #[test]
    fn cycle_is_pruned() {
        let r = response(
            "a",
            vec![
                Component::new("a", "card").child("b"),
                Component::new("b", "card").child("a"),
            ],
            json!({}),
        );
        let outcome = string_renderer().render(&r);
        assert_eq!(outcome.root.as_deref(), Some("card#a[card#b]"));
        assert_eq!(outcome.count(DiagnosticKind::CyclePruned), 1);
    }

    #[test]
    fn depth_limit_stops_descent() {
        let mut registry_policy = RenderPolicy::default();
        registry_policy.max_depth = 2;
        let mut renderer = string_renderer();
        renderer.set_policy(registry_policy);
        let r = response(
            "a",
            vec![
                Component::new("a", "card").child("b"),
                Component::new("b", "card").child("c"),
                Component::new("c", "text"),
            ],
            json!({}),
        );
        let outcome = renderer.render(&r);
        assert_eq!(outcome.root.as_deref(), Some("card#a[card#b]"));
        assert_eq!(outcome.count(DiagnosticKind::DepthExceeded), 1);
    }

    #[test]
    fn bindings_override_static_props() {
        let mut registry: Registry<String> =
            Registry::new(|_: &ResolvedComponent<'_>, _: Vec<String>| String::new());
        registry.register("text", |c: &ResolvedComponent<'_>, _: Vec<String>| {
            c.prop_str("content").unwrap_or("-").to_string()
        });
        let renderer = Renderer::new(registry);
        let bound = Component::new("t", "text")
            .prop("content", "static")
            .bind("content", "user.name");

        let r = response("t", vec![bound.clone()], json!({"user": {"name": "Ada"}}));
        assert_eq!(renderer.render(&r).root.as_deref(), Some("Ada"));

        let missing = response("t", vec![bound], json!({}));
        let outcome = renderer.render(&missing);
        assert_eq!(outcome.root.as_deref(), Some("static"));
        assert_eq!(outcome.count(DiagnosticKind::UnresolvedBinding), 1);
    }

    #[test]
    fn missing_root_renders_nothing() {
        let r = response("ghost", vec![Component::new("a", "text")], json!({}));
        let outcome = string_renderer().render(&r);
        assert!(outcome.root.is_none());
        assert_eq!(outcome.count(DiagnosticKind::MissingRoot), 1);
    }

    #[test]
    fn render_value_strict_rejects_invalid() {
        let raw = json!({
            "version": "0.8",
            "root": "r",
            "components": [{"id": "r", "type": "container", "children": ["nope"]}]
        });
        let mut renderer = string_renderer();
        let lenient = renderer.render_value(&raw);
        assert_eq!(lenient.root.as_deref(), Some("container#r"));
        assert_eq!(lenient.count(DiagnosticKind::InvalidPayload), 1);
        assert_eq!(lenient.count(DiagnosticKind::MissingChild), 1);

        renderer.set_policy(RenderPolicy {
            strict: true,
            ..RenderPolicy::default()
        });
        let strict = renderer.render_value(&raw);
        assert!(strict.root.is_none());
        assert!(strict.validation.is_some_and(|v| !v.valid));
    }

    #[test]
    fn render_value_reports_malformed_payload() {
        let outcome = string_renderer().render_value(&json!({"root": 5}));
        assert!(outcome.root.is_none());
        assert_eq!(outcome.count(DiagnosticKind::MalformedPayload), 1);
    }
}
