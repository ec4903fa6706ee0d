//! Property-based invariant tests for update application and validation.
//!
//! 1. apply_update never mutates its input
//! 2. An empty batch is the identity
//! 3. Remove leaves no component or child reference to the target
//! 4. Update/replace never change the set of component ids
//! 5. Data patches always land, whatever the structural outcome
//! 6. Duplicate ids are reported once per repeated occurrence
//! 7. Each dangling child reference is reported once
//! 8. The nested tree never contains a component twice on one path

use std::collections::BTreeSet;

use a2ui_core::{
    Component, ComponentNode, JsonMap, PROTOCOL_VERSION, Response, Update, ValidationCode,
    apply_update, apply_updates, build_component_tree, validate_response,
};
use proptest::prelude::*;
use serde_json::{Value, json};

// ── Strategies ──────────────────────────────────────────────────────

fn id_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c", "d", "e", "f"]).prop_map(str::to_string)
}

fn kind_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["text", "container", "card", "button", "chip"])
        .prop_map(str::to_string)
}

fn component_strategy() -> impl Strategy<Value = Component> {
    (
        id_strategy(),
        kind_strategy(),
        prop::collection::vec(id_strategy(), 0..4),
        any::<i32>(),
    )
        .prop_map(|(id, kind, children, n)| {
            let mut component = Component::new(id, kind).prop("n", n);
            component.children = children;
            component
        })
}

fn response_strategy() -> impl Strategy<Value = Response> {
    prop::collection::vec(component_strategy(), 1..8).prop_map(|components| Response {
        version: PROTOCOL_VERSION.to_string(),
        root: components[0].id.clone(),
        components,
        data: JsonMap::new(),
        meta: None,
    })
}

fn patch_strategy() -> impl Strategy<Value = JsonMap> {
    (any::<bool>(), any::<i32>()).prop_map(|(flag, n)| {
        let mut patch = JsonMap::new();
        patch.insert("props".into(), json!({"flag": flag, "n": n}));
        patch
    })
}

fn update_strategy() -> impl Strategy<Value = Update> {
    prop_oneof![
        component_strategy().prop_map(|c| Update::add("a", &c)),
        id_strategy().prop_map(Update::remove),
        (id_strategy(), patch_strategy()).prop_map(|(id, p)| Update::patch(id, p)),
        (id_strategy(), patch_strategy()).prop_map(|(id, p)| Update::replace(id, p)),
    ]
}

fn ids(response: &Response) -> Vec<String> {
    let mut ids: Vec<String> = response.components.iter().map(|c| c.id.clone()).collect();
    ids.sort();
    ids
}

fn no_repeat_on_path<'a>(node: &ComponentNode<'a>, path: &mut Vec<&'a str>) -> bool {
    if path.contains(&node.component.id.as_str()) {
        return false;
    }
    path.push(node.component.id.as_str());
    let ok = node
        .child_nodes
        .iter()
        .all(|child| no_repeat_on_path(child, path));
    path.pop();
    ok
}

// ═════════════════════════════════════════════════════════════════════
// Update application
// ═════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn input_is_never_mutated(response in response_strategy(), update in update_strategy()) {
        let before = response.clone();
        let _ = apply_update(&response, &update);
        prop_assert_eq!(response, before);
    }

    #[test]
    fn empty_batch_is_identity(response in response_strategy()) {
        prop_assert_eq!(apply_updates(&response, &[]), response);
    }

    #[test]
    fn remove_scrubs_every_reference(response in response_strategy(), target in id_strategy()) {
        let next = apply_update(&response, &Update::remove(target.clone()));
        prop_assert!(next.components.iter().all(|c| c.id != target));
        prop_assert!(next
            .components
            .iter()
            .all(|c| c.children.iter().all(|child| *child != target)));
    }

    #[test]
    fn rewrites_preserve_ids(
        response in response_strategy(),
        target in id_strategy(),
        patch in patch_strategy(),
        replace in any::<bool>(),
    ) {
        let update = if replace {
            Update::replace(target, patch)
        } else {
            Update::patch(target, patch)
        };
        let next = apply_update(&response, &update);
        prop_assert_eq!(ids(&next), ids(&response));
    }

    #[test]
    fn data_patch_always_lands(
        response in response_strategy(),
        update in update_strategy(),
        value in any::<i64>(),
    ) {
        let mut data = JsonMap::new();
        data.insert("k".into(), json!(value));
        let next = apply_update(&response, &update.with_data(data));
        prop_assert_eq!(next.data.get("k"), Some(&json!(value)));
    }

    #[test]
    fn batches_never_panic(
        response in response_strategy(),
        updates in prop::collection::vec(update_strategy(), 0..12),
    ) {
        let next = apply_updates(&response, &updates);
        prop_assert_eq!(next.version, response.version);
    }
}

// ═════════════════════════════════════════════════════════════════════
// Validation and tree construction
// ═════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn duplicate_ids_are_counted(response in response_strategy()) {
        let raw = serde_json::to_value(&response).unwrap();
        let result = validate_response(&raw);
        let distinct = ids(&response).into_iter().collect::<BTreeSet<_>>().len();
        prop_assert_eq!(
            result.count(ValidationCode::DuplicateId),
            response.components.len() - distinct
        );
    }

    #[test]
    fn dangling_children_are_counted(response in response_strategy()) {
        let raw = serde_json::to_value(&response).unwrap();
        let result = validate_response(&raw);
        let known = ids(&response);
        let dangling = response
            .components
            .iter()
            .flat_map(|c| c.children.iter())
            .filter(|child| !known.contains(child))
            .count();
        prop_assert_eq!(result.count(ValidationCode::InvalidReference), dangling);
    }

    #[test]
    fn tree_never_repeats_on_a_path(response in response_strategy()) {
        let tree = build_component_tree(&response);
        prop_assert!(tree.is_some());
        if let Some(tree) = tree {
            prop_assert!(no_repeat_on_path(&tree, &mut Vec::new()));
        }
    }

    #[test]
    fn validator_never_panics_on_arbitrary_shapes(
        root in prop_oneof![
            Just(Value::Null),
            any::<i64>().prop_map(Value::from),
            "[a-z]{0,4}".prop_map(Value::from),
        ],
        components in prop::collection::vec(
            prop_oneof![
                Just(json!({})),
                Just(json!({"id": 1, "type": []})),
                id_strategy().prop_map(|id| json!({"id": id, "type": "text", "children": "x"})),
                id_strategy()
                    .prop_map(|id| json!({"id": id.clone(), "type": "text", "children": [1, id]})),
            ],
            0..6,
        ),
    ) {
        let raw = json!({"version": "0.8", "root": root, "components": components});
        let result = validate_response(&raw);
        prop_assert_eq!(result.valid, result.errors.is_empty());
    }
}
