//! Lookup and nested views over the flat component list.
//!
//! Unlike the validator these helpers are lenient: a child id that does
//! not resolve is skipped, and a child that would re-enter its own
//! ancestry is pruned so cyclic input still produces a finite tree.
//! Descendants deeper than [`MAX_TREE_DEPTH`] are pruned as well.
//!
//! # Example
//!
//! ```
//! use a2ui_core::protocol::{Component, create_empty_response};
//! use a2ui_core::tree::build_component_tree;
//!
//! let mut response = create_empty_response();
//! response.components[0].children.push("title".into());
//! response.components.push(Component::new("title", "text"));
//!
//! let tree = build_component_tree(&response).unwrap();
//! assert_eq!(tree.component.id, "root");
//! assert_eq!(tree.child_nodes[0].component.id, "title");
//! ```

use ahash::AHashMap;
use serde::Serialize;

use crate::protocol::{Component, Response};

/// Nesting limit for [`build_component_tree`]; the root sits at depth 0.
pub const MAX_TREE_DEPTH: usize = 256;

/// Identifier → component, first declaration wins.
pub type ComponentIndex<'a> = AHashMap<&'a str, &'a Component>;

/// A component with its children resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentNode<'a> {
    #[serde(flatten)]
    pub component: &'a Component,
    #[serde(rename = "childNodes")]
    pub child_nodes: Vec<ComponentNode<'a>>,
}

impl ComponentNode<'_> {
    /// Total number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn size(&self) -> usize {
        1 + self.child_nodes.iter().map(ComponentNode::size).sum::<usize>()
    }

    /// Height of the subtree; a leaf has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self
            .child_nodes
            .iter()
            .map(ComponentNode::depth)
            .max()
            .unwrap_or(0)
    }
}

/// First component whose id equals `id`.
#[must_use]
pub fn find_component<'a>(response: &'a Response, id: &str) -> Option<&'a Component> {
    response.components.iter().find(|c| c.id == id)
}

/// Index every component by id.
#[must_use]
pub fn index_components(response: &Response) -> ComponentIndex<'_> {
    let mut index = ComponentIndex::with_capacity(response.components.len());
    for component in &response.components {
        index.entry(component.id.as_str()).or_insert(component);
    }
    index
}

/// All declared ids in declaration order, duplicates included.
#[must_use]
pub fn get_component_ids(response: &Response) -> Vec<&str> {
    response.components.iter().map(|c| c.id.as_str()).collect()
}

/// Resolve `root` and its descendants into a nested tree.
///
/// Returns `None` when `root` does not name a component. Children of a
/// node at depth `MAX_TREE_DEPTH - 1` are dropped with a warning.
#[must_use]
pub fn build_component_tree(response: &Response) -> Option<ComponentNode<'_>> {
    let index = index_components(response);
    let root = *index.get(response.root.as_str())?;
    let mut ancestry = Vec::new();
    Some(build_node(root, &index, &mut ancestry))
}

fn build_node<'a>(
    component: &'a Component,
    index: &ComponentIndex<'a>,
    ancestry: &mut Vec<&'a str>,
) -> ComponentNode<'a> {
    if ancestry.len() + 1 >= MAX_TREE_DEPTH && !component.children.is_empty() {
        tracing::warn!(
            target: "a2ui.tree",
            component_id = %component.id,
            limit = MAX_TREE_DEPTH,
            "pruned children beyond depth limit"
        );
        return ComponentNode {
            component,
            child_nodes: Vec::new(),
        };
    }

    ancestry.push(component.id.as_str());
    let mut child_nodes = Vec::with_capacity(component.children.len());
    for child_id in &component.children {
        let Some(&child) = index.get(child_id.as_str()) else {
            continue;
        };
        if ancestry.contains(&child.id.as_str()) {
            tracing::warn!(
                target: "a2ui.tree",
                parent = %component.id,
                child = %child_id,
                "pruned cyclic child reference"
            );
            continue;
        }
        child_nodes.push(build_node(child, index, ancestry));
    }
    ancestry.pop();
    ComponentNode {
        component,
        child_nodes,
    }
}
