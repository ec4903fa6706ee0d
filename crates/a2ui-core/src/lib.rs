#![forbid(unsafe_code)]

//! Core: the A2UI wire contract and the pure engine around it.
//!
//! # Role in A2UI
//! `a2ui-core` is framework-agnostic. It knows nothing about widgets; it
//! validates agent payloads, walks the component tree, applies updates and
//! evaluates bindings and conditions. Renderers (`a2ui-render` and any host
//! UI adapter) build on the functions re-exported here.
//!
//! # Primary responsibilities
//! - **protocol**: [`Response`], [`Component`], [`Update`] and helpers.
//! - **validate**: structural checks that report errors as data.
//! - **tree**: lookup, indexing and cycle-safe nested views.
//! - **update**: immutable add/remove/update/replace.
//! - **binding** / **condition**: data-path reads and writes, `when` gates.
//! - **reply**: agent reply envelopes and payload normalization.
//!
//! Everything is synchronous and side-effect free apart from `tracing`
//! events; the host serializes calls.

pub mod binding;
pub mod condition;
pub mod id;
pub mod protocol;
pub mod reply;
pub mod tree;
pub mod update;
pub mod validate;

#[cfg(any(test, feature = "test-helpers"))]
pub mod samples;

pub use binding::{resolve_binding, set_binding};
pub use condition::{Condition, ConditionError, evaluate_condition};
pub use id::{generate_id, unused_id};
pub use protocol::{
    Accessibility, Component, JsonMap, PROTOCOL_VERSION, Response, Update, UpdateOperation,
    clone_response, create_empty_response,
};
pub use reply::{AgentReply, ReplyError, normalize_payload, parse_agent_reply};
pub use tree::{
    ComponentIndex, ComponentNode, MAX_TREE_DEPTH, build_component_tree, find_component,
    get_component_ids, index_components,
};
pub use update::{apply_update, apply_updates};
pub use validate::{
    ValidationCode, ValidationError, ValidationResult, validate_component, validate_response,
    validate_update,
};
