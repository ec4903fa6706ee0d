//! Structural validation of raw A2UI payloads.
//!
//! Validation runs on untyped [`serde_json::Value`]s so it can describe
//! payloads that would not even deserialize. It accumulates every problem
//! instead of stopping at the first one, and it never fails: errors are
//! data, and the caller decides whether to block rendering or proceed.
//!
//! # Checks
//!
//! 1. **Shape**: `version`, `root` are strings, `components` is an array,
//!    `data` (when present) is an object.
//! 2. **Components**: `id` and `type` are strings; `children`, `props`,
//!    `events`, `bindings`, `when` have the right JSON types.
//! 3. **Uniqueness**: every extra occurrence of an id is a `DUPLICATE_ID`.
//! 4. **References**: `root` and each `children` entry resolve.
//! 5. **Ownership**: a child listed by two parents is `MULTIPLE_PARENTS`;
//!    an edge that closes a loop is `CYCLIC_REFERENCE`.
//!
//! Paths use `components[2].children[0]` notation relative to the payload.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::protocol::UpdateOperation;

/// Machine-readable category of a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    MissingField,
    InvalidType,
    DuplicateId,
    InvalidReference,
    CyclicReference,
    MultipleParents,
    InvalidOperation,
    EmptyTarget,
}

impl ValidationCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "MISSING_FIELD",
            Self::InvalidType => "INVALID_TYPE",
            Self::DuplicateId => "DUPLICATE_ID",
            Self::InvalidReference => "INVALID_REFERENCE",
            Self::CyclicReference => "CYCLIC_REFERENCE",
            Self::MultipleParents => "MULTIPLE_PARENTS",
            Self::InvalidOperation => "INVALID_OPERATION",
            Self::EmptyTarget => "EMPTY_TARGET",
        }
    }
}

impl std::fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One problem found in a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Locator into the original payload, e.g. `components[1].children[0]`.
    pub path: String,
    pub message: String,
    pub code: ValidationCode,
}

impl ValidationError {
    fn new(path: impl Into<String>, code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            code,
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "[{}] {}", self.code, self.message)
        } else {
            write!(f, "[{}] {}: {}", self.code, self.path, self.message)
        }
    }
}

/// Outcome of validating a payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    #[must_use]
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Number of errors carrying `code`.
    #[must_use]
    pub fn count(&self, code: ValidationCode) -> usize {
        self.errors.iter().filter(|e| e.code == code).count()
    }
}

// ── Path helpers ─────────────────────────────────────────────────────────

fn field_path(base: &str, field: &str) -> String {
    if base.is_empty() {
        field.to_string()
    } else {
        format!("{base}.{field}")
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn require_string(
    obj: &Map<String, Value>,
    base: &str,
    field: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<String> {
    let path = field_path(base, field);
    match obj.get(field) {
        None => {
            errors.push(ValidationError::new(
                path,
                ValidationCode::MissingField,
                format!("`{field}` is required"),
            ));
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            errors.push(ValidationError::new(
                path,
                ValidationCode::InvalidType,
                format!("`{field}` must be a string, got {}", json_kind(other)),
            ));
            None
        }
    }
}

fn expect_object_if_present(
    obj: &Map<String, Value>,
    base: &str,
    field: &str,
    errors: &mut Vec<ValidationError>,
) {
    if let Some(value) = obj.get(field)
        && !value.is_object()
    {
        errors.push(ValidationError::new(
            field_path(base, field),
            ValidationCode::InvalidType,
            format!("`{field}` must be an object, got {}", json_kind(value)),
        ));
    }
}

// ── Component ────────────────────────────────────────────────────────────

/// Validate one component object found at `path`.
#[must_use]
pub fn validate_component(raw: &Value, path: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let Some(obj) = raw.as_object() else {
        errors.push(ValidationError::new(
            path,
            ValidationCode::InvalidType,
            format!("component must be an object, got {}", json_kind(raw)),
        ));
        return errors;
    };

    require_string(obj, path, "id", &mut errors);
    require_string(obj, path, "type", &mut errors);

    match obj.get("children") {
        None => {}
        Some(Value::Array(children)) => {
            for (j, child) in children.iter().enumerate() {
                if !child.is_string() {
                    errors.push(ValidationError::new(
                        format!("{}[{j}]", field_path(path, "children")),
                        ValidationCode::InvalidType,
                        format!("child reference must be a string id, got {}", json_kind(child)),
                    ));
                }
            }
        }
        Some(other) => errors.push(ValidationError::new(
            field_path(path, "children"),
            ValidationCode::InvalidType,
            format!("`children` must be an array, got {}", json_kind(other)),
        )),
    }

    expect_object_if_present(obj, path, "props", &mut errors);
    expect_object_if_present(obj, path, "events", &mut errors);

    match obj.get("bindings") {
        None => {}
        Some(Value::Object(bindings)) => {
            let base = field_path(path, "bindings");
            for (prop, target) in bindings {
                if !target.is_string() {
                    errors.push(ValidationError::new(
                        field_path(&base, prop),
                        ValidationCode::InvalidType,
                        format!("binding path must be a string, got {}", json_kind(target)),
                    ));
                }
            }
        }
        Some(other) => errors.push(ValidationError::new(
            field_path(path, "bindings"),
            ValidationCode::InvalidType,
            format!("`bindings` must be an object, got {}", json_kind(other)),
        )),
    }

    match obj.get("when") {
        None | Some(Value::Null) | Some(Value::String(_)) => {}
        Some(other) => errors.push(ValidationError::new(
            field_path(path, "when"),
            ValidationCode::InvalidType,
            format!("`when` must be a string, got {}", json_kind(other)),
        )),
    }

    if let Some(a11y) = obj.get("accessibility")
        && !a11y.is_null()
        && !a11y.is_object()
    {
        errors.push(ValidationError::new(
            field_path(path, "accessibility"),
            ValidationCode::InvalidType,
            format!("`accessibility` must be an object, got {}", json_kind(a11y)),
        ));
    }

    errors
}

// ── Response ─────────────────────────────────────────────────────────────

/// Validate a full response payload.
#[must_use]
pub fn validate_response(raw: &Value) -> ValidationResult {
    let mut errors = Vec::new();
    let Some(obj) = raw.as_object() else {
        errors.push(ValidationError::new(
            "",
            ValidationCode::InvalidType,
            format!("response must be an object, got {}", json_kind(raw)),
        ));
        return ValidationResult::from_errors(errors);
    };

    require_string(obj, "", "version", &mut errors);
    let root = require_string(obj, "", "root", &mut errors);
    expect_object_if_present(obj, "", "data", &mut errors);

    let components = match obj.get("components") {
        None => {
            errors.push(ValidationError::new(
                "components",
                ValidationCode::MissingField,
                "`components` is required",
            ));
            None
        }
        Some(Value::Array(items)) => Some(items.as_slice()),
        Some(other) => {
            errors.push(ValidationError::new(
                "components",
                ValidationCode::InvalidType,
                format!("`components` must be an array, got {}", json_kind(other)),
            ));
            None
        }
    };

    if let Some(items) = components {
        for (i, item) in items.iter().enumerate() {
            errors.extend(validate_component(item, &format!("components[{i}]")));
        }
        let graph = ReferenceGraph::new(items);
        graph.check_duplicates(&mut errors);
        if let Some(root) = root.as_deref()
            && !graph.first_index.contains_key(root)
        {
            errors.push(ValidationError::new(
                "root",
                ValidationCode::InvalidReference,
                format!("root `{root}` does not match any component id"),
            ));
        }
        graph.check_children(&mut errors);
        graph.check_cycles(&mut errors);
    }

    tracing::debug!(
        target: "a2ui.validate",
        errors = errors.len(),
        "response validated"
    );
    ValidationResult::from_errors(errors)
}

/// Validate an update instruction.
#[must_use]
pub fn validate_update(raw: &Value) -> ValidationResult {
    let mut errors = Vec::new();
    let Some(obj) = raw.as_object() else {
        errors.push(ValidationError::new(
            "",
            ValidationCode::InvalidType,
            format!("update must be an object, got {}", json_kind(raw)),
        ));
        return ValidationResult::from_errors(errors);
    };

    let operation = match obj.get("operation") {
        None => {
            errors.push(ValidationError::new(
                "operation",
                ValidationCode::MissingField,
                "`operation` is required",
            ));
            None
        }
        Some(Value::String(name)) => {
            let parsed = UpdateOperation::parse(name);
            if parsed.is_none() {
                errors.push(ValidationError::new(
                    "operation",
                    ValidationCode::InvalidOperation,
                    format!("unknown operation `{name}`; expected add, remove, update or replace"),
                ));
            }
            parsed
        }
        Some(other) => {
            errors.push(ValidationError::new(
                "operation",
                ValidationCode::InvalidType,
                format!("`operation` must be a string, got {}", json_kind(other)),
            ));
            None
        }
    };

    if let Some(target) = require_string(obj, "", "targetId", &mut errors)
        && target.is_empty()
    {
        errors.push(ValidationError::new(
            "targetId",
            ValidationCode::EmptyTarget,
            "`targetId` must not be empty",
        ));
    }

    match obj.get("component") {
        None => {}
        Some(component @ Value::Object(_)) => {
            if operation == Some(UpdateOperation::Add) {
                errors.extend(validate_component(component, "component"));
            }
        }
        Some(other) => errors.push(ValidationError::new(
            "component",
            ValidationCode::InvalidType,
            format!("`component` must be an object, got {}", json_kind(other)),
        )),
    }
    expect_object_if_present(obj, "", "data", &mut errors);

    ValidationResult::from_errors(errors)
}

// ── Reference graph ──────────────────────────────────────────────────────

/// Id and child references extracted from the raw component list.
/// Entries that failed shape checks are simply absent.
struct ReferenceGraph<'a> {
    ids: Vec<Option<&'a str>>,
    first_index: AHashMap<&'a str, usize>,
    /// Per component: `(position in children, child id)`.
    children: Vec<Vec<(usize, &'a str)>>,
}

impl<'a> ReferenceGraph<'a> {
    fn new(items: &'a [Value]) -> Self {
        let mut ids = Vec::with_capacity(items.len());
        let mut first_index = AHashMap::with_capacity(items.len());
        let mut children = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let id = item.get("id").and_then(Value::as_str);
            if let Some(id) = id {
                first_index.entry(id).or_insert(i);
            }
            ids.push(id);
            let refs = item
                .get("children")
                .and_then(Value::as_array)
                .map(|list| {
                    list.iter()
                        .enumerate()
                        .filter_map(|(j, c)| c.as_str().map(|c| (j, c)))
                        .collect()
                })
                .unwrap_or_default();
            children.push(refs);
        }
        Self {
            ids,
            first_index,
            children,
        }
    }

    fn check_duplicates(&self, errors: &mut Vec<ValidationError>) {
        for (i, id) in self.ids.iter().enumerate() {
            if let Some(id) = id
                && self.first_index.get(id) != Some(&i)
            {
                errors.push(ValidationError::new(
                    format!("components[{i}].id"),
                    ValidationCode::DuplicateId,
                    format!("duplicate component id `{id}`"),
                ));
            }
        }
    }

    fn check_children(&self, errors: &mut Vec<ValidationError>) {
        let mut parent_of: AHashMap<&str, usize> = AHashMap::new();
        for (i, refs) in self.children.iter().enumerate() {
            for &(j, child) in refs {
                let path = format!("components[{i}].children[{j}]");
                if !self.first_index.contains_key(child) {
                    errors.push(ValidationError::new(
                        path,
                        ValidationCode::InvalidReference,
                        format!("child `{child}` does not match any component id"),
                    ));
                    continue;
                }
                let parent = *parent_of.entry(child).or_insert(i);
                if parent != i {
                    let first_parent = self.ids[parent].unwrap_or("?");
                    errors.push(ValidationError::new(
                        path,
                        ValidationCode::MultipleParents,
                        format!("child `{child}` is already owned by `{first_parent}`"),
                    ));
                }
            }
        }
    }

    /// Iterative three-colour DFS; every back edge is one error.
    fn check_cycles(&self, errors: &mut Vec<ValidationError>) {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Unseen,
            OnStack,
            Done,
        }

        let mut marks = vec![Mark::Unseen; self.ids.len()];
        let mut stack: Vec<(usize, usize)> = Vec::new();
        for start in 0..self.ids.len() {
            if marks[start] != Mark::Unseen {
                continue;
            }
            marks[start] = Mark::OnStack;
            stack.push((start, 0));
            while let Some(top) = stack.last_mut() {
                let (node, cursor) = *top;
                let Some(&(j, child)) = self.children[node].get(cursor) else {
                    marks[node] = Mark::Done;
                    stack.pop();
                    continue;
                };
                top.1 += 1;
                let Some(&target) = self.first_index.get(child) else {
                    continue;
                };
                match marks[target] {
                    Mark::Unseen => {
                        marks[target] = Mark::OnStack;
                        stack.push((target, 0));
                    }
                    Mark::OnStack => errors.push(ValidationError::new(
                        format!("components[{node}].children[{j}]"),
                        ValidationCode::CyclicReference,
                        format!("child `{child}` closes a cycle"),
                    )),
                    Mark::Done => {}
                }
            }
        }
    }
}
