#![forbid(unsafe_code)]

//! Policy-as-data configuration for the renderer walk.
//!
//! # Loading
//!
//! ```toml
//! # a2ui-render.toml
//! max_depth = 32
//! strict = true
//! ```
//!
//! ```rust,ignore
//! let policy = RenderPolicy::from_toml_file("a2ui-render.toml")?;
//! let policy = RenderPolicy::from_json_str(json)?;
//! ```
//!
//! Every field has a default, so a partial file only overrides what it
//! names and `RenderPolicy::default()` is the lenient behavior hosts expect.

#[cfg(feature = "policy-config")]
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest accepted `max_depth`.
pub const MAX_DEPTH_LIMIT: usize = 4096;

/// Tunables of a [`Renderer`](crate::render::Renderer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderPolicy {
    /// Nodes at this depth or deeper are skipped (root is depth 0).
    pub max_depth: usize,
    /// Run the structural validator in `render_value`.
    pub validate_before_render: bool,
    /// With validation on, refuse to render an invalid payload.
    pub strict: bool,
    /// Overlay bound data values on props.
    pub resolve_bindings: bool,
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self {
            max_depth: 64,
            validate_before_render: true,
            strict: false,
            resolve_bindings: true,
        }
    }
}

impl RenderPolicy {
    /// Load from a TOML string.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, PolicyConfigError> {
        let policy: Self = toml::from_str(s)?;
        policy.checked()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, PolicyConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "policy-config")]
    pub fn from_json_str(s: &str) -> Result<Self, PolicyConfigError> {
        let policy: Self = serde_json::from_str(s)?;
        policy.checked()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PolicyConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Load from a file, picking the format by extension (`.toml`,
    /// anything else is JSON).
    #[cfg(feature = "policy-config")]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PolicyConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            _ => Self::from_json_file(path),
        }
    }

    /// Range problems; empty when the policy is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.max_depth == 0 {
            errors.push("max_depth must be > 0".into());
        }
        if self.max_depth > MAX_DEPTH_LIMIT {
            errors.push(format!(
                "max_depth must be <= {MAX_DEPTH_LIMIT}, got {}",
                self.max_depth
            ));
        }
        if self.strict && !self.validate_before_render {
            errors.push("strict requires validate_before_render".into());
        }
        errors
    }

    fn checked(self) -> Result<Self, PolicyConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(PolicyConfigError::Validation(errors))
        }
    }
}

/// Errors that can occur when loading a render policy.
#[derive(Debug, Error)]
pub enum PolicyConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "policy-config")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
