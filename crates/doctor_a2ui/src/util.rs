use std::fs;
use std::path::Path;

use a2ui_core::ValidationResult;
use serde::Serialize;
use serde_json::Value;

use crate::error::{DoctorError, Result};

/// Output switches shared by every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
}

pub fn read_text(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(DoctorError::MissingPath {
            path: path.to_path_buf(),
        });
    }
    Ok(fs::read_to_string(path)?)
}

pub fn read_json(path: &Path) -> Result<Value> {
    let text = read_text(path)?;
    Ok(serde_json::from_str(&text)?)
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Human-readable validation summary.
#[must_use]
pub fn format_validation(result: &ValidationResult) -> String {
    if result.valid {
        return "valid".to_string();
    }
    let mut out = format!("invalid: {} error(s)", result.errors.len());
    for error in &result.errors {
        out.push_str("\n  ");
        out.push_str(&error.to_string());
    }
    out
}

/// Validation as text or JSON; invalid results become an exit-2 error.
pub fn validation_report(result: &ValidationResult, opts: OutputOptions) -> Result<String> {
    let report = if opts.json {
        to_json(result)?
    } else {
        format_validation(result)
    };
    if result.valid {
        Ok(report)
    } else {
        Err(DoctorError::InvalidPayload {
            report,
            errors: result.errors.len(),
        })
    }
}
