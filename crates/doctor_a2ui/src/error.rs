use std::path::PathBuf;

use a2ui_core::ConditionError;
use a2ui_render::PolicyConfigError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DoctorError>;

/// Exit code for payloads that fail validation.
pub const EXIT_INVALID: i32 = 2;

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("render policy error: {0}")]
    Policy(#[from] PolicyConfigError),

    #[error("condition error: {0}")]
    Condition(#[from] ConditionError),

    #[error("required path does not exist: {path}")]
    MissingPath { path: PathBuf },

    #[error("sample not found: {name}")]
    SampleNotFound { name: String },

    #[error("component not found: {id}")]
    ComponentNotFound { id: String },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("logging setup failed: {message}")]
    Logging { message: String },

    #[error("{report}")]
    InvalidPayload { report: String, errors: usize },
}

impl DoctorError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidPayload { .. } => EXIT_INVALID,
            _ => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
