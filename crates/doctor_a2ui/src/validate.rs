use std::path::PathBuf;

use a2ui_core::{normalize_payload, validate_response};
use clap::Args;

use crate::error::Result;
use crate::util::{OutputOptions, read_json, validation_report};

#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Response JSON file.
    pub file: PathBuf,

    /// Normalize agent-style payloads (inline children, no root) first.
    #[arg(long)]
    pub normalize: bool,
}

pub fn run_validate(args: &ValidateArgs, opts: OutputOptions) -> Result<String> {
    let mut raw = read_json(&args.file)?;
    if args.normalize {
        raw = normalize_payload(&raw);
    }
    let result = validate_response(&raw);
    tracing::info!(
        file = %args.file.display(),
        valid = result.valid,
        errors = result.errors.len(),
        "validated"
    );
    validation_report(&result, opts)
}
