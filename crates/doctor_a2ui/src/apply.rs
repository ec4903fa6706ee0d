use std::path::PathBuf;

use a2ui_core::{Response, Update, apply_updates, validate_update};
use clap::Args;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::util::{OutputOptions, format_validation, read_json, to_json};

#[derive(Debug, Clone, Args)]
pub struct ApplyArgs {
    /// Response JSON file.
    pub file: PathBuf,

    /// JSON file with one update object or an array of them.
    #[arg(long)]
    pub updates: PathBuf,
}

#[derive(Debug, Serialize)]
struct SkippedUpdate {
    index: usize,
    reason: String,
}

#[derive(Debug, Serialize)]
struct ApplyReport<'a> {
    response: &'a Response,
    applied: usize,
    skipped: Vec<SkippedUpdate>,
}

pub fn run_apply(args: &ApplyArgs, opts: OutputOptions) -> Result<String> {
    let response: Response = serde_json::from_value(read_json(&args.file)?)?;
    let raw_updates = match read_json(&args.updates)? {
        Value::Array(items) => items,
        single => vec![single],
    };

    let mut updates = Vec::with_capacity(raw_updates.len());
    let mut skipped = Vec::new();
    for (index, raw) in raw_updates.into_iter().enumerate() {
        let result = validate_update(&raw);
        if !result.valid {
            let reason = format_validation(&result);
            tracing::warn!(index, %reason, "update skipped");
            skipped.push(SkippedUpdate { index, reason });
            continue;
        }
        match serde_json::from_value::<Update>(raw) {
            Ok(update) => updates.push(update),
            Err(error) => {
                tracing::warn!(index, %error, "update skipped");
                skipped.push(SkippedUpdate {
                    index,
                    reason: error.to_string(),
                });
            }
        }
    }

    let next = apply_updates(&response, &updates);
    tracing::info!(applied = updates.len(), skipped = skipped.len(), "updates applied");
    if opts.json {
        to_json(&ApplyReport {
            response: &next,
            applied: updates.len(),
            skipped,
        })
    } else {
        to_json(&next)
    }
}
