use std::path::PathBuf;

use a2ui_core::ValidationResult;
use a2ui_render::text::{OutlineGuides, TextBlock, outline, text_renderer};
use a2ui_render::{RenderDiagnostic, RenderOutcome, RenderPolicy};
use clap::Args;
use serde::Serialize;

use crate::error::{DoctorError, Result};
use crate::util::{OutputOptions, read_json, to_json};

#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    /// Response JSON file.
    pub file: PathBuf,

    /// Render policy file (`.toml` or JSON).
    #[arg(long)]
    pub policy: Option<PathBuf>,

    /// Refuse to render payloads that fail validation.
    #[arg(long)]
    pub strict: bool,

    /// Draw guides with ASCII characters.
    #[arg(long)]
    pub ascii: bool,
}

#[derive(Debug, Serialize)]
struct RenderReport<'a> {
    outline: String,
    rendered: usize,
    hidden: &'a [String],
    diagnostics: &'a [RenderDiagnostic],
    #[serde(skip_serializing_if = "Option::is_none")]
    validation: Option<&'a ValidationResult>,
}

pub fn run_render(args: &RenderArgs, opts: OutputOptions) -> Result<String> {
    let mut policy = match &args.policy {
        Some(path) => RenderPolicy::from_file(path)?,
        None => RenderPolicy::default(),
    };
    if args.strict {
        policy.strict = true;
        policy.validate_before_render = true;
    }

    let guides = if args.ascii {
        OutlineGuides::Ascii
    } else {
        OutlineGuides::Unicode
    };
    let mut renderer = text_renderer(guides);
    renderer.set_policy(policy);

    let raw = read_json(&args.file)?;
    let outcome = renderer.render_value(&raw);
    tracing::info!(
        rendered = outcome.rendered,
        diagnostics = outcome.diagnostics.len(),
        "render finished"
    );

    let report = if opts.json {
        to_json(&RenderReport {
            outline: outline(&outcome),
            rendered: outcome.rendered,
            hidden: &outcome.hidden,
            diagnostics: &outcome.diagnostics,
            validation: outcome.validation.as_ref(),
        })?
    } else {
        text_report(&outcome)
    };

    let rejected = renderer.policy().strict
        && outcome.validation.as_ref().is_some_and(|v| !v.valid);
    if rejected {
        let errors = outcome.validation.as_ref().map_or(0, |v| v.errors.len());
        return Err(DoctorError::InvalidPayload { report, errors });
    }
    Ok(report)
}

fn text_report(outcome: &RenderOutcome<TextBlock>) -> String {
    let mut out = outline(outcome);
    if !outcome.hidden.is_empty() {
        out.push_str(&format!("\n\nhidden: {}", outcome.hidden.join(", ")));
    }
    if !outcome.diagnostics.is_empty() {
        out.push_str(if outcome.hidden.is_empty() { "\n\n" } else { "\n" });
        out.push_str(&format!("diagnostics: {}", outcome.diagnostics.len()));
        for diagnostic in &outcome.diagnostics {
            out.push_str(&format!("\n  {diagnostic}"));
        }
    }
    out.trim_start().to_string()
}
