use std::path::PathBuf;

use a2ui_core::{ReplyError, Response, parse_agent_reply};
use clap::Args;
use serde::Serialize;

use crate::error::{DoctorError, Result};
use crate::util::{OutputOptions, format_validation, read_text, to_json};

#[derive(Debug, Clone, Args)]
pub struct ReplyArgs {
    /// File holding raw model output.
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct ReplyReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<&'a Response>,
}

pub fn run_reply(args: &ReplyArgs, opts: OutputOptions) -> Result<String> {
    let content = read_text(&args.file)?;
    let reply = parse_agent_reply(&content);
    let response = match reply.response() {
        Ok(response) => Some(response),
        Err(ReplyError::NoPayload) => None,
        Err(ReplyError::Invalid(result)) => {
            let report = if opts.json {
                to_json(&result)?
            } else {
                format_validation(&result)
            };
            return Err(DoctorError::InvalidPayload {
                report,
                errors: result.errors.len(),
            });
        }
        Err(ReplyError::Json(error)) => return Err(error.into()),
    };
    tracing::info!(
        has_text = reply.text.is_some(),
        has_payload = response.is_some(),
        "reply parsed"
    );

    if opts.json {
        return to_json(&ReplyReport {
            text: reply.text.as_deref(),
            response: response.as_ref(),
        });
    }
    let mut out = String::new();
    if let Some(text) = &reply.text {
        out.push_str(text);
    }
    if let Some(response) = &response {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(&to_json(response)?);
    }
    Ok(out)
}
