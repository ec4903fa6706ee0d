use std::path::PathBuf;

use a2ui_core::{Condition, JsonMap};
use clap::Args;
use serde::Serialize;
use serde_json::Value;

use crate::error::{DoctorError, Result};
use crate::util::{OutputOptions, read_json, to_json};

#[derive(Debug, Clone, Args)]
pub struct EvalArgs {
    /// Condition expression, e.g. `data.flag === true`.
    pub expr: String,

    /// JSON data model, or a full response whose `data` is used.
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Fail on expressions that do not parse instead of evaluating to true.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Serialize)]
struct EvalReport<'a> {
    expr: &'a str,
    result: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn run_eval(args: &EvalArgs, opts: OutputOptions) -> Result<String> {
    let data = match &args.data {
        Some(path) => data_model(read_json(path)?)?,
        None => JsonMap::new(),
    };

    let (result, error) = match Condition::parse(&args.expr) {
        Ok(condition) => (condition.evaluate(&data), None),
        Err(error) if args.strict => return Err(error.into()),
        Err(error) => {
            tracing::warn!(expr = %args.expr, %error, "condition failed open");
            (true, Some(error.to_string()))
        }
    };

    if opts.json {
        to_json(&EvalReport {
            expr: &args.expr,
            result,
            error,
        })
    } else {
        Ok(result.to_string())
    }
}

fn data_model(raw: Value) -> Result<JsonMap> {
    match raw {
        Value::Object(mut obj) if obj.contains_key("components") => match obj.remove("data") {
            Some(Value::Object(data)) => Ok(data),
            None => Ok(JsonMap::new()),
            Some(_) => Err(DoctorError::invalid("response `data` must be an object")),
        },
        Value::Object(obj) => Ok(obj),
        _ => Err(DoctorError::invalid("data file must hold a JSON object")),
    }
}
