use a2ui_core::samples;
use clap::Args;

use crate::error::{DoctorError, Result};
use crate::util::{OutputOptions, to_json};

#[derive(Debug, Clone, Args)]
pub struct SampleArgs {
    /// Sample name.
    #[arg(default_value = "dashboard")]
    pub name: String,

    /// Print the available sample names instead.
    #[arg(long)]
    pub list: bool,
}

pub fn run_sample(args: &SampleArgs, opts: OutputOptions) -> Result<String> {
    let all = samples::all();
    if args.list {
        let names: Vec<&str> = all.iter().map(|(name, _)| *name).collect();
        return if opts.json {
            to_json(&names)
        } else {
            Ok(names.join("\n"))
        };
    }
    let (_, response) = all
        .into_iter()
        .find(|(name, _)| *name == args.name)
        .ok_or_else(|| DoctorError::SampleNotFound {
            name: args.name.clone(),
        })?;
    to_json(&response)
}
