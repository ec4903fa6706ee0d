use clap::{Parser, Subcommand};

use crate::apply::{ApplyArgs, run_apply};
use crate::error::Result;
use crate::eval::{EvalArgs, run_eval};
use crate::render::{RenderArgs, run_render};
use crate::reply::{ReplyArgs, run_reply};
use crate::sample::{SampleArgs, run_sample};
use crate::tree::{TreeArgs, run_tree};
use crate::util::OutputOptions;
use crate::validate::{ValidateArgs, run_validate};

#[derive(Debug, Parser)]
#[command(
    name = "doctor_a2ui",
    about = "Validate, inspect, update and render A2UI payloads",
    version
)]
pub struct Cli {
    /// Emit machine-readable JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Write logs to stderr as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate a response file.
    Validate(ValidateArgs),

    /// Print the nested component tree.
    Tree(TreeArgs),

    /// Apply updates to a response and print the result.
    Apply(ApplyArgs),

    /// Evaluate a `when` condition.
    Eval(EvalArgs),

    /// Render a response as a text outline with diagnostics.
    Render(RenderArgs),

    /// Parse raw agent output into text and a normalized response.
    Reply(ReplyArgs),

    /// Print a built-in sample response.
    Sample(SampleArgs),
}

/// Run the selected command and return what it would print.
pub fn execute(cli: &Cli) -> Result<String> {
    let opts = OutputOptions { json: cli.json };
    let _span = tracing::debug_span!("doctor_a2ui", json = cli.json).entered();
    match &cli.command {
        Commands::Validate(args) => run_validate(args, opts),
        Commands::Tree(args) => run_tree(args, opts),
        Commands::Apply(args) => run_apply(args, opts),
        Commands::Eval(args) => run_eval(args, opts),
        Commands::Render(args) => run_render(args, opts),
        Commands::Reply(args) => run_reply(args, opts),
        Commands::Sample(args) => run_sample(args, opts),
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let output = execute(&cli)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
