#![forbid(unsafe_code)]

//! `doctor_a2ui`: a diagnostics CLI over the A2UI engine.
//!
//! Every command reads JSON files and prints a report; nothing is
//! persisted. Invalid payloads exit with code 2, other failures with 1.

pub mod apply;
pub mod cli;
pub mod error;
pub mod eval;
pub mod logging;
pub mod render;
pub mod reply;
pub mod sample;
pub mod tree;
pub mod util;
pub mod validate;

pub use cli::{Cli, Commands, execute, run};
pub use error::{DoctorError, Result};
