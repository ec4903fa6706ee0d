//! Subscriber setup for the CLI. Library crates only emit events.

use tracing_subscriber::EnvFilter;

use crate::error::{DoctorError, Result};

/// Install a stderr `fmt` subscriber.
///
/// `RUST_LOG` wins over `level` when set. With `json`, events are written
/// as JSON lines.
pub fn init(level: &str, json: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| DoctorError::invalid(format!("log level `{level}`: {e}")))?,
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| DoctorError::Logging {
        message: e.to_string(),
    })
}
