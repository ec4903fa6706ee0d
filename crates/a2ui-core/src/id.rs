//! Component identifier generation.

use std::sync::atomic::{AtomicU64, Ordering};

use web_time::{SystemTime, UNIX_EPOCH};

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A new identifier of the form `{prefix}-{millis:x}-{n}`.
///
/// Unique within the process; `n` is a monotonically increasing counter,
/// the timestamp only separates runs.
#[must_use]
pub fn generate_id(prefix: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let n = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{millis:x}-{n}")
}

/// `preferred` if no id in `taken` equals it, otherwise a generated id with
/// `preferred` as prefix.
#[must_use]
pub fn unused_id<'a>(taken: impl IntoIterator<Item = &'a str>, preferred: &str) -> String {
    if taken.into_iter().any(|id| id == preferred) {
        generate_id(preferred)
    } else {
        preferred.to_string()
    }
}
