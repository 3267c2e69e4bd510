//! Tracing/logging initialization shared by binaries and test harnesses.

use tracing_subscriber::EnvFilter;

/// Initialize process-wide tracing.
///
/// JSON lines with timestamps, filtered via `RUST_LOG` (default `info`).
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    init_with_default_filter("info");
}

/// Like `init`, with an explicit fallback filter for when `RUST_LOG` is
/// unset (e.g. `"reportrun_jobs=debug"` while debugging a polling loop).
pub fn init_with_default_filter(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
