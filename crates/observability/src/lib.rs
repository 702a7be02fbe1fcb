//! `gatehouse-observability` — process-wide tracing/logging setup.

use tracing_subscriber::EnvFilter;

/// Default filter: quiet dependencies, chatty gatehouse crates. The
/// journal replay summary and registry lifecycle events are debug-level.
const DEFAULT_FILTER: &str = "info,gatehouse_auth=debug,gatehouse_store=debug";

/// Initialize tracing/logging for the process.
///
/// JSON lines on stdout, filterable via `RUST_LOG`. Safe to call multiple
/// times (subsequent calls are no-ops).
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
