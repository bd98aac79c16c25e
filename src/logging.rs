//! Tracing subscriber setup for the binaries.
//!
//! Logs go to stderr so stdout stays free for protocol output. The filter
//! comes from `RUST_LOG`, falling back to the given default.

use tracing_subscriber::EnvFilter;

/// Installs a global fmt subscriber. Later calls are no-ops.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
