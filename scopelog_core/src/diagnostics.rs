//! Internal diagnostics for scopelog itself.
//!
//! Rotation events, pruned backups and swallowed write failures are
//! reported through `tracing`, separately from the structured records the
//! crate emits for its callers. Nothing is printed unless the host
//! application installs a subscriber, for example with [`init`].

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize diagnostics output with the default `warn` level
///
/// Can be overridden with the RUST_LOG env var.
pub fn init() {
    init_with_level("scopelog_core=warn")
}

/// Initialize diagnostics output with a specific default filter
///
/// # Arguments
/// * `default_level` - Default filter directive (e.g. `scopelog_core=debug`)
///
/// Diagnostics go to stderr so they never mix with records routed to
/// standard output. Calling this after another subscriber was installed
/// is a no-op.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}

/// Initialize diagnostics for testing (captures output per test)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("scopelog_core=debug"))
        .try_init();
}
