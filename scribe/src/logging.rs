//! Tracing setup for the `scribe` binary.
//!
//! Progress and diagnostics go to stderr so stdout stays free for command
//! output (`scribe split --json`).

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`; defaults to `default_directive` when unset or invalid.
///
/// # Example
/// ```bash
/// RUST_LOG=scribe=debug scribe write --outline outline.md
/// ```
pub fn init(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
