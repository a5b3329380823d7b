//! Telemetry initialisation for the CLI.
//!
//! Structured JSON logs go to stderr so that stdout carries only command
//! output and can be piped.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialise the tracing subscriber at the configured log level.
///
/// `RUST_LOG`, when set, takes precedence over `log_level`.
///
/// # Errors
///
/// Returns an error if the subscriber has already been set.
pub fn init(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .json()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise tracing subscriber: {e}"))
}
