//! Shared runtime plumbing: logging, configuration and retry timing.

mod backoff;
mod config;

pub use backoff::ExponentialBackoff;
pub use config::{AutoSaveConfig, ConfigError};

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// Honors `RUST_LOG`; defaults to `info`. Safe to call more than once.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
