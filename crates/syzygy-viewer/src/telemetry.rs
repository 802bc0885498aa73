//! Tracing initialization for embedding binaries.

use eyre::Result;
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber, honoring `RUST_LOG`.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|err| eyre::eyre!("Failed to initialize tracing subscriber: {err}"))
}
