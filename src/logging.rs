//! Tracing subscriber setup driven by [`LoggingConfig`]

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Builds the filter: `RUST_LOG` wins, otherwise the configured level for
/// this crate and `warn` for everything else.
fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,daybrief={}", config.level)))
}

/// Installs the global subscriber. Call once from the binary.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter(config));

    let installed = match config.format.as_str() {
        "json" => builder.json().with_current_span(true).try_init(),
        _ => builder.pretty().try_init(),
    };

    installed.map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))
}
