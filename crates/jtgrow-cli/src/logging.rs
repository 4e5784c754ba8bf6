//! Tracing subscriber setup

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::LogFormat;

/// Install a global subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence over `default_level`.
pub fn init(default_level: &str, format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("Invalid log filter '{}': {}", default_level, e))?;

    match format {
        LogFormat::Compact => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .compact();
            tracing_subscriber::registry()
                .with(env_filter)
                .with(layer)
                .try_init()
                .map_err(|e| anyhow!("Failed to initialize tracing: {}", e))
        }
        LogFormat::Json => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .json();
            tracing_subscriber::registry()
                .with(env_filter)
                .with(layer)
                .try_init()
                .map_err(|e| anyhow!("Failed to initialize tracing: {}", e))
        }
    }
}
