//! Logging setup.
//!
//! The core emits structured `tracing` events and `metrics` counters; this
//! module wires up a `tracing-subscriber` for hosts that do not install
//! their own. Metrics exporter wiring is left entirely to the host.

use crate::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON lines, one event per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Default filter directive, overridden by `RUST_LOG` when set.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            filter: "relink=info".to_string(),
        }
    }
}

/// Installs the global tracing subscriber.
///
/// Honors `RUST_LOG` over the configured filter. Call at most once per
/// process; hosts with their own subscriber should skip this entirely.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter.clone()));

    let result = match config.format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init(),
    };

    result.map_err(|e| Error::OperationFailed {
        operation: "init_logging".to_string(),
        cause: e.to_string(),
    })
}
