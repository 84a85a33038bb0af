//! Logging setup
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` takes precedence over
//! the configured filter; `server.log_format = "json"` switches to one JSON
//! object per event.

use thiserror::Error;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;

/// Logging initialization errors
#[derive(Debug, Error)]
pub enum LoggingError {
    /// A global subscriber is already installed, or the filter is invalid
    #[error("Failed to initialize logging: {0}")]
    Init(String),
}

/// Build the event filter for the given configuration
pub fn env_filter(config: &ServerConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter))
}

/// Install the global subscriber
///
/// # Errors
///
/// Returns `LoggingError::Init` if a subscriber was already installed.
pub fn init_logging(config: &ServerConfig) -> Result<(), LoggingError> {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    if config.json_logs() {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()
    }
    .map_err(|e| LoggingError::Init(e.to_string()))?;

    info!(format = %config.log_format, "Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_fails() {
        let config = ServerConfig::default();
        // Another test may have installed a subscriber first
        let _ = init_logging(&config);
        assert!(matches!(init_logging(&config), Err(LoggingError::Init(_))));
    }
}
