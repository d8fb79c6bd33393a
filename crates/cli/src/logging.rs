//! Tracing subscriber setup. Logs always go to stderr so stdout stays
//! machine-readable.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::{LogFormat, LoggingConfig};

/// Environment variable that overrides the configured level filter.
pub(crate) const LOG_ENV: &str = "WILLSUITE_LOG";

pub(crate) fn init(config: &LoggingConfig) -> Result<(), String> {
    let filter = match std::env::var(LOG_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .map_err(|e| format!("invalid {} filter '{}': {}", LOG_ENV, directives, e))?,
        _ => EnvFilter::try_new(&config.level)
            .map_err(|e| format!("invalid log level '{}': {}", config.level, e))?,
    };

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_filter(filter),
            )
            .try_init(),
        LogFormat::Plain => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_filter(filter),
            )
            .try_init(),
    };
    result.map_err(|e| format!("could not initialise logging: {}", e))
}
