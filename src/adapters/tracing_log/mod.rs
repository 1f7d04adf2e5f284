// Tracing log adapter - Subscriber setup for text or JSON output

use tracing_subscriber::EnvFilter;

use crate::domain::errors::*;
use crate::ports::{LogFormat, LogLevel};

/// Build the filter: `RUST_LOG` wins when set, otherwise `level` applies
/// to this crate and warnings to everything else
pub fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,mkvstrip={}", level.as_str())))
}

/// Install the global subscriber. Logs go to stderr so that rendered
/// plans on stdout stay machine readable.
pub fn init(level: LogLevel, format: LogFormat) -> Result<(), DomainError> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| DomainError::ConfigError(format!("Failed to initialize logging: {}", e)))
}
