//! Subscriber setup for binaries and demos. The library itself only emits
//! `tracing` events.

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Filter directive used when `RUST_LOG` is not set.
pub fn filter_directive(config: &LoggingConfig, verbose: bool) -> String {
    if verbose {
        "debug".to_string()
    } else if config.level.trim().is_empty() {
        "info".to_string()
    } else {
        config.level.clone()
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays free for
/// port data.
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> Result<(), InitError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(filter_directive(config, verbose))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        let mut config = LoggingConfig::default();
        assert_eq!(filter_directive(&config, false), "info");
        assert_eq!(filter_directive(&config, true), "debug");

        config.level = "serial_session=trace".into();
        assert_eq!(filter_directive(&config, false), "serial_session=trace");

        config.level = " ".into();
        assert_eq!(filter_directive(&config, false), "info");
    }

    #[test]
    fn test_invalid_directive_is_an_error() {
        assert!(EnvFilter::try_new("serial_session=loud").is_err());
    }
}
