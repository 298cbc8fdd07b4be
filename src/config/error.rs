//! Errors raised while resolving `serial-session.toml`.
//!
//! Keys and variables are reported the way a user writes them: `serial.default_baud`
//! for a file value, `SERIAL_SESSION_SERIAL_DEFAULT_BAUD` for an override.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The resolved file exists but could not be read.
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or a `[serial]`/`[logging]` value has the wrong type.
    #[error("malformed config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but cannot drive a serial line or the logger.
    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },

    /// A `SERIAL_SESSION_*` override could not be parsed.
    #[error("invalid override {var}: {message}")]
    Env { var: String, message: String },
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn env(var: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Env {
            var: var.into(),
            message: message.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
