//! Configuration schema definitions.
//!
//! All sections default, so an empty file (or no file) is a valid
//! configuration.

use super::error::{ConfigError, ConfigResult};
use crate::encoding::TextEncoding;
use crate::port::{DataBits, FlowControl, Parity, StopBits, DEFAULT_TIMEOUT_MS};
use crate::session::{SessionOptions, DEFAULT_READ_SIZE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub serial: SerialConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Reject values no session could be opened with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.serial.default_baud == 0 {
            return Err(ConfigError::invalid(
                "serial.default_baud",
                "baud rate must be nonzero",
            ));
        }
        if self.serial.default_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "serial.default_timeout_ms",
                "timeout must be nonzero",
            ));
        }
        if self.serial.default_read_size == 0 {
            return Err(ConfigError::invalid(
                "serial.default_read_size",
                "read size must be nonzero",
            ));
        }
        if !(5..=8).contains(&self.serial.data_bits) {
            return Err(ConfigError::invalid(
                "serial.data_bits",
                format!("expected 5-8, got {}", self.serial.data_bits),
            ));
        }
        if !matches!(self.serial.stop_bits, 1 | 2) {
            return Err(ConfigError::invalid(
                "serial.stop_bits",
                format!("expected 1 or 2, got {}", self.serial.stop_bits),
            ));
        }
        Ok(())
    }

    /// Session options for `port` (alias or real path), filling every field
    /// the caller does not give from the `[serial]` section.
    pub fn session_options(&self, port: &str, baud_rate: Option<u32>) -> SessionOptions {
        let serial = &self.serial;
        SessionOptions::new(
            serial.resolve_port(port),
            baud_rate.unwrap_or(serial.default_baud),
        )
        .data_bits(DataBits::from_bits(serial.data_bits))
        .stop_bits(StopBits::from_bits(serial.stop_bits))
        .parity(serial.parity.parse().unwrap_or_default())
        .flow_control(serial.flow_control.parse().unwrap_or_default())
        .timeout(serial.default_timeout())
        .read_size(serial.default_read_size)
        .encoding(serial.encoding)
    }
}

/// Serial port configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Baud rate when none is given on the command line
    pub default_baud: u32,
    pub default_timeout_ms: u64,
    pub default_read_size: usize,
    /// "utf-8", "ascii", "latin1", "utf-16le" or "utf-16be"
    pub encoding: TextEncoding,
    pub data_bits: u8,
    pub stop_bits: u8,
    /// "none", "odd" or "even"; anything else means none
    pub parity: String,
    /// "none", "software" or "hardware"; anything else means none
    pub flow_control: String,
    /// Port aliases for convenience
    #[serde(default)]
    pub port_aliases: HashMap<String, String>,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            default_baud: 9600,
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            default_read_size: DEFAULT_READ_SIZE,
            encoding: TextEncoding::default(),
            data_bits: DataBits::default().bits(),
            stop_bits: StopBits::default().bits(),
            parity: "none".to_string(),
            flow_control: "none".to_string(),
            port_aliases: HashMap::new(),
        }
    }
}

impl SerialConfig {
    /// Get the default timeout as Duration
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Resolve a port name through aliases
    pub fn resolve_port(&self, name: &str) -> String {
        self.port_aliases
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "serial_session=debug"
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON lines
    Json,
    /// Multi-line with colors
    #[default]
    Pretty,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}
