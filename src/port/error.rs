//! Adapter-level error types.
//!
//! These describe failures of a single device handle. Registry-level failures
//! (path already open, path not open) live in `gateway::GatewayError`.

use std::io;
use thiserror::Error;

/// Errors raised by a `SerialPortAdapter`.
#[derive(Debug, Error)]
pub enum PortError {
    /// The specified serial port was not found on the system.
    #[error("Serial port not found: {0}")]
    NotFound(String),

    /// An I/O error occurred on the device handle.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The driver rejected the requested line parameters.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A serialport-specific error occurred.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl PortError {
    pub fn not_found(port_name: impl Into<String>) -> Self {
        Self::NotFound(port_name.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// True when the failure only means "no data arrived in time".
    ///
    /// Reader loops treat these as an empty read rather than a fault.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }
}
