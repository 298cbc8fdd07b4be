//! Errors reported by a transport gateway.

use crate::port::PortError;
use thiserror::Error;

/// Failures of the transport gateway and its port registry.
///
/// Sessions pass these through to callers unchanged.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Port {0} is already opened")]
    AlreadyOpen(String),

    #[error("Port {0} is not opened")]
    NotOpen(String),

    #[error("Failed to open port {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: PortError,
    },

    #[error("I/O on port {path} failed: {source}")]
    Io {
        path: String,
        #[source]
        source: PortError,
    },

    #[error("Failed to enumerate serial ports: {0}")]
    Enumeration(#[source] PortError),

    /// The background reader or a blocking task could not be started or joined.
    #[error("Read worker for {path} failed: {message}")]
    Worker { path: String, message: String },

    #[error("Notification channel {0} is unavailable")]
    ChannelUnavailable(String),
}

impl GatewayError {
    pub fn worker(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Worker {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
