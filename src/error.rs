//! Errors returned by [`Session`](crate::Session) and the registry functions.

use crate::gateway::GatewayError;
use thiserror::Error;

/// Unified session error type.
///
/// Gateway failures are wrapped transparently so callers see the gateway's
/// own message and can match on the inner [`GatewayError`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// Missing or unusable configuration, e.g. empty path or zero baud rate.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Operation requires an open serial port, but the port is closed.")]
    NotOpen,

    /// A write payload that is not a byte sequence.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The event channel could not be established or torn down.
    #[error("Event subscription failed: {0}")]
    Subscription(String),
}

impl SessionError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// The underlying gateway error, if this failure came from the gateway.
    pub fn as_gateway(&self) -> Option<&GatewayError> {
        match self {
            Self::Gateway(e) => Some(e),
            _ => None,
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
