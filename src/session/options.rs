use crate::encoding::TextEncoding;
use crate::error::{SessionError, SessionResult};
use crate::port::{DataBits, FlowControl, Parity, PortConfiguration, StopBits, DEFAULT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_READ_SIZE: usize = 1024;

pub fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

pub fn default_read_size() -> usize {
    DEFAULT_READ_SIZE
}

/// Configuration of one session.
///
/// `path` and `baud_rate` are required; every other field has a default.
/// Line parameters (data bits, flow control, parity, stop bits) are fixed for
/// the life of the session and sent on every open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    pub path: String,
    pub baud_rate: u32,
    #[serde(default)]
    pub data_bits: DataBits,
    #[serde(default)]
    pub flow_control: FlowControl,
    #[serde(default)]
    pub parity: Parity,
    #[serde(default)]
    pub stop_bits: StopBits,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_read_size")]
    pub default_read_size: usize,
    #[serde(default)]
    pub encoding: TextEncoding,
}

impl SessionOptions {
    pub fn new(path: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            path: path.into(),
            baud_rate,
            data_bits: DataBits::default(),
            flow_control: FlowControl::default(),
            parity: Parity::default(),
            stop_bits: StopBits::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            default_read_size: DEFAULT_READ_SIZE,
            encoding: TextEncoding::default(),
        }
    }

    pub fn data_bits(mut self, data_bits: DataBits) -> Self {
        self.data_bits = data_bits;
        self
    }

    pub fn flow_control(mut self, flow_control: FlowControl) -> Self {
        self.flow_control = flow_control;
        self
    }

    pub fn parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    pub fn stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.stop_bits = stop_bits;
        self
    }

    /// Whole milliseconds; durations beyond `u64::MAX` ms saturate.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn read_size(mut self, size: usize) -> Self {
        self.default_read_size = size;
        self
    }

    pub fn encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Line parameters as sent to the gateway on open.
    pub fn port_configuration(&self) -> PortConfiguration {
        PortConfiguration {
            baud_rate: self.baud_rate,
            data_bits: self.data_bits,
            flow_control: self.flow_control,
            parity: self.parity,
            stop_bits: self.stop_bits,
            timeout: self.timeout_duration(),
        }
    }

    pub(crate) fn validate_for_open(&self) -> SessionResult<()> {
        if self.path.trim().is_empty() {
            return Err(SessionError::invalid_config("path is required"));
        }
        if self.baud_rate == 0 {
            return Err(SessionError::invalid_config("baud rate must be nonzero"));
        }
        if self.timeout_ms == 0 {
            return Err(SessionError::invalid_config("timeout must be at least 1 ms"));
        }
        Ok(())
    }
}

/// Per-call overrides for [`Session::read`](super::Session::read).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    pub timeout: Option<Duration>,
    pub size: Option<usize>,
}

impl ReadOptions {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }
}

/// Parameters [`Session::change`](super::Session::change) may update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortChange {
    pub path: Option<String>,
    pub baud_rate: Option<u32>,
}

impl PortChange {
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = Some(baud_rate);
        self
    }

    pub(crate) fn apply(self, options: &mut SessionOptions) {
        if let Some(path) = self.path {
            options.path = path;
        }
        if let Some(baud_rate) = self.baud_rate {
            options.baud_rate = baud_rate;
        }
    }
}
