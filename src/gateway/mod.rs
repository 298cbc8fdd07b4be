//! Transport gateway: the boundary between sessions and the serial hardware.
//!
//! Sessions never touch a device directly. They call a [`TransportGateway`],
//! which owns the process-wide registry of open ports, performs blocking I/O
//! off the async runtime and publishes received bytes as [`Notification`]s on
//! one broadcast channel per port path.
//!
//! ```text
//! Session ──open/close/write──> TransportGateway ──> PortOpener ──> device
//!    ^                                │
//!    └── Subscription <── hub channel "serialport-read-{path}" <── reader thread
//! ```
//!
//! [`SerialGateway`] is the production implementation; [`shared`] returns the
//! process-wide instance used by `Session::new` and the registry functions.

mod error;
mod hub;
mod opener;
mod reader;
mod serial;

pub use error::{GatewayError, GatewayResult};
pub use hub::{NotificationHub, DEFAULT_CHANNEL_CAPACITY};
pub use opener::{MockPorts, PortOpener, SystemPorts};
pub use serial::SerialGateway;

use crate::port::PortConfiguration;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Prefix of every per-path notification channel name.
pub const READ_CHANNEL_PREFIX: &str = "serialport-read-";

/// Name of the notification channel that carries data read from `path`.
pub fn read_channel(path: &str) -> String {
    format!("{READ_CHANNEL_PREFIX}{path}")
}

static SHARED: Lazy<Arc<SerialGateway>> = Lazy::new(|| Arc::new(SerialGateway::new()));

/// The process-wide gateway over real hardware.
pub fn shared() -> Arc<SerialGateway> {
    Arc::clone(&SHARED)
}

/// One chunk of bytes received from a port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Number of bytes in `data`.
    pub size: usize,
    pub data: Vec<u8>,
    pub received_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            size: data.len(),
            data,
            received_at: Utc::now(),
        }
    }
}

/// Everything a gateway needs to open a port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenRequest {
    pub path: String,
    #[serde(flatten)]
    pub config: PortConfiguration,
}

/// Kind of device behind a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortType {
    #[serde(rename = "USB")]
    Usb,
    #[serde(rename = "PCI")]
    Pci,
    Bluetooth,
    Unknown,
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Usb => "USB",
            Self::Pci => "PCI",
            Self::Bluetooth => "Bluetooth",
            Self::Unknown => "Unknown",
        })
    }
}

/// Descriptor of an enumerable port. `None` fields are unknown, never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortInfo {
    pub path: String,
    pub port_type: PortType,
    pub vid: Option<String>,
    pub pid: Option<String>,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
}

impl PortInfo {
    pub fn unknown(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            port_type: PortType::Unknown,
            vid: None,
            pid: None,
            manufacturer: None,
            product: None,
            serial_number: None,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.trim().is_empty()).cloned()
}

impl From<&serialport::SerialPortInfo> for PortInfo {
    fn from(info: &serialport::SerialPortInfo) -> Self {
        let mut port = Self::unknown(&info.port_name);
        match &info.port_type {
            serialport::SerialPortType::UsbPort(usb) => {
                port.port_type = PortType::Usb;
                port.vid = Some(format!("{:04x}", usb.vid));
                port.pid = Some(format!("{:04x}", usb.pid));
                port.manufacturer = non_empty(&usb.manufacturer);
                port.product = non_empty(&usb.product);
                port.serial_number = non_empty(&usb.serial_number);
            }
            serialport::SerialPortType::PciPort => port.port_type = PortType::Pci,
            serialport::SerialPortType::BluetoothPort => port.port_type = PortType::Bluetooth,
            serialport::SerialPortType::Unknown => {}
        }
        port
    }
}

/// Operations a session needs from the serial transport.
///
/// Every method is keyed by port path; implementations keep their own
/// registry of open ports. Implementations must deliver notifications for a
/// path in arrival order and must not publish for a path once `close`,
/// `force_close` or `close_all` has returned.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransportGateway: Send + Sync {
    async fn available_ports(&self) -> GatewayResult<Vec<PortInfo>>;

    async fn open(&self, request: &OpenRequest) -> GatewayResult<()>;

    async fn close(&self, path: &str) -> GatewayResult<()>;

    /// Close `path` whoever opened it. Succeeds if it is not open.
    async fn force_close(&self, path: &str) -> GatewayResult<()>;

    async fn close_all(&self) -> GatewayResult<()>;

    /// Start delivering data read from `path` on its notification channel.
    async fn start_read(&self, path: &str, timeout: Duration, size: usize) -> GatewayResult<()>;

    /// Abandon any read in flight for `path`. Idempotent.
    async fn cancel_read(&self, path: &str) -> GatewayResult<()>;

    async fn write(&self, path: &str, text: &str) -> GatewayResult<usize>;

    async fn write_binary(&self, path: &str, data: &[u8]) -> GatewayResult<usize>;

    fn subscribe(&self, channel: &str) -> GatewayResult<broadcast::Receiver<Notification>>;
}
