//! Async session manager for a single serial port.
//!
//! A [`Session`] owns one port's configuration and open/closed state. It
//! drives a [`TransportGateway`](gateway::TransportGateway) for every hardware
//! operation and receives data through a path-scoped notification channel, so
//! reads, listeners and reconfiguration can interleave without racing each
//! other.
//!
//! ```no_run
//! use serial_session::{ReadOptions, SerialData, Session, SessionOptions};
//!
//! # async fn demo() -> serial_session::SessionResult<()> {
//! let mut session = Session::new(SessionOptions::new("/dev/ttyUSB0", 115_200));
//! session.open().await?;
//! session
//!     .listen(|data| {
//!         if let SerialData::Text(text) = data {
//!             print!("{text}");
//!         }
//!     }, true)
//!     .await?;
//! session.read(ReadOptions::default()).await?;
//! session.write("AT\r\n").await?;
//! session.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - `session`: the session state machine and listener subscriptions
//! - `gateway`: transport gateway trait, port registry and reader threads
//! - `port`: blocking port abstraction over `serialport`, plus an in-memory mock
//! - `registry`: process-wide enumerate / force-close operations
//! - `encoding`: text decoding for listeners
//! - `config`: TOML configuration with environment overrides
//! - `logging`: `tracing-subscriber` setup for binaries

pub mod config;
pub mod encoding;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod port;
pub mod registry;
pub mod session;

pub use encoding::{DecodeError, TextEncoding};
pub use error::{SessionError, SessionResult};
pub use gateway::{
    read_channel, GatewayError, Notification, OpenRequest, PortInfo, PortType, SerialGateway,
    TransportGateway,
};
pub use port::{DataBits, FlowControl, Parity, PortConfiguration, PortError, StopBits};
pub use registry::{available_ports, close_all, force_close};
pub use session::{
    BinaryPayload, PortChange, ReadOptions, SerialData, Session, SessionOptions, Subscription,
};

pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};
