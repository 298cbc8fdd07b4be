//! Port abstraction layer for serial communication.
//!
//! Provides the device-handle trait used by the gateway, a hardware
//! implementation and an in-memory mock.

pub mod error;
pub mod mock;
pub mod sync_port;
pub mod traits;

pub use error::PortError;
pub use mock::MockSerialPort;
pub use sync_port::SyncSerialPort;
pub use traits::*;
