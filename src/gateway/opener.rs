//! Device backends used by [`SerialGateway`](super::SerialGateway).
//!
//! A `PortOpener` knows how to enumerate devices and open a handle to one;
//! everything else (registry, readers, notifications) is shared.

use super::PortInfo;
use crate::port::{MockSerialPort, PortConfiguration, PortError, SerialPortAdapter, SyncSerialPort};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

pub trait PortOpener: Send + Sync + std::fmt::Debug {
    fn open(
        &self,
        path: &str,
        config: &PortConfiguration,
    ) -> Result<Box<dyn SerialPortAdapter>, PortError>;

    fn enumerate(&self) -> Result<Vec<PortInfo>, PortError>;
}

/// Real devices through the `serialport` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPorts;

impl PortOpener for SystemPorts {
    fn open(
        &self,
        path: &str,
        config: &PortConfiguration,
    ) -> Result<Box<dyn SerialPortAdapter>, PortError> {
        Ok(Box::new(SyncSerialPort::open(path, config)?))
    }

    fn enumerate(&self) -> Result<Vec<PortInfo>, PortError> {
        let ports = serialport::available_ports()?;
        Ok(ports.iter().map(PortInfo::from).collect())
    }
}

/// In-memory devices for tests and demos.
///
/// Cloning shares the device table, so a test can keep a `MockPorts` handle
/// after giving one to the gateway.
#[derive(Debug, Default, Clone)]
pub struct MockPorts {
    inner: Arc<Mutex<MockPortsState>>,
}

#[derive(Debug, Default)]
struct MockPortsState {
    devices: BTreeMap<String, (MockSerialPort, PortInfo)>,
    opened: Vec<(String, PortConfiguration)>,
}

impl MockPorts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device of unknown type under its own name.
    pub fn add(&self, port: MockSerialPort) -> MockSerialPort {
        let info = PortInfo::unknown(port.name());
        self.add_with_info(port, info)
    }

    pub fn add_with_info(&self, port: MockSerialPort, info: PortInfo) -> MockSerialPort {
        let handle = port.clone();
        self.inner
            .lock()
            .devices
            .insert(port.name().to_string(), (port, info));
        handle
    }

    /// Shared handle to a registered device, for feeding reads or checking writes.
    pub fn device(&self, path: &str) -> Option<MockSerialPort> {
        self.inner.lock().devices.get(path).map(|(port, _)| port.clone())
    }

    /// Every successful open with the line parameters it used.
    pub fn open_log(&self) -> Vec<(String, PortConfiguration)> {
        self.inner.lock().opened.clone()
    }
}

impl PortOpener for MockPorts {
    fn open(
        &self,
        path: &str,
        config: &PortConfiguration,
    ) -> Result<Box<dyn SerialPortAdapter>, PortError> {
        let mut state = self.inner.lock();
        let port = match state.devices.get(path) {
            Some((port, _)) => port.clone(),
            None => return Err(PortError::not_found(path)),
        };
        state.opened.push((path.to_string(), config.clone()));
        Ok(Box::new(port))
    }

    fn enumerate(&self) -> Result<Vec<PortInfo>, PortError> {
        Ok(self
            .inner
            .lock()
            .devices
            .values()
            .map(|(_, info)| info.clone())
            .collect())
    }
}
