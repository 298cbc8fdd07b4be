//! In-memory serial port for tests and demos.
//!
//! `MockSerialPort` handles are cheap clones over shared state, so a test can
//! keep one handle to feed incoming bytes while the gateway owns another.

use super::error::PortError;
use super::traits::SerialPortAdapter;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

#[derive(Debug, Default)]
struct MockPortState {
    /// Chunks returned by successive reads. A chunk larger than the read
    /// buffer is split and its tail stays at the front of the queue.
    read_queue: VecDeque<Vec<u8>>,
    write_log: Vec<Vec<u8>>,
    disconnected: bool,
}

/// Mock serial port implementation.
///
/// # Example
/// ```
/// use serial_session::port::{MockSerialPort, SerialPortAdapter};
///
/// let mut port = MockSerialPort::new("MOCK0");
/// port.enqueue_read(b"Hello");
///
/// let mut buffer = [0u8; 16];
/// let n = port.read_bytes(&mut buffer).unwrap();
/// assert_eq!(&buffer[..n], b"Hello");
///
/// port.write_bytes(b"AT\r\n").unwrap();
/// assert_eq!(port.get_write_log(), vec![b"AT\r\n".to_vec()]);
/// ```
#[derive(Clone)]
pub struct MockSerialPort {
    name: String,
    state: Arc<Mutex<MockPortState>>,
}

impl MockSerialPort {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockPortState::default())),
        }
    }

    /// Queue one chunk of incoming bytes. Each chunk is delivered by its own read.
    pub fn enqueue_read(&mut self, data: &[u8]) {
        self.state.lock().read_queue.push_back(data.to_vec());
    }

    pub fn get_write_log(&self) -> Vec<Vec<u8>> {
        self.state.lock().write_log.clone()
    }

    /// Simulate the device being unplugged: every later operation fails.
    pub fn disconnect(&mut self) {
        self.state.lock().disconnected = true;
    }

    pub fn available_bytes(&self) -> usize {
        self.state.lock().read_queue.iter().map(Vec::len).sum()
    }

    fn broken_pipe() -> PortError {
        PortError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "device disconnected"))
    }
}

impl SerialPortAdapter for MockSerialPort {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock();
        if state.disconnected {
            return Err(Self::broken_pipe());
        }
        state.write_log.push(data.to_vec());
        Ok(data.len())
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock();
        if state.disconnected {
            return Err(Self::broken_pipe());
        }

        let Some(mut chunk) = state.read_queue.pop_front() else {
            return Err(PortError::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                "No data available",
            )));
        };

        let n = chunk.len().min(buffer.len());
        buffer[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            state.read_queue.push_front(chunk.split_off(n));
        }
        Ok(n)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn try_clone_box(&self) -> Result<Box<dyn SerialPortAdapter>, PortError> {
        Ok(Box::new(self.clone()))
    }
}

impl std::fmt::Debug for MockSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSerialPort")
            .field("name", &self.name)
            .field("available_bytes", &self.available_bytes())
            .finish()
    }
}
