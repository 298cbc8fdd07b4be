//! Background reader thread for an open port.
//!
//! Serial reads block for up to the port timeout, so each reading port gets a
//! dedicated OS thread rather than a runtime task. The thread publishes every
//! non-empty chunk on the port's notification channel, then waits `interval`
//! before reading again. A stop request interrupts the wait immediately.

use super::hub::NotificationHub;
use super::Notification;
use crate::port::SerialPortAdapter;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Shortest pause between reads, so a zero interval cannot spin the thread.
pub(crate) const MIN_READ_INTERVAL: Duration = Duration::from_millis(1);

/// Parameters of one read operation.
#[derive(Debug, Clone)]
pub(crate) struct ReadParams {
    pub path: String,
    pub channel: String,
    pub interval: Duration,
    pub size: usize,
}

/// Handle to a running reader thread.
#[derive(Debug)]
pub(crate) struct ReadWorker {
    path: String,
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

impl ReadWorker {
    pub fn spawn(
        port: Box<dyn SerialPortAdapter>,
        params: ReadParams,
        hub: Arc<NotificationHub>,
    ) -> std::io::Result<Self> {
        let (stop, stop_rx) = mpsc::channel();
        let path = params.path.clone();
        let interval = params.interval.max(MIN_READ_INTERVAL);
        let handle = thread::Builder::new()
            .name(format!("serial-read-{}", params.path))
            .spawn(move || {
                let mut port = port;
                let mut buffer = vec![0u8; params.size.max(1)];
                loop {
                    match port.read_bytes(&mut buffer) {
                        Ok(0) => {}
                        Ok(n) => {
                            debug!(path = %params.path, bytes = n, "read chunk");
                            hub.publish(&params.channel, Notification::new(buffer[..n].to_vec()));
                        }
                        Err(e) if e.is_timeout() => {}
                        Err(e) => {
                            warn!(path = %params.path, error = %e, "read failed, stopping reader");
                            break;
                        }
                    }

                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                            info!(path = %params.path, "stopped reading");
                            break;
                        }
                    }
                }
            })?;

        Ok(Self { path, stop, handle })
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Ask the thread to stop and wait for it to exit.
    ///
    /// Blocks for at most one read timeout. Once this returns, the worker
    /// publishes nothing more.
    pub fn stop(self) -> Result<(), String> {
        // The thread may already have exited on its own; that is fine.
        let _ = self.stop.send(());
        self.handle
            .join()
            .map_err(|_| format!("reader thread for {} panicked", self.path))
    }
}
