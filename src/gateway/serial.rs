//! Production gateway: registry of open ports plus per-port reader threads.

use super::error::{GatewayError, GatewayResult};
use super::hub::NotificationHub;
use super::opener::{PortOpener, SystemPorts};
use super::reader::{ReadParams, ReadWorker};
use super::{read_channel, Notification, OpenRequest, PortInfo, TransportGateway};
use crate::port::SerialPortAdapter;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

type SharedPort = Arc<Mutex<Box<dyn SerialPortAdapter>>>;

struct OpenPort {
    port: SharedPort,
    reader: Option<ReadWorker>,
}

/// Gateway over a [`PortOpener`] backend.
///
/// The registry maps port path to open handle. Blocking work (opening a
/// device, writing, joining a reader thread) runs on tokio's blocking pool.
pub struct SerialGateway {
    opener: Arc<dyn PortOpener>,
    registry: Mutex<HashMap<String, OpenPort>>,
    hub: Arc<NotificationHub>,
}

impl SerialGateway {
    /// Gateway over the system's real serial ports.
    pub fn new() -> Self {
        Self::with_opener(SystemPorts)
    }

    pub fn with_opener(opener: impl PortOpener + 'static) -> Self {
        Self {
            opener: Arc::new(opener),
            registry: Mutex::new(HashMap::new()),
            hub: Arc::new(NotificationHub::default()),
        }
    }

    pub fn is_open(&self, path: &str) -> bool {
        self.registry.lock().contains_key(path)
    }

    /// Paths currently held open, sorted.
    pub fn open_paths(&self) -> Vec<String> {
        let mut paths: Vec<_> = self.registry.lock().keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn is_reading(&self, path: &str) -> bool {
        self.registry
            .lock()
            .get(path)
            .and_then(|p| p.reader.as_ref())
            .is_some_and(|r| !r.is_finished())
    }

    pub fn hub(&self) -> &NotificationHub {
        &self.hub
    }

    fn port_handle(&self, path: &str) -> GatewayResult<SharedPort> {
        self.registry
            .lock()
            .get(path)
            .map(|p| Arc::clone(&p.port))
            .ok_or_else(|| GatewayError::NotOpen(path.to_string()))
    }

    async fn write_raw(&self, path: &str, data: Vec<u8>) -> GatewayResult<usize> {
        let port = self.port_handle(path)?;
        let owned_path = path.to_string();
        let written = tokio::task::spawn_blocking(move || {
            let mut port = port.lock();
            port.write_bytes(&data)
        })
        .await
        .map_err(|e| GatewayError::worker(path, e))?
        .map_err(|source| GatewayError::Io {
            path: owned_path,
            source,
        })?;
        debug!(path, bytes = written, "wrote");
        Ok(written)
    }

    /// Remove `path` from the registry, stopping its reader first.
    ///
    /// Returns `Ok(false)` if the path was not open.
    async fn release(&self, path: &str) -> GatewayResult<bool> {
        let removed = self.registry.lock().remove(path);
        let Some(entry) = removed else {
            return Ok(false);
        };
        if let Some(reader) = entry.reader {
            stop_reader(path, reader).await?;
        }
        // Dropping the last handle closes the device.
        drop(entry.port);
        self.hub.prune();
        Ok(true)
    }
}

impl Default for SerialGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SerialGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialGateway")
            .field("opener", &self.opener)
            .field("open_paths", &self.open_paths())
            .finish()
    }
}

async fn stop_reader(path: &str, reader: ReadWorker) -> GatewayResult<()> {
    tokio::task::spawn_blocking(move || reader.stop())
        .await
        .map_err(|e| GatewayError::worker(path, e))?
        .map_err(|message| GatewayError::worker(path, message))
}

#[async_trait]
impl TransportGateway for SerialGateway {
    async fn available_ports(&self) -> GatewayResult<Vec<PortInfo>> {
        let opener = Arc::clone(&self.opener);
        let mut ports = tokio::task::spawn_blocking(move || opener.enumerate())
            .await
            .map_err(|e| GatewayError::worker("<enumerate>", e))?
            .map_err(GatewayError::Enumeration)?;
        ports.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(count = ports.len(), "enumerated ports");
        Ok(ports)
    }

    async fn open(&self, request: &OpenRequest) -> GatewayResult<()> {
        if self.is_open(&request.path) {
            return Err(GatewayError::AlreadyOpen(request.path.clone()));
        }

        let opener = Arc::clone(&self.opener);
        let path = request.path.clone();
        let config = request.config.clone();
        let port = tokio::task::spawn_blocking(move || opener.open(&path, &config))
            .await
            .map_err(|e| GatewayError::worker(&request.path, e))?
            .map_err(|source| GatewayError::Open {
                path: request.path.clone(),
                source,
            })?;

        let mut registry = self.registry.lock();
        if registry.contains_key(&request.path) {
            // Lost a race with another opener of the same path.
            return Err(GatewayError::AlreadyOpen(request.path.clone()));
        }
        registry.insert(
            request.path.clone(),
            OpenPort {
                port: Arc::new(Mutex::new(port)),
                reader: None,
            },
        );
        info!(
            path = %request.path,
            baud = request.config.baud_rate,
            "port opened"
        );
        Ok(())
    }

    async fn close(&self, path: &str) -> GatewayResult<()> {
        if self.release(path).await? {
            info!(path, "port closed");
            Ok(())
        } else {
            Err(GatewayError::NotOpen(path.to_string()))
        }
    }

    async fn force_close(&self, path: &str) -> GatewayResult<()> {
        if self.release(path).await? {
            warn!(path, "port force-closed");
        }
        Ok(())
    }

    async fn close_all(&self) -> GatewayResult<()> {
        let drained: Vec<(String, OpenPort)> = self.registry.lock().drain().collect();
        let mut first_error = None;
        for (path, entry) in drained {
            if let Some(reader) = entry.reader {
                if let Err(e) = stop_reader(&path, reader).await {
                    warn!(path = %path, error = %e, "failed to stop reader");
                    first_error.get_or_insert(e);
                }
            }
            info!(path = %path, "port closed");
        }
        self.hub.prune();
        first_error.map_or(Ok(()), Err)
    }

    async fn start_read(&self, path: &str, timeout: Duration, size: usize) -> GatewayResult<()> {
        let finished = {
            let mut registry = self.registry.lock();
            let entry = registry
                .get_mut(path)
                .ok_or_else(|| GatewayError::NotOpen(path.to_string()))?;

            if entry.reader.as_ref().is_some_and(|r| !r.is_finished()) {
                debug!(path, "already reading");
                return Ok(());
            }
            let finished = entry.reader.take();

            let port = entry
                .port
                .lock()
                .try_clone_box()
                .map_err(|source| GatewayError::Io {
                    path: path.to_string(),
                    source,
                })?;
            let params = ReadParams {
                path: path.to_string(),
                channel: read_channel(path),
                interval: timeout,
                size,
            };
            let worker = ReadWorker::spawn(port, params, Arc::clone(&self.hub))
                .map_err(|e| GatewayError::worker(path, e))?;
            entry.reader = Some(worker);
            finished
        };

        info!(path, size, "started reading");
        if let Some(old) = finished {
            // Already exited; joining does not block.
            stop_reader(path, old).await?;
        }
        Ok(())
    }

    async fn cancel_read(&self, path: &str) -> GatewayResult<()> {
        let reader = self
            .registry
            .lock()
            .get_mut(path)
            .and_then(|entry| entry.reader.take());
        match reader {
            Some(reader) => {
                stop_reader(path, reader).await?;
                debug!(path, "read cancelled");
            }
            None => debug!(path, "no read to cancel"),
        }
        Ok(())
    }

    async fn write(&self, path: &str, text: &str) -> GatewayResult<usize> {
        self.write_raw(path, text.as_bytes().to_vec()).await
    }

    async fn write_binary(&self, path: &str, data: &[u8]) -> GatewayResult<usize> {
        self.write_raw(path, data.to_vec()).await
    }

    fn subscribe(&self, channel: &str) -> GatewayResult<broadcast::Receiver<Notification>> {
        Ok(self.hub.subscribe(channel))
    }
}
