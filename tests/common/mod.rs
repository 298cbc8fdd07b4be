//! Shared test utilities for session tests.
//!
//! - [`RecordingGateway`]: an in-process `TransportGateway` that records
//!   every call, tracks open paths like the real registry and can be told to
//!   fail specific operations
//! - listener sinks and polling helpers

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serial_session::gateway::{
    read_channel, GatewayError, GatewayResult, Notification, NotificationHub, OpenRequest,
    PortInfo, TransportGateway,
};
use serial_session::{SerialData, Session, SessionOptions};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// One call made against a [`RecordingGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    AvailablePorts,
    Open(OpenRequest),
    Close(String),
    ForceClose(String),
    CloseAll,
    StartRead {
        path: String,
        timeout: Duration,
        size: usize,
    },
    CancelRead(String),
    Write {
        path: String,
        text: String,
    },
    WriteBinary {
        path: String,
        data: Vec<u8>,
    },
    Subscribe(String),
}

/// Operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Open,
    Close,
    CancelRead,
    StartRead,
    Write,
    Subscribe,
}

#[derive(Debug, Default)]
pub struct RecordingGateway {
    calls: Mutex<Vec<GatewayCall>>,
    open: Mutex<HashSet<String>>,
    failing: Mutex<HashSet<Op>>,
    ports: Mutex<Vec<PortInfo>>,
    listeners_at_close: Mutex<Vec<usize>>,
    hub: NotificationHub,
}

impl RecordingGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_ports(ports: Vec<PortInfo>) -> Arc<Self> {
        let gateway = Self::default();
        *gateway.ports.lock() = ports;
        Arc::new(gateway)
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn fail(&self, op: Op) {
        self.failing.lock().insert(op);
    }

    pub fn heal(&self, op: Op) {
        self.failing.lock().remove(&op);
    }

    pub fn is_open(&self, path: &str) -> bool {
        self.open.lock().contains(path)
    }

    /// Simulate data arriving on `path`. Returns the number of listeners reached.
    pub fn push(&self, path: &str, data: &[u8]) -> usize {
        self.hub
            .publish(&read_channel(path), Notification::new(data.to_vec()))
    }

    pub fn listener_count(&self, path: &str) -> usize {
        self.hub.subscriber_count(&read_channel(path))
    }

    /// Listener count on the closed path, sampled at each `close` call.
    pub fn listeners_at_close(&self) -> Vec<usize> {
        self.listeners_at_close.lock().clone()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().push(call);
    }

    fn check(&self, op: Op, path: &str) -> GatewayResult<()> {
        if self.failing.lock().contains(&op) {
            Err(GatewayError::worker(path, format!("injected {op:?} failure")))
        } else {
            Ok(())
        }
    }

    fn require_open(&self, path: &str) -> GatewayResult<()> {
        if self.is_open(path) {
            Ok(())
        } else {
            Err(GatewayError::NotOpen(path.to_string()))
        }
    }
}

#[async_trait]
impl TransportGateway for RecordingGateway {
    async fn available_ports(&self) -> GatewayResult<Vec<PortInfo>> {
        self.record(GatewayCall::AvailablePorts);
        Ok(self.ports.lock().clone())
    }

    async fn open(&self, request: &OpenRequest) -> GatewayResult<()> {
        self.record(GatewayCall::Open(request.clone()));
        self.check(Op::Open, &request.path)?;
        if !self.open.lock().insert(request.path.clone()) {
            return Err(GatewayError::AlreadyOpen(request.path.clone()));
        }
        Ok(())
    }

    async fn close(&self, path: &str) -> GatewayResult<()> {
        self.record(GatewayCall::Close(path.to_string()));
        self.listeners_at_close
            .lock()
            .push(self.listener_count(path));
        self.check(Op::Close, path)?;
        if self.open.lock().remove(path) {
            Ok(())
        } else {
            Err(GatewayError::NotOpen(path.to_string()))
        }
    }

    async fn force_close(&self, path: &str) -> GatewayResult<()> {
        self.record(GatewayCall::ForceClose(path.to_string()));
        self.open.lock().remove(path);
        Ok(())
    }

    async fn close_all(&self) -> GatewayResult<()> {
        self.record(GatewayCall::CloseAll);
        self.open.lock().clear();
        Ok(())
    }

    async fn start_read(&self, path: &str, timeout: Duration, size: usize) -> GatewayResult<()> {
        self.record(GatewayCall::StartRead {
            path: path.to_string(),
            timeout,
            size,
        });
        self.check(Op::StartRead, path)?;
        self.require_open(path)
    }

    async fn cancel_read(&self, path: &str) -> GatewayResult<()> {
        self.record(GatewayCall::CancelRead(path.to_string()));
        self.check(Op::CancelRead, path)
    }

    async fn write(&self, path: &str, text: &str) -> GatewayResult<usize> {
        self.record(GatewayCall::Write {
            path: path.to_string(),
            text: text.to_string(),
        });
        self.check(Op::Write, path)?;
        self.require_open(path)?;
        Ok(text.len())
    }

    async fn write_binary(&self, path: &str, data: &[u8]) -> GatewayResult<usize> {
        self.record(GatewayCall::WriteBinary {
            path: path.to_string(),
            data: data.to_vec(),
        });
        self.check(Op::Write, path)?;
        self.require_open(path)?;
        Ok(data.len())
    }

    fn subscribe(&self, channel: &str) -> GatewayResult<broadcast::Receiver<Notification>> {
        self.record(GatewayCall::Subscribe(channel.to_string()));
        self.check(Op::Subscribe, channel)?;
        Ok(self.hub.subscribe(channel))
    }
}

/// A closed session on `path` at 9600 baud over `gateway`.
pub fn session_on(gateway: &Arc<RecordingGateway>, path: &str) -> Session {
    Session::with_gateway(SessionOptions::new(path, 9600), gateway.clone())
}

/// Listener that stores everything it receives.
pub fn sink() -> (
    Arc<Mutex<Vec<SerialData>>>,
    impl FnMut(SerialData) + Send + 'static,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let store = Arc::clone(&seen);
    (seen, move |data| store.lock().push(data))
}

/// Poll `condition` until it holds or `timeout` passes.
pub async fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

/// Give spawned listener tasks a chance to run.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

/// Await `future`, failing the test if it takes longer than five seconds.
pub async fn within<T>(future: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("operation timed out")
}
