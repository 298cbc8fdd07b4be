//! Process-wide port operations that need no session.
//!
//! The plain functions act on the shared hardware gateway; the `*_on`
//! variants take any [`TransportGateway`], which is what sessions built with
//! [`Session::with_gateway`](crate::Session::with_gateway) should use.

use crate::error::SessionResult;
use crate::gateway::{self, PortInfo, TransportGateway};
use tracing::info;

/// Enumerate serial ports present on the system.
pub async fn available_ports() -> SessionResult<Vec<PortInfo>> {
    available_ports_on(gateway::shared().as_ref()).await
}

/// Close `path` regardless of which session opened it.
///
/// Sessions that had it open are not notified and keep reporting
/// `is_open() == true` until their next gateway call fails.
pub async fn force_close(path: &str) -> SessionResult<()> {
    force_close_on(gateway::shared().as_ref(), path).await
}

/// Close every port the shared gateway has open.
pub async fn close_all() -> SessionResult<()> {
    close_all_on(gateway::shared().as_ref()).await
}

pub async fn available_ports_on(gateway: &dyn TransportGateway) -> SessionResult<Vec<PortInfo>> {
    let mut ports = gateway.available_ports().await?;
    ports.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(ports)
}

pub async fn force_close_on(gateway: &dyn TransportGateway, path: &str) -> SessionResult<()> {
    gateway.force_close(path).await?;
    info!(path, "port force-closed");
    Ok(())
}

pub async fn close_all_on(gateway: &dyn TransportGateway) -> SessionResult<()> {
    gateway.close_all().await?;
    info!("all ports closed");
    Ok(())
}
