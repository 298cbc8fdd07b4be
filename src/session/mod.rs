//! Client-side serial port session.
//!
//! A [`Session`] owns one port's configuration and tracks whether this
//! session has it open. All hardware work goes through a
//! [`TransportGateway`]; received data reaches the caller via a listener
//! registered with [`Session::listen`].

mod options;
mod payload;
mod subscription;

pub use options::{
    default_read_size, default_timeout_ms, PortChange, ReadOptions, SessionOptions, DEFAULT_READ_SIZE,
};
pub use payload::BinaryPayload;
pub use subscription::{SerialData, Subscription};

use crate::error::{SessionError, SessionResult};
use crate::gateway::{self, read_channel, GatewayError, OpenRequest, TransportGateway};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Handle to one serial port, identified by its path.
///
/// `is_open` reflects what this session did, not the device: a port closed
/// out of band (for instance via [`crate::force_close`]) leaves the session
/// believing it is open until the next gateway call fails.
///
/// At most one listener is active per session. Sessions are not meant to be
/// shared between tasks; methods that change state take `&mut self`.
pub struct Session {
    options: SessionOptions,
    gateway: Arc<dyn TransportGateway>,
    is_open: bool,
    subscription: Option<Subscription>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("options", &self.options)
            .field("is_open", &self.is_open)
            .field("subscription", &self.subscription.as_ref().map(Subscription::id))
            .finish()
    }
}

impl Session {
    /// A closed session on the process-wide hardware gateway.
    pub fn new(options: SessionOptions) -> Self {
        Self::with_gateway(options, gateway::shared())
    }

    pub fn with_gateway(options: SessionOptions, gateway: Arc<dyn TransportGateway>) -> Self {
        Self {
            options,
            gateway,
            is_open: false,
            subscription: None,
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn path(&self) -> &str {
        &self.options.path
    }

    pub fn baud_rate(&self) -> u32 {
        self.options.baud_rate
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_listening(&self) -> bool {
        self.subscription.is_some()
    }

    /// Open the port with the full line configuration. No-op if already open.
    #[instrument(skip(self), fields(path = %self.options.path, baud_rate = self.options.baud_rate))]
    pub async fn open(&mut self) -> SessionResult<()> {
        self.options.validate_for_open()?;
        if self.is_open {
            debug!("already open");
            return Ok(());
        }

        let request = OpenRequest {
            path: self.options.path.clone(),
            config: self.options.port_configuration(),
        };
        self.gateway.open(&request).await?;
        self.is_open = true;
        info!("serial port opened");
        Ok(())
    }

    /// Stop reading, close the port, then drop the listener.
    ///
    /// Every step is attempted; the first hard failure is returned. A gateway
    /// close failure leaves the session open unless the gateway reports the
    /// port as not open.
    #[instrument(skip(self), fields(path = %self.options.path))]
    pub async fn close(&mut self) -> SessionResult<()> {
        if !self.is_open {
            debug!("already closed");
            return Ok(());
        }
        let path = self.options.path.clone();

        if let Err(e) = self.gateway.cancel_read(&path).await {
            warn!(error = %e, "cancelling read before close failed");
        }

        let closed = self.gateway.close(&path).await;
        match &closed {
            Ok(()) => self.is_open = false,
            Err(GatewayError::NotOpen(_)) => {
                warn!("port was already closed by someone else");
                self.is_open = false;
            }
            Err(e) => warn!(error = %e, "gateway close failed"),
        }

        let unsubscribed = self.cancel_listen().await;
        closed?;
        unsubscribed?;
        info!("serial port closed");
        Ok(())
    }

    /// Update path and/or baud rate, reopening if the session was open.
    pub async fn change(&mut self, change: PortChange) -> SessionResult<()> {
        self.reconfigure(move |options| change.apply(options)).await
    }

    pub async fn set_baud_rate(&mut self, baud_rate: u32) -> SessionResult<()> {
        self.change(PortChange::default().baud_rate(baud_rate)).await
    }

    pub async fn set_path(&mut self, path: impl Into<String>) -> SessionResult<()> {
        self.change(PortChange::default().path(path)).await
    }

    /// The new values are stored even when closing fails; the session is then
    /// left as the close left it and not reopened.
    async fn reconfigure<F>(&mut self, apply: F) -> SessionResult<()>
    where
        F: FnOnce(&mut SessionOptions) + Send,
    {
        let was_open = self.is_open;
        let closed = if was_open { self.close().await } else { Ok(()) };
        apply(&mut self.options);
        debug!(path = %self.options.path, baud_rate = self.options.baud_rate, was_open, "reconfigured");
        closed?;
        if was_open {
            self.open().await?;
        }
        Ok(())
    }

    /// Ask the gateway to start delivering data to listeners.
    ///
    /// Completes once reading has started; the data arrives through
    /// [`Session::listen`]. Unset fields of `options` fall back to the
    /// session's timeout and default read size.
    pub async fn read(&self, options: ReadOptions) -> SessionResult<()> {
        self.ensure_open()?;
        let timeout = options.timeout.unwrap_or_else(|| self.options.timeout_duration());
        let size = options.size.unwrap_or(self.options.default_read_size);
        self.gateway.start_read(&self.options.path, timeout, size).await?;
        Ok(())
    }

    /// Abandon an in-flight read. Allowed in any state.
    pub async fn cancel_read(&self) -> SessionResult<()> {
        self.gateway.cancel_read(&self.options.path).await?;
        Ok(())
    }

    /// Write text. Returns what the gateway reports as written.
    pub async fn write(&self, text: &str) -> SessionResult<usize> {
        self.ensure_open()?;
        Ok(self.gateway.write(&self.options.path, text).await?)
    }

    /// Write raw bytes.
    ///
    /// ```no_run
    /// # async fn demo(session: &serial_session::Session) -> serial_session::SessionResult<()> {
    /// session.write_binary([0x02u8, 0x10, 0x03]).await?;
    /// session.write_binary(vec![72i64, 105]).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn write_binary<P>(&self, data: P) -> SessionResult<usize>
    where
        P: TryInto<BinaryPayload, Error = SessionError>,
    {
        self.ensure_open()?;
        let payload = data.try_into()?;
        Ok(self
            .gateway
            .write_binary(&self.options.path, payload.as_bytes())
            .await?)
    }

    /// Register `handler` for data read from this session's path, replacing
    /// any previous listener.
    ///
    /// With `decode` set, each chunk is decoded with the session's encoding
    /// and delivered as [`SerialData::Text`]; otherwise the bytes are passed
    /// through as [`SerialData::Binary`]. The listener is bound to the path
    /// current at the time of the call.
    pub async fn listen<F>(&mut self, handler: F, decode: bool) -> SessionResult<()>
    where
        F: FnMut(SerialData) + Send + 'static,
    {
        self.cancel_listen().await?;
        let channel = read_channel(&self.options.path);
        let receiver = self
            .gateway
            .subscribe(&channel)
            .map_err(|e| SessionError::Subscription(e.to_string()))?;
        let decoder = decode.then_some(self.options.encoding);
        self.subscription = Some(Subscription::spawn(receiver, channel, decoder, handler));
        Ok(())
    }

    /// Remove the active listener, if any.
    pub async fn cancel_listen(&mut self) -> SessionResult<()> {
        match self.subscription.take() {
            Some(subscription) => subscription.cancel().await,
            None => Ok(()),
        }
    }

    fn ensure_open(&self) -> SessionResult<()> {
        if self.is_open {
            Ok(())
        } else {
            Err(SessionError::NotOpen)
        }
    }
}
