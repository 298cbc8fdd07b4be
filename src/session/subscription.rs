use crate::encoding::TextEncoding;
use crate::error::{SessionError, SessionResult};
use crate::gateway::Notification;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// What a listener receives for each chunk read from the port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerialData {
    Text(String),
    Binary(Vec<u8>),
}

impl SerialData {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(_) => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }
}

/// A live listener on one notification channel.
///
/// The handler runs on a tokio task, one notification at a time in channel
/// order. Dropping the subscription stops the task without waiting for it;
/// [`Subscription::cancel`] stops it and waits, so the handler is never
/// called after `cancel` returns.
#[derive(Debug)]
pub struct Subscription {
    id: Uuid,
    channel: String,
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub(crate) fn spawn<F>(
        receiver: broadcast::Receiver<Notification>,
        channel: String,
        decoder: Option<TextEncoding>,
        handler: F,
    ) -> Self
    where
        F: FnMut(SerialData) + Send + 'static,
    {
        let id = Uuid::new_v4();
        let (stop, stopped) = oneshot::channel();
        let task = tokio::spawn(deliver(receiver, stopped, channel.clone(), decoder, handler));
        debug!(%id, channel = %channel, "listener subscribed");
        Self {
            id,
            channel,
            stop: Some(stop),
            task: Some(task),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub(crate) async fn cancel(mut self) -> SessionResult<()> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let Some(task) = self.task.take() else {
            return Ok(());
        };
        match task.await {
            Ok(()) => {
                debug!(id = %self.id, channel = %self.channel, "listener unsubscribed");
                Ok(())
            }
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => Err(SessionError::Subscription(format!(
                "listener on {} failed: {e}",
                self.channel
            ))),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

async fn deliver<F>(
    mut receiver: broadcast::Receiver<Notification>,
    mut stopped: oneshot::Receiver<()>,
    channel: String,
    decoder: Option<TextEncoding>,
    mut handler: F,
) where
    F: FnMut(SerialData) + Send + 'static,
{
    loop {
        tokio::select! {
            biased;
            _ = &mut stopped => break,
            received = receiver.recv() => match received {
                Ok(notification) => dispatch(&mut handler, decoder, notification, &channel),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(channel = %channel, skipped, "listener fell behind, notifications dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!(channel = %channel, "notification channel closed");
                    break;
                }
            },
        }
    }
}

fn dispatch<F>(handler: &mut F, decoder: Option<TextEncoding>, notification: Notification, channel: &str)
where
    F: FnMut(SerialData),
{
    let data = match decoder {
        Some(encoding) => match encoding.decode(&notification.data) {
            Ok(text) => SerialData::Text(text),
            Err(e) => {
                warn!(channel, error = %e, size = notification.size, "dropping undecodable chunk");
                return;
            }
        },
        None => SerialData::Binary(notification.data),
    };

    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| handler(data))) {
        error!(channel, panic = panic_message(payload.as_ref()), "listener handler panicked");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
