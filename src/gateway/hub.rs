//! Named broadcast channels carrying data-arrival notifications.
//!
//! One channel exists per port path (see [`read_channel`](super::read_channel)),
//! so a subscriber never sees another port's traffic. Only [`subscribe`]
//! creates a channel. Publishing to a path nobody has subscribed to drops the
//! notification and leaves the hub unchanged.
//!
//! [`subscribe`]: NotificationHub::subscribe

use super::Notification;
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::broadcast;
use tracing::trace;

/// Default number of notifications buffered per channel before slow
/// subscribers start lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug)]
pub struct NotificationHub {
    channels: Mutex<HashMap<String, broadcast::Sender<Notification>>>,
    capacity: usize,
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl NotificationHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn subscribe(&self, channel: &str) -> broadcast::Receiver<Notification> {
        let mut channels = self.channels.lock();
        match channels.get(channel) {
            Some(tx) => tx.subscribe(),
            None => {
                let (tx, rx) = broadcast::channel(self.capacity);
                channels.insert(channel.to_string(), tx);
                rx
            }
        }
    }

    /// Deliver a notification to every current subscriber of `channel`.
    ///
    /// Returns how many subscribers received it; zero means it was dropped.
    pub fn publish(&self, channel: &str, notification: Notification) -> usize {
        let channels = self.channels.lock();
        match channels.get(channel) {
            Some(tx) => tx.send(notification).unwrap_or(0),
            None => {
                trace!(channel, "no subscribers, dropping notification");
                0
            }
        }
    }

    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .lock()
            .get(channel)
            .map(broadcast::Sender::receiver_count)
            .unwrap_or(0)
    }

    /// Forget channels nobody listens to any more.
    pub fn prune(&self) {
        self.channels.lock().retain(|_, tx| tx.receiver_count() > 0);
    }
}
