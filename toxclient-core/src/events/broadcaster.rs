//! Event broadcasting
//!
//! Fans delivered events out to any number of async subscribers, next to
//! the callback listeners.

use tokio::sync::broadcast;

use super::Event;

/// Default number of events buffered per subscriber
pub const DEFAULT_CAPACITY: usize = 256;

/// Broadcast channel of client events
///
/// A subscriber that falls more than `capacity` events behind skips the
/// oldest ones and sees `RecvError::Lagged`.
#[derive(Clone)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<Event>,
}

impl EventBroadcaster {
    /// # Arguments
    /// * `capacity` - Number of events buffered per subscriber (must be > 0)
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all subscribers
    ///
    /// # Returns
    /// Number of active subscribers that received the event
    pub fn emit(&self, event: Event) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
