//! Listener registry and the delivery loop
//!
//! Engine notifications arrive on an mpsc channel. A single task drains
//! it, wraps each notification into an [`Event`], calls the matching
//! listeners one after another and then publishes the event on the
//! broadcaster. A panicking listener is logged and skipped.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;
use tracing::{debug, error, trace};

use super::{Event, EventBroadcaster, EventKind, EventPayload};
use crate::engine::RawNotification;
use crate::metrics;

/// Callback invoked with each delivered event
pub type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

/// Identifies a registered listener for later removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Entry {
    id: ListenerId,
    /// `None` listens to every kind
    kind: Option<EventKind>,
    listener: Listener,
}

/// Registered listeners, in registration order
#[derive(Default)]
pub struct ListenerRegistry {
    entries: RwLock<Vec<Entry>>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one kind, or every kind with `None`
    pub fn add(&self, kind: Option<EventKind>, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.push(Entry { id, kind, listener });
        metrics::record_active_listeners(entries.len());
        trace!(?id, ?kind, "Listener added");
        id
    }

    /// Register a listener receiving the typed record of one event kind
    pub fn add_typed<E, F>(&self, f: F) -> ListenerId
    where
        E: EventPayload,
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.add(
            Some(E::KIND),
            Arc::new(move |event: &Event| {
                if let Some(payload) = E::from_event(event) {
                    f(payload);
                }
            }),
        )
    }

    /// Returns false when `id` was not registered
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|e| e.id != id);
        metrics::record_active_listeners(entries.len());
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn matching(&self, kind: EventKind) -> Vec<Listener> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.kind.map_or(true, |k| k == kind))
            .map(|e| e.listener.clone())
            .collect()
    }

    /// Call every listener matching the event's kind, in registration order
    ///
    /// Listeners run without the registry lock held, so they may add or
    /// remove listeners. Returns the number that completed without panicking.
    pub fn dispatch(&self, event: &Event) -> usize {
        let kind = event.kind();
        let mut completed = 0;
        for listener in self.matching(kind) {
            match catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(()) => completed += 1,
                Err(panic) => {
                    let reason = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    error!(%kind, %reason, "Event listener panicked");
                }
            }
        }
        completed
    }
}

/// Drain `rx` until every sender is gone
pub async fn run_delivery_loop(
    mut rx: mpsc::UnboundedReceiver<RawNotification>,
    registry: Arc<ListenerRegistry>,
    broadcaster: EventBroadcaster,
) {
    debug!("Delivery loop started");
    while let Some(raw) = rx.recv().await {
        let event = Event::from(raw);
        let kind = event.kind();
        let listeners = registry.dispatch(&event);
        let subscribers = broadcaster.emit(event);
        metrics::record_event_delivered(kind);
        trace!(%kind, listeners, subscribers, "Event delivered");
    }
    debug!("Delivery loop finished");
}
