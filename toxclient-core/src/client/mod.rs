//! The client
//!
//! A [`Client`] owns one network engine for its whole life. It exposes
//! every engine operation in a blocking (`*_sync`) and a non-blocking form,
//! and turns engine notifications into typed events for listeners.
//!
//! ```no_run
//! use toxclient_core::{Client, ClientConfig, FriendMessageEvent};
//!
//! let client = Client::new(ClientConfig::default()).unwrap();
//! client.on::<FriendMessageEvent, _>(|msg| println!("{}: {}", msg.friend(), msg.message()));
//!
//! let group = client.add_groupchat_sync().unwrap();
//! client.delete_groupchat(group).wait().unwrap();
//! client.kill_sync().unwrap();
//! ```

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::dispatch::{Completion, Deferred, Dispatcher, Executor, Immediate, Pending};
use crate::engine::{
    EngineError, EngineFactory, EngineOptions, EngineRequest, EngineResponse, LocalEngineFactory,
    NetworkEngine, RawNotification,
};
use crate::error::{ClientError, ClientResult};
use crate::events::delivery::run_delivery_loop;
use crate::events::{Event, EventBroadcaster, EventKind, EventPayload, ListenerId, ListenerRegistry};
use crate::handle::HandleGuard;
use crate::identity::PublicKey;

mod av;
mod operations;

pub use av::AvCompanion;

fn creation_failed(e: EngineError) -> ClientError {
    ClientError::EngineFailure(format!("engine creation failed: {}", e))
}

/// Subscribe to every notification kind and read the engine's public key
fn connect(
    engine: &dyn NetworkEngine,
) -> ClientResult<(mpsc::UnboundedReceiver<RawNotification>, PublicKey)> {
    let (sink, notifications) = mpsc::unbounded_channel();
    for kind in EventKind::ALL {
        engine.subscribe(kind, sink.clone()).map_err(creation_failed)?;
    }

    match engine.invoke(EngineRequest::GetKeys).map_err(creation_failed)? {
        EngineResponse::Keys(keys) => Ok((notifications, *keys.public_key())),
        other => Err(ClientError::EngineFailure(format!(
            "engine returned {} for its keys",
            other.variant()
        ))),
    }
}

pub struct Client {
    dispatcher: Dispatcher,
    listeners: Arc<ListenerRegistry>,
    broadcaster: EventBroadcaster,
    delivery: JoinHandle<()>,
    options: EngineOptions,
    public_key: PublicKey,
    av: Option<AvCompanion>,
}

impl Client {
    /// Create a client backed by the in-memory [`LocalEngine`](crate::engine::LocalEngine)
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        Self::with_factory(config, LocalEngineFactory)
    }

    /// Create a client whose engine comes from `factory`
    ///
    /// Works inside or outside a tokio runtime; outside of one the client
    /// runs its own.
    pub fn with_factory<F: EngineFactory>(config: ClientConfig, factory: F) -> ClientResult<Self> {
        let options = config.engine_options()?;
        if config.events.broadcast_capacity == 0 {
            return Err(ClientError::InvalidArgument(
                "broadcast_capacity must be greater than 0".to_string(),
            ));
        }

        let executor = Executor::new(config.runtime.worker_threads)?;
        let engine = factory.create(&options).map_err(creation_failed)?;

        let (notifications, public_key) = match connect(engine.as_ref()) {
            Ok(connected) => connected,
            Err(e) => {
                warn!(error = %e, "Engine setup failed, destroying engine");
                engine.destroy();
                return Err(e);
            }
        };

        let guard = Arc::new(HandleGuard::new());
        guard.install(engine)?;

        let listeners = Arc::new(ListenerRegistry::new());
        let broadcaster = EventBroadcaster::new(config.events.broadcast_capacity);
        let delivery = executor.spawn(run_delivery_loop(
            notifications,
            listeners.clone(),
            broadcaster.clone(),
        ));

        let av = options.enable_av.then(|| AvCompanion::attach(&guard));

        info!(
            public_key = %public_key,
            av = av.is_some(),
            owned_runtime = executor.owns_runtime(),
            "Client created"
        );

        Ok(Self {
            dispatcher: Dispatcher::new(guard, executor),
            listeners,
            broadcaster,
            delivery,
            options,
            public_key,
            av,
        })
    }

    /// Options the engine was created with
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Public key read at construction; available after `kill`
    pub fn cached_public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// AV companion, `None` when the client was created with AV disabled
    pub fn av(&self) -> Option<&AvCompanion> {
        self.av.as_ref()
    }

    /// Whether the engine handle is live. Never fails.
    pub fn has_handle(&self) -> bool {
        self.dispatcher.guard().is_live()
    }

    fn check_handle_with<C: Completion>(&self) -> C::Output<()> {
        self.dispatcher
            .run_local::<C, _, _>("check_handle", |guard| guard.check())
    }

    /// `Ok(())` when the handle is live, `HandleInvalid` otherwise
    pub fn check_handle(&self) -> Pending<()> {
        self.check_handle_with::<Deferred>()
    }

    pub fn check_handle_sync(&self) -> ClientResult<()> {
        self.check_handle_with::<Immediate>()
    }

    fn kill_with<C: Completion>(&self) -> C::Output<()> {
        self.dispatcher.run_local::<C, _, _>("kill", |guard| guard.destroy())
    }

    /// Destroy the engine handle
    ///
    /// Waits for in-flight engine calls. Operations scheduled earlier that
    /// have not started yet fail with `HandleInvalid`. Killing twice fails
    /// with `HandleInvalid`.
    pub fn kill(&self) -> Pending<()> {
        self.kill_with::<Deferred>()
    }

    pub fn kill_sync(&self) -> ClientResult<()> {
        self.kill_with::<Immediate>()
    }

    /// Listen to one event kind
    ///
    /// Listeners run one at a time on the delivery task; a slow listener
    /// delays every later event.
    pub fn on<E, F>(&self, listener: F) -> ListenerId
    where
        E: EventPayload,
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.listeners.add_typed::<E, F>(listener)
    }

    /// Listen to every event
    pub fn on_any<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.listeners.add(None, Arc::new(listener))
    }

    /// Returns false when `id` is not registered
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Stream of every delivered event
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.broadcaster.subscribe()
    }

    pub(crate) fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        let guard = self.dispatcher.guard();
        if guard.is_live() {
            if let Err(e) = guard.destroy() {
                warn!(error = %e, "Failed to destroy engine on drop");
            }
        }
        self.delivery.abort();
        debug!("Client dropped");
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("public_key", &self.public_key)
            .field("handle", &self.dispatcher.guard().state_name())
            .field("listeners", &self.listeners.len())
            .field("av", &self.av.is_some())
            .finish()
    }
}
