/*
    Engine - the network engine collaborator

    The client never talks to the network itself. It drives an engine
    through four calls:

    - create(options)          -> engine | failure   (EngineFactory)
    - destroy()                                      (NetworkEngine)
    - invoke(request)          -> response | error   (NetworkEngine)
    - subscribe(kind, sink)                          (NetworkEngine)

    Blocking and non-blocking client operations both end in `invoke`.
    Notifications pushed into a sink are wrapped into typed events by the
    client's delivery loop.

    ┌──────────────┐  invoke   ┌──────────────────┐
    │  Dispatcher  │──────────►│  NetworkEngine   │
    └──────────────┘           │  (LocalEngine or │
    ┌──────────────┐  sink     │   a real one)    │
    │ Delivery loop│◄──────────│                  │
    └──────────────┘           └──────────────────┘
*/

use std::sync::Arc;

use crate::events::EventKind;

mod error;
mod local;
mod notification;
mod options;
mod request;

pub use error::EngineError;
pub use local::{
    LocalEngine, LocalEngineFactory, MAX_FRIEND_REQUEST_LENGTH, MAX_MESSAGE_LENGTH, MAX_NAME_LENGTH,
    MAX_STATUS_MESSAGE_LENGTH,
};
pub use notification::{NotificationSink, RawNotification};
pub use options::{EngineOptions, ProxyAddress, ProxyKind};
pub use request::{EngineRequest, EngineResponse, ResourceKey};

/// A live network engine instance
///
/// Implementations must be callable from several threads; the client
/// serializes `destroy` against in-flight `invoke` calls itself.
pub trait NetworkEngine: Send + Sync {
    /// Run one operation against the engine state
    fn invoke(&self, request: EngineRequest) -> Result<EngineResponse, EngineError>;

    /// Register delivery of one notification kind into `sink`
    fn subscribe(&self, kind: EventKind, sink: NotificationSink) -> Result<(), EngineError>;

    /// Tear the engine down. Called at most once by the client.
    fn destroy(&self);
}

/// Creates engines from options
pub trait EngineFactory {
    fn create(&self, options: &EngineOptions) -> Result<Arc<dyn NetworkEngine>, EngineError>;
}

impl<F> EngineFactory for F
where
    F: Fn(&EngineOptions) -> Result<Arc<dyn NetworkEngine>, EngineError>,
{
    fn create(&self, options: &EngineOptions) -> Result<Arc<dyn NetworkEngine>, EngineError> {
        self(options)
    }
}
