//! toxclient core
//!
//! Client layer over a peer-to-peer messaging network engine: a guarded
//! engine handle, every operation in blocking and non-blocking form, and
//! typed events for everything the engine reports on its own.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod events;
pub mod handle;
pub mod identity;
pub mod logging;
pub mod metrics;
#[doc(hidden)]
pub mod test_utils;

pub use client::{AvCompanion, Client};
pub use config::{ClientConfig, ConfigError};
pub use dispatch::Pending;
pub use engine::{EngineFactory, EngineOptions, LocalEngine, NetworkEngine, ProxyAddress};
pub use error::{ClientError, ClientResult};
pub use events::{
    AvatarDataEvent, AvatarInfoEvent, ConnectionStatusEvent, Event, EventKind, EventPayload,
    FriendActionEvent, FriendMessageEvent, FriendRequestEvent, GroupActionEvent,
    GroupInviteEvent, GroupMessageEvent, GroupNamelistChangeEvent, ListenerId, NameChangeEvent,
    ReadReceiptEvent, StatusMessageEvent, TypingChangeEvent, UserStatusEvent,
};
pub use identity::{Address, ContentHash, HashInput, Keys, PublicKey, SecretKey};
pub use logging::{init_logging, LogLevel};
