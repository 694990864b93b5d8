//! Raw engine notifications
//!
//! These are the untyped tuples an engine produces from its background
//! activity. The client turns each one into a typed [`Event`](crate::events::Event).

use tokio::sync::mpsc;

use crate::events::EventKind;
use crate::identity::PublicKey;

/// Channel end an engine pushes notifications into
pub type NotificationSink = mpsc::UnboundedSender<RawNotification>;

/// A notification as delivered by the engine, before wrapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawNotification {
    FriendRequest { public_key: PublicKey, data: Vec<u8> },
    FriendMessage { friend: u32, message: String },
    FriendAction { friend: u32, action: String },
    NameChange { friend: u32, name: String },
    StatusMessage { friend: u32, message: String },
    UserStatus { friend: u32, status: u8 },
    TypingChange { friend: u32, typing: u8 },
    ReadReceipt { friend: u32, receipt: u32 },
    ConnectionStatus { friend: u32, status: u8 },
    AvatarInfo { friend: u32, format: u8, hash: Vec<u8> },
    AvatarData { friend: u32, format: u8, hash: Vec<u8>, data: Vec<u8> },
    GroupInvite { friend: u32, group_type: u8, data: Vec<u8> },
    GroupMessage { group: u32, peer: u32, message: String },
    GroupAction { group: u32, peer: u32, action: String },
    GroupNamelistChange { group: u32, peer: u32, change: u8 },
}

impl RawNotification {
    pub fn kind(&self) -> EventKind {
        match self {
            RawNotification::FriendRequest { .. } => EventKind::FriendRequest,
            RawNotification::FriendMessage { .. } => EventKind::FriendMessage,
            RawNotification::FriendAction { .. } => EventKind::FriendAction,
            RawNotification::NameChange { .. } => EventKind::NameChange,
            RawNotification::StatusMessage { .. } => EventKind::StatusMessage,
            RawNotification::UserStatus { .. } => EventKind::UserStatus,
            RawNotification::TypingChange { .. } => EventKind::TypingChange,
            RawNotification::ReadReceipt { .. } => EventKind::ReadReceipt,
            RawNotification::ConnectionStatus { .. } => EventKind::ConnectionStatus,
            RawNotification::AvatarInfo { .. } => EventKind::AvatarInfo,
            RawNotification::AvatarData { .. } => EventKind::AvatarData,
            RawNotification::GroupInvite { .. } => EventKind::GroupInvite,
            RawNotification::GroupMessage { .. } => EventKind::GroupMessage,
            RawNotification::GroupAction { .. } => EventKind::GroupAction,
            RawNotification::GroupNamelistChange { .. } => EventKind::GroupNamelistChange,
        }
    }
}
