//! Client events
//!
//! Everything the engine reports on its own (incoming messages, friend
//! requests, status changes, avatar transfers, groupchat activity) reaches
//! the application as an [`Event`]. Each variant wraps an immutable record
//! that carries the raw notification fields plus derived views.
//!
//! Listeners register for one kind through the [`EventPayload`] type of that
//! kind, or for every kind at once.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::RawNotification;

pub mod avatar;
pub mod broadcaster;
pub mod delivery;
pub mod friend;
pub mod group;

pub use avatar::{AvatarDataEvent, AvatarFormat, AvatarInfoEvent};
pub use broadcaster::EventBroadcaster;
pub use delivery::{Listener, ListenerId, ListenerRegistry};
pub use friend::{
    ConnectionStatusEvent, FriendActionEvent, FriendMessageEvent, FriendRequestEvent,
    NameChangeEvent, ReadReceiptEvent, StatusMessageEvent, Typing, TypingChangeEvent, UserStatus,
    UserStatusEvent,
};
pub use group::{
    GroupActionEvent, GroupInviteEvent, GroupMessageEvent, GroupNamelistChangeEvent,
    GroupchatType, NamelistChange,
};

/// Notification kinds, one per [`Event`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    FriendRequest,
    FriendMessage,
    FriendAction,
    NameChange,
    StatusMessage,
    UserStatus,
    TypingChange,
    ReadReceipt,
    ConnectionStatus,
    AvatarInfo,
    AvatarData,
    GroupInvite,
    GroupMessage,
    GroupAction,
    GroupNamelistChange,
}

impl EventKind {
    pub const ALL: [EventKind; 15] = [
        EventKind::FriendRequest,
        EventKind::FriendMessage,
        EventKind::FriendAction,
        EventKind::NameChange,
        EventKind::StatusMessage,
        EventKind::UserStatus,
        EventKind::TypingChange,
        EventKind::ReadReceipt,
        EventKind::ConnectionStatus,
        EventKind::AvatarInfo,
        EventKind::AvatarData,
        EventKind::GroupInvite,
        EventKind::GroupMessage,
        EventKind::GroupAction,
        EventKind::GroupNamelistChange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::FriendRequest => "friend_request",
            EventKind::FriendMessage => "friend_message",
            EventKind::FriendAction => "friend_action",
            EventKind::NameChange => "name_change",
            EventKind::StatusMessage => "status_message",
            EventKind::UserStatus => "user_status",
            EventKind::TypingChange => "typing_change",
            EventKind::ReadReceipt => "read_receipt",
            EventKind::ConnectionStatus => "connection_status",
            EventKind::AvatarInfo => "avatar_info",
            EventKind::AvatarData => "avatar_data",
            EventKind::GroupInvite => "group_invite",
            EventKind::GroupMessage => "group_message",
            EventKind::GroupAction => "group_action",
            EventKind::GroupNamelistChange => "group_namelist_change",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An engine-originated event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum Event {
    FriendRequest(FriendRequestEvent),
    FriendMessage(FriendMessageEvent),
    FriendAction(FriendActionEvent),
    NameChange(NameChangeEvent),
    StatusMessage(StatusMessageEvent),
    UserStatus(UserStatusEvent),
    TypingChange(TypingChangeEvent),
    ReadReceipt(ReadReceiptEvent),
    ConnectionStatus(ConnectionStatusEvent),
    AvatarInfo(AvatarInfoEvent),
    AvatarData(AvatarDataEvent),
    GroupInvite(GroupInviteEvent),
    GroupMessage(GroupMessageEvent),
    GroupAction(GroupActionEvent),
    GroupNamelistChange(GroupNamelistChangeEvent),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::FriendRequest(_) => EventKind::FriendRequest,
            Event::FriendMessage(_) => EventKind::FriendMessage,
            Event::FriendAction(_) => EventKind::FriendAction,
            Event::NameChange(_) => EventKind::NameChange,
            Event::StatusMessage(_) => EventKind::StatusMessage,
            Event::UserStatus(_) => EventKind::UserStatus,
            Event::TypingChange(_) => EventKind::TypingChange,
            Event::ReadReceipt(_) => EventKind::ReadReceipt,
            Event::ConnectionStatus(_) => EventKind::ConnectionStatus,
            Event::AvatarInfo(_) => EventKind::AvatarInfo,
            Event::AvatarData(_) => EventKind::AvatarData,
            Event::GroupInvite(_) => EventKind::GroupInvite,
            Event::GroupMessage(_) => EventKind::GroupMessage,
            Event::GroupAction(_) => EventKind::GroupAction,
            Event::GroupNamelistChange(_) => EventKind::GroupNamelistChange,
        }
    }

    /// Friend number the event concerns, if any
    pub fn friend(&self) -> Option<u32> {
        match self {
            Event::FriendRequest(_)
            | Event::GroupMessage(_)
            | Event::GroupAction(_)
            | Event::GroupNamelistChange(_) => None,
            Event::FriendMessage(e) => Some(e.friend()),
            Event::FriendAction(e) => Some(e.friend()),
            Event::NameChange(e) => Some(e.friend()),
            Event::StatusMessage(e) => Some(e.friend()),
            Event::UserStatus(e) => Some(e.friend()),
            Event::TypingChange(e) => Some(e.friend()),
            Event::ReadReceipt(e) => Some(e.friend()),
            Event::ConnectionStatus(e) => Some(e.friend()),
            Event::AvatarInfo(e) => Some(e.friend()),
            Event::AvatarData(e) => Some(e.friend()),
            Event::GroupInvite(e) => Some(e.friend()),
        }
    }

    /// Group number the event concerns, if any
    pub fn group(&self) -> Option<u32> {
        match self {
            Event::GroupMessage(e) => Some(e.group()),
            Event::GroupAction(e) => Some(e.group()),
            Event::GroupNamelistChange(e) => Some(e.group()),
            _ => None,
        }
    }
}

impl From<RawNotification> for Event {
    fn from(raw: RawNotification) -> Self {
        match raw {
            RawNotification::FriendRequest { public_key, data } => {
                Event::FriendRequest(FriendRequestEvent::new(public_key, data))
            }
            RawNotification::FriendMessage { friend, message } => {
                Event::FriendMessage(FriendMessageEvent::new(friend, message))
            }
            RawNotification::FriendAction { friend, action } => {
                Event::FriendAction(FriendActionEvent::new(friend, action))
            }
            RawNotification::NameChange { friend, name } => {
                Event::NameChange(NameChangeEvent::new(friend, name))
            }
            RawNotification::StatusMessage { friend, message } => {
                Event::StatusMessage(StatusMessageEvent::new(friend, message))
            }
            RawNotification::UserStatus { friend, status } => {
                Event::UserStatus(UserStatusEvent::new(friend, status))
            }
            RawNotification::TypingChange { friend, typing } => {
                Event::TypingChange(TypingChangeEvent::new(friend, typing))
            }
            RawNotification::ReadReceipt { friend, receipt } => {
                Event::ReadReceipt(ReadReceiptEvent::new(friend, receipt))
            }
            RawNotification::ConnectionStatus { friend, status } => {
                Event::ConnectionStatus(ConnectionStatusEvent::new(friend, status))
            }
            RawNotification::AvatarInfo { friend, format, hash } => {
                Event::AvatarInfo(AvatarInfoEvent::new(friend, format, hash))
            }
            RawNotification::AvatarData { friend, format, hash, data } => {
                Event::AvatarData(AvatarDataEvent::new(friend, format, hash, data))
            }
            RawNotification::GroupInvite { friend, group_type, data } => {
                Event::GroupInvite(GroupInviteEvent::new(friend, group_type, data))
            }
            RawNotification::GroupMessage { group, peer, message } => {
                Event::GroupMessage(GroupMessageEvent::new(group, peer, message))
            }
            RawNotification::GroupAction { group, peer, action } => {
                Event::GroupAction(GroupActionEvent::new(group, peer, action))
            }
            RawNotification::GroupNamelistChange { group, peer, change } => {
                Event::GroupNamelistChange(GroupNamelistChangeEvent::new(group, peer, change))
            }
        }
    }
}

/// A concrete event record that listeners can register for
pub trait EventPayload: Sized + Send + Sync + 'static {
    const KIND: EventKind;

    /// Borrow the record out of an event of this kind
    fn from_event(event: &Event) -> Option<&Self>;

    fn into_event(self) -> Event;
}

macro_rules! event_payload {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl EventPayload for $ty {
                const KIND: EventKind = EventKind::$variant;

                fn from_event(event: &Event) -> Option<&Self> {
                    match event {
                        Event::$variant(e) => Some(e),
                        _ => None,
                    }
                }

                fn into_event(self) -> Event {
                    Event::$variant(self)
                }
            }

            impl From<$ty> for Event {
                fn from(e: $ty) -> Self {
                    Event::$variant(e)
                }
            }
        )*
    };
}

event_payload! {
    FriendRequestEvent => FriendRequest,
    FriendMessageEvent => FriendMessage,
    FriendActionEvent => FriendAction,
    NameChangeEvent => NameChange,
    StatusMessageEvent => StatusMessage,
    UserStatusEvent => UserStatus,
    TypingChangeEvent => TypingChange,
    ReadReceiptEvent => ReadReceipt,
    ConnectionStatusEvent => ConnectionStatus,
    AvatarInfoEvent => AvatarInfo,
    AvatarDataEvent => AvatarData,
    GroupInviteEvent => GroupInvite,
    GroupMessageEvent => GroupMessage,
    GroupActionEvent => GroupAction,
    GroupNamelistChangeEvent => GroupNamelistChange,
}
