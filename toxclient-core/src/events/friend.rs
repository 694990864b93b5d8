//! Friend events

use serde::{Deserialize, Serialize};

use crate::identity::PublicKey;

/// Someone asked to become our friend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendRequestEvent {
    public_key: PublicKey,
    data: Vec<u8>,
}

impl FriendRequestEvent {
    pub fn new(public_key: PublicKey, data: Vec<u8>) -> Self {
        Self { public_key, data }
    }

    /// Requester's public key
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn public_key_hex(&self) -> String {
        self.public_key.to_hex()
    }

    /// Request payload (usually the greeting text)
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// A chat message from a friend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendMessageEvent {
    friend: u32,
    message: String,
}

impl FriendMessageEvent {
    pub fn new(friend: u32, message: impl Into<String>) -> Self {
        Self {
            friend,
            message: message.into(),
        }
    }

    pub fn friend(&self) -> u32 {
        self.friend
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// An emote-style message from a friend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendActionEvent {
    friend: u32,
    action: String,
}

impl FriendActionEvent {
    pub fn new(friend: u32, action: impl Into<String>) -> Self {
        Self {
            friend,
            action: action.into(),
        }
    }

    pub fn friend(&self) -> u32 {
        self.friend
    }

    pub fn action(&self) -> &str {
        &self.action
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameChangeEvent {
    friend: u32,
    name: String,
}

impl NameChangeEvent {
    pub fn new(friend: u32, name: impl Into<String>) -> Self {
        Self {
            friend,
            name: name.into(),
        }
    }

    pub fn friend(&self) -> u32 {
        self.friend
    }

    /// New display name
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessageEvent {
    friend: u32,
    status_message: String,
}

impl StatusMessageEvent {
    pub fn new(friend: u32, status_message: impl Into<String>) -> Self {
        Self {
            friend,
            status_message: status_message.into(),
        }
    }

    pub fn friend(&self) -> u32 {
        self.friend
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }
}

/// Presence status a friend can advertise
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserStatus {
    None,
    Away,
    Busy,
}

impl UserStatus {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(UserStatus::None),
            1 => Some(UserStatus::Away),
            2 => Some(UserStatus::Busy),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            UserStatus::None => 0,
            UserStatus::Away => 1,
            UserStatus::Busy => 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatusEvent {
    friend: u32,
    status: u8,
}

impl UserStatusEvent {
    pub fn new(friend: u32, status: u8) -> Self {
        Self { friend, status }
    }

    pub fn friend(&self) -> u32 {
        self.friend
    }

    /// Raw status code
    pub fn status(&self) -> u8 {
        self.status
    }

    /// Typed status, `None` for codes this client does not know
    pub fn user_status(&self) -> Option<UserStatus> {
        UserStatus::from_code(self.status)
    }
}

/// Typing flag normalized from the forms an engine may report
///
/// Only `true` and the number `1` mean typing; `false`, `0` and every
/// other number mean not typing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Typing(bool);

impl Typing {
    pub fn is_typing(&self) -> bool {
        self.0
    }
}

impl From<bool> for Typing {
    fn from(v: bool) -> Self {
        Typing(v)
    }
}

macro_rules! typing_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Typing {
                fn from(v: $t) -> Self {
                    Typing(v == 1)
                }
            }
        )*
    };
}

typing_from_int!(u8, u32, i32, i64);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingChangeEvent {
    friend: u32,
    typing: bool,
}

impl TypingChangeEvent {
    pub fn new(friend: u32, typing: impl Into<Typing>) -> Self {
        Self {
            friend,
            typing: typing.into().is_typing(),
        }
    }

    pub fn friend(&self) -> u32 {
        self.friend
    }

    pub fn typing(&self) -> bool {
        self.typing
    }
}

/// A friend confirmed receipt of one of our messages
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadReceiptEvent {
    friend: u32,
    receipt: u32,
}

impl ReadReceiptEvent {
    pub fn new(friend: u32, receipt: u32) -> Self {
        Self { friend, receipt }
    }

    pub fn friend(&self) -> u32 {
        self.friend
    }

    /// Receipt id returned when the message was sent
    pub fn receipt(&self) -> u32 {
        self.receipt
    }
}

/// Status code reported when a friend comes online
pub const CONNECTION_ONLINE: u8 = 1;

/// A friend went online or offline
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatusEvent {
    friend: u32,
    status: u8,
}

impl ConnectionStatusEvent {
    pub fn new(friend: u32, status: u8) -> Self {
        Self { friend, status }
    }

    pub fn friend(&self) -> u32 {
        self.friend
    }

    /// Raw status code (0 offline, 1 online)
    pub fn status(&self) -> u8 {
        self.status
    }

    pub fn status_str(&self) -> &'static str {
        if self.is_connected() {
            "online"
        } else {
            "offline"
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status == CONNECTION_ONLINE
    }
}
