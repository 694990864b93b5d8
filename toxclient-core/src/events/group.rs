//! Groupchat events

use serde::{Deserialize, Serialize};

/// Kind of groupchat an invite is for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupchatType {
    Text,
    Av,
}

impl GroupchatType {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(GroupchatType::Text),
            1 => Some(GroupchatType::Av),
            _ => None,
        }
    }
}

/// A friend invited us into a groupchat
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInviteEvent {
    friend: u32,
    group_type: u8,
    data: Vec<u8>,
}

impl GroupInviteEvent {
    pub fn new(friend: u32, group_type: u8, data: Vec<u8>) -> Self {
        Self {
            friend,
            group_type,
            data,
        }
    }

    pub fn friend(&self) -> u32 {
        self.friend
    }

    /// Raw groupchat type code
    pub fn group_type(&self) -> u8 {
        self.group_type
    }

    pub fn groupchat_type(&self) -> Option<GroupchatType> {
        GroupchatType::from_code(self.group_type)
    }

    /// Payload needed to accept the invite
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMessageEvent {
    group: u32,
    peer: u32,
    message: String,
}

impl GroupMessageEvent {
    pub fn new(group: u32, peer: u32, message: impl Into<String>) -> Self {
        Self {
            group,
            peer,
            message: message.into(),
        }
    }

    pub fn group(&self) -> u32 {
        self.group
    }

    pub fn peer(&self) -> u32 {
        self.peer
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupActionEvent {
    group: u32,
    peer: u32,
    action: String,
}

impl GroupActionEvent {
    pub fn new(group: u32, peer: u32, action: impl Into<String>) -> Self {
        Self {
            group,
            peer,
            action: action.into(),
        }
    }

    pub fn group(&self) -> u32 {
        self.group
    }

    pub fn peer(&self) -> u32 {
        self.peer
    }

    pub fn action(&self) -> &str {
        &self.action
    }
}

/// What changed in a groupchat's peer list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NamelistChange {
    PeerAdded,
    PeerRemoved,
    PeerRenamed,
}

impl NamelistChange {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(NamelistChange::PeerAdded),
            1 => Some(NamelistChange::PeerRemoved),
            2 => Some(NamelistChange::PeerRenamed),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupNamelistChangeEvent {
    group: u32,
    peer: u32,
    change: u8,
}

impl GroupNamelistChangeEvent {
    pub fn new(group: u32, peer: u32, change: u8) -> Self {
        Self {
            group,
            peer,
            change,
        }
    }

    pub fn group(&self) -> u32 {
        self.group
    }

    pub fn peer(&self) -> u32 {
        self.peer
    }

    /// Raw change code
    pub fn change(&self) -> u8 {
        self.change
    }

    pub fn namelist_change(&self) -> Option<NamelistChange> {
        NamelistChange::from_code(self.change)
    }
}
