//! Engine requests and responses
//!
//! One closed request enum carries every operation the client can issue.
//! Blocking and non-blocking dispatch build the same request and hand it
//! to [`NetworkEngine::invoke`](super::NetworkEngine::invoke).

use crate::identity::{Address, ContentHash, Keys, PublicKey};

/// Mutable resource an operation reads or writes
///
/// Non-blocking operations on the same resource complete in issuance order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    /// Friend table, including every friend-number in it
    Friends,
    /// Groupchat table, including every group-number in it
    Groups,
    /// Own name and status message
    Profile,
}

/// A single engine operation
#[derive(Debug, Clone)]
pub enum EngineRequest {
    GetAddress,
    GetKeys,
    AddFriend { address: Address, message: String },
    AddFriendNoRequest { public_key: PublicKey },
    DeleteFriend { friend: u32 },
    HasFriend { friend: u32 },
    CountFriendList,
    GetFriendList,
    GetFriendPublicKey { friend: u32 },
    GetFriendNumber { public_key: PublicKey },
    SendMessage { friend: u32, message: String },
    SendAction { friend: u32, action: String },
    SetName { name: String },
    GetName,
    SetStatusMessage { message: String },
    GetStatusMessage,
    AddGroupchat,
    DeleteGroupchat { group: u32 },
    CountChatlist,
    GetChatlist,
    Hash { data: Vec<u8> },
    Size,
}

impl EngineRequest {
    /// Stable operation name used in logs and metrics
    pub fn name(&self) -> &'static str {
        match self {
            EngineRequest::GetAddress => "get_address",
            EngineRequest::GetKeys => "get_keys",
            EngineRequest::AddFriend { .. } => "add_friend",
            EngineRequest::AddFriendNoRequest { .. } => "add_friend_norequest",
            EngineRequest::DeleteFriend { .. } => "delete_friend",
            EngineRequest::HasFriend { .. } => "has_friend",
            EngineRequest::CountFriendList => "count_friend_list",
            EngineRequest::GetFriendList => "get_friend_list",
            EngineRequest::GetFriendPublicKey { .. } => "get_friend_public_key",
            EngineRequest::GetFriendNumber { .. } => "get_friend_number",
            EngineRequest::SendMessage { .. } => "send_message",
            EngineRequest::SendAction { .. } => "send_action",
            EngineRequest::SetName { .. } => "set_name",
            EngineRequest::GetName => "get_name",
            EngineRequest::SetStatusMessage { .. } => "set_status_message",
            EngineRequest::GetStatusMessage => "get_status_message",
            EngineRequest::AddGroupchat => "add_groupchat",
            EngineRequest::DeleteGroupchat { .. } => "delete_groupchat",
            EngineRequest::CountChatlist => "count_chatlist",
            EngineRequest::GetChatlist => "get_chatlist",
            EngineRequest::Hash { .. } => "hash",
            EngineRequest::Size => "size",
        }
    }

    /// Resource the request touches, if any
    pub fn resource(&self) -> Option<ResourceKey> {
        match self {
            EngineRequest::AddFriend { .. }
            | EngineRequest::AddFriendNoRequest { .. }
            | EngineRequest::DeleteFriend { .. }
            | EngineRequest::HasFriend { .. }
            | EngineRequest::CountFriendList
            | EngineRequest::GetFriendList
            | EngineRequest::GetFriendPublicKey { .. }
            | EngineRequest::GetFriendNumber { .. }
            | EngineRequest::SendMessage { .. }
            | EngineRequest::SendAction { .. } => Some(ResourceKey::Friends),

            EngineRequest::AddGroupchat
            | EngineRequest::DeleteGroupchat { .. }
            | EngineRequest::CountChatlist
            | EngineRequest::GetChatlist => Some(ResourceKey::Groups),

            EngineRequest::SetName { .. }
            | EngineRequest::GetName
            | EngineRequest::SetStatusMessage { .. }
            | EngineRequest::GetStatusMessage => Some(ResourceKey::Profile),

            EngineRequest::GetAddress
            | EngineRequest::GetKeys
            | EngineRequest::Hash { .. }
            | EngineRequest::Size => None,
        }
    }
}

/// Result payload of a successful engine call
#[derive(Debug, Clone)]
pub enum EngineResponse {
    Done,
    Address(Address),
    Keys(Keys),
    FriendNumber(u32),
    GroupNumber(u32),
    Bool(bool),
    Count(u32),
    Numbers(Vec<u32>),
    PublicKey(PublicKey),
    Receipt(u32),
    Text(String),
    Hash(ContentHash),
    Size(usize),
}

impl EngineResponse {
    /// Variant name, for mismatch diagnostics
    pub fn variant(&self) -> &'static str {
        match self {
            EngineResponse::Done => "Done",
            EngineResponse::Address(_) => "Address",
            EngineResponse::Keys(_) => "Keys",
            EngineResponse::FriendNumber(_) => "FriendNumber",
            EngineResponse::GroupNumber(_) => "GroupNumber",
            EngineResponse::Bool(_) => "Bool",
            EngineResponse::Count(_) => "Count",
            EngineResponse::Numbers(_) => "Numbers",
            EngineResponse::PublicKey(_) => "PublicKey",
            EngineResponse::Receipt(_) => "Receipt",
            EngineResponse::Text(_) => "Text",
            EngineResponse::Hash(_) => "Hash",
            EngineResponse::Size(_) => "Size",
        }
    }
}
