//! Client operations
//!
//! Each operation is written once, generic over the [`Completion`]
//! strategy, and exposed twice: `name` returns a [`Pending`], `name_sync`
//! blocks and returns the result.

use super::Client;
use crate::dispatch::{unexpected, Completion, Deferred, Immediate, Operation, Pending};
use crate::engine::{
    EngineRequest, EngineResponse, MAX_FRIEND_REQUEST_LENGTH, MAX_MESSAGE_LENGTH, MAX_NAME_LENGTH,
    MAX_STATUS_MESSAGE_LENGTH,
};
use crate::error::{ClientError, ClientResult};
use crate::identity::{Address, ContentHash, HashInput, Keys, PublicKey, SecretKey};

macro_rules! decode {
    ($op:literal, $pat:pat => $out:expr) => {
        move |response| match response {
            $pat => Ok($out),
            other => Err(unexpected($op, &other)),
        }
    };
}

/// Generates the non-blocking and `_sync` entry points of an operation
macro_rules! dual_mode {
    ($(#[$doc:meta])* $name:ident / $sync:ident => $with:ident($($arg:ident: $ty:ty),*) -> $out:ty) => {
        $(#[$doc])*
        pub fn $name(&self, $($arg: $ty),*) -> Pending<$out> {
            self.$with::<Deferred>($($arg),*)
        }

        $(#[$doc])*
        ///
        /// Blocking form.
        pub fn $sync(&self, $($arg: $ty),*) -> ClientResult<$out> {
            self.$with::<Immediate>($($arg),*)
        }
    };
}

fn check_text(what: &str, text: &str, max: usize, allow_empty: bool) -> ClientResult<()> {
    if !allow_empty && text.is_empty() {
        return Err(ClientError::InvalidArgument(format!("{} is empty", what)));
    }
    if text.len() > max {
        return Err(ClientError::InvalidArgument(format!(
            "{} is {} bytes, limit is {}",
            what,
            text.len(),
            max
        )));
    }
    Ok(())
}

impl Client {
    fn execute<C: Completion, T: Send + 'static>(&self, op: Operation<T>) -> C::Output<T> {
        self.dispatcher().execute::<C, T>(op)
    }

    // Identity

    fn get_address_with<C: Completion>(&self) -> C::Output<Address> {
        self.execute::<C, _>(Operation::new(
            EngineRequest::GetAddress,
            decode!("get_address", EngineResponse::Address(a) => a),
        ))
    }

    fn get_address_hex_with<C: Completion>(&self) -> C::Output<String> {
        self.execute::<C, _>(Operation::new(
            EngineRequest::GetAddress,
            decode!("get_address", EngineResponse::Address(a) => a.to_hex()),
        ))
    }

    fn get_keys_with<C: Completion>(&self, include_secret: bool) -> C::Output<Keys> {
        self.execute::<C, _>(Operation::new(
            EngineRequest::GetKeys,
            decode!("get_keys", EngineResponse::Keys(k) => {
                if include_secret { k } else { k.into_public_only() }
            }),
        ))
    }

    fn get_public_key_with<C: Completion>(&self) -> C::Output<PublicKey> {
        self.execute::<C, _>(Operation::new(
            EngineRequest::GetKeys,
            decode!("get_public_key", EngineResponse::Keys(k) => *k.public_key()),
        ))
    }

    fn get_public_key_hex_with<C: Completion>(&self) -> C::Output<String> {
        self.execute::<C, _>(Operation::new(
            EngineRequest::GetKeys,
            decode!("get_public_key", EngineResponse::Keys(k) => k.public_key_hex()),
        ))
    }

    fn get_secret_key_with<C: Completion>(&self) -> C::Output<SecretKey> {
        self.execute::<C, _>(Operation::new(EngineRequest::GetKeys, |response| match response {
            EngineResponse::Keys(k) => k.secret_key().cloned(),
            other => Err(unexpected("get_secret_key", &other)),
        }))
    }

    fn get_secret_key_hex_with<C: Completion>(&self) -> C::Output<String> {
        self.execute::<C, _>(Operation::new(EngineRequest::GetKeys, |response| match response {
            EngineResponse::Keys(k) => k.secret_key_hex(),
            other => Err(unexpected("get_secret_key", &other)),
        }))
    }

    dual_mode! {
        /// Our 38-byte friend address (public key, nospam, checksum)
        get_address / get_address_sync => get_address_with() -> Address
    }

    dual_mode! {
        /// Our friend address as 76 lowercase hex characters
        get_address_hex / get_address_hex_sync => get_address_hex_with() -> String
    }

    dual_mode! {
        /// The local keypair; the secret half only when `include_secret` is
        /// set and the engine holds one
        get_keys / get_keys_sync => get_keys_with(include_secret: bool) -> Keys
    }

    dual_mode! {
        get_public_key / get_public_key_sync => get_public_key_with() -> PublicKey
    }

    dual_mode! {
        /// 64 lowercase hex characters
        get_public_key_hex / get_public_key_hex_sync => get_public_key_hex_with() -> String
    }

    dual_mode! {
        /// `KeyUnavailable` when the engine was created without a secret key
        get_secret_key / get_secret_key_sync => get_secret_key_with() -> SecretKey
    }

    dual_mode! {
        get_secret_key_hex / get_secret_key_hex_sync => get_secret_key_hex_with() -> String
    }

    fn hash_with<C: Completion>(&self, input: HashInput) -> C::Output<ContentHash> {
        self.execute::<C, _>(Operation::new(
            EngineRequest::Hash {
                data: input.into_bytes(),
            },
            decode!("hash", EngineResponse::Hash(h) => h),
        ))
    }

    /// SHA-256 of bytes or UTF-8 text
    pub fn hash(&self, input: impl Into<HashInput>) -> Pending<ContentHash> {
        self.hash_with::<Deferred>(input.into())
    }

    /// SHA-256 of bytes or UTF-8 text
    ///
    /// Blocking form.
    pub fn hash_sync(&self, input: impl Into<HashInput>) -> ClientResult<ContentHash> {
        self.hash_with::<Immediate>(input.into())
    }

    fn size_with<C: Completion>(&self) -> C::Output<usize> {
        self.execute::<C, _>(Operation::new(
            EngineRequest::Size,
            decode!("size", EngineResponse::Size(s) => s),
        ))
    }

    dual_mode! {
        /// Serialized size of the engine state, in bytes
        size / size_sync => size_with() -> usize
    }

    // Friends

    fn add_friend_with<C: Completion>(&self, address: &[u8], message: &str) -> C::Output<u32> {
        let request = Address::from_slice(address).and_then(|address| {
            check_text("request message", message, MAX_FRIEND_REQUEST_LENGTH, false)?;
            Ok(EngineRequest::AddFriend {
                address,
                message: message.to_string(),
            })
        });
        self.execute::<C, _>(Operation::validated(
            "add_friend",
            request,
            decode!("add_friend", EngineResponse::FriendNumber(n) => n),
        ))
    }

    fn add_friend_norequest_with<C: Completion>(&self, public_key: &PublicKey) -> C::Output<u32> {
        self.execute::<C, _>(Operation::new(
            EngineRequest::AddFriendNoRequest {
                public_key: *public_key,
            },
            decode!("add_friend_norequest", EngineResponse::FriendNumber(n) => n),
        ))
    }

    fn delete_friend_with<C: Completion>(&self, friend: u32) -> C::Output<()> {
        self.execute::<C, _>(Operation::new(
            EngineRequest::DeleteFriend { friend },
            decode!("delete_friend", EngineResponse::Done => ()),
        ))
    }

    fn has_friend_with<C: Completion>(&self, friend: u32) -> C::Output<bool> {
        self.execute::<C, _>(Operation::new(
            EngineRequest::HasFriend { friend },
            decode!("has_friend", EngineResponse::Bool(b) => b),
        ))
    }

    fn count_friend_list_with<C: Completion>(&self) -> C::Output<u32> {
        self.execute::<C, _>(Operation::new(
            EngineRequest::CountFriendList,
            decode!("count_friend_list", EngineResponse::Count(n) => n),
        ))
    }

    fn get_friend_list_with<C: Completion>(&self) -> C::Output<Vec<u32>> {
        self.execute::<C, _>(Operation::new(
            EngineRequest::GetFriendList,
            decode!("get_friend_list", EngineResponse::Numbers(list) => list),
        ))
    }

    fn get_friend_public_key_with<C: Completion>(&self, friend: u32) -> C::Output<PublicKey> {
        self.execute::<C, _>(Operation::new(
            EngineRequest::GetFriendPublicKey { friend },
            decode!("get_friend_public_key", EngineResponse::PublicKey(pk) => pk),
        ))
    }

    fn get_friend_number_with<C: Completion>(&self, public_key: &PublicKey) -> C::Output<u32> {
        self.execute::<C, _>(Operation::new(
            EngineRequest::GetFriendNumber {
                public_key: *public_key,
            },
            decode!("get_friend_number", EngineResponse::FriendNumber(n) => n),
        ))
    }

    fn send_message_with<C: Completion>(&self, friend: u32, message: &str) -> C::Output<u32> {
        let request = check_text("message", message, MAX_MESSAGE_LENGTH, false).map(|()| {
            EngineRequest::SendMessage {
                friend,
                message: message.to_string(),
            }
        });
        self.execute::<C, _>(Operation::validated(
            "send_message",
            request,
            decode!("send_message", EngineResponse::Receipt(r) => r),
        ))
    }

    fn send_action_with<C: Completion>(&self, friend: u32, action: &str) -> C::Output<u32> {
        let request = check_text("action", action, MAX_MESSAGE_LENGTH, false).map(|()| {
            EngineRequest::SendAction {
                friend,
                action: action.to_string(),
            }
        });
        self.execute::<C, _>(Operation::validated(
            "send_action",
            request,
            decode!("send_action", EngineResponse::Receipt(r) => r),
        ))
    }

    dual_mode! {
        /// Send a friend request to a 38-byte address
        ///
        /// `InvalidArgument` for a malformed address, our own address, or an
        /// empty message.
        add_friend / add_friend_sync => add_friend_with(address: &[u8], message: &str) -> u32
    }

    dual_mode! {
        /// Add a friend by public key without sending a request, e.g. to
        /// accept a [`FriendRequestEvent`](crate::events::FriendRequestEvent)
        add_friend_norequest / add_friend_norequest_sync
            => add_friend_norequest_with(public_key: &PublicKey) -> u32
    }

    dual_mode! {
        /// `NotFound` when `friend` is not in the friend list
        delete_friend / delete_friend_sync => delete_friend_with(friend: u32) -> ()
    }

    dual_mode! {
        has_friend / has_friend_sync => has_friend_with(friend: u32) -> bool
    }

    dual_mode! {
        count_friend_list / count_friend_list_sync => count_friend_list_with() -> u32
    }

    dual_mode! {
        /// Friend numbers in ascending order
        get_friend_list / get_friend_list_sync => get_friend_list_with() -> Vec<u32>
    }

    dual_mode! {
        get_friend_public_key / get_friend_public_key_sync
            => get_friend_public_key_with(friend: u32) -> PublicKey
    }

    dual_mode! {
        get_friend_number / get_friend_number_sync
            => get_friend_number_with(public_key: &PublicKey) -> u32
    }

    dual_mode! {
        /// Returns the receipt id a later
        /// [`ReadReceiptEvent`](crate::events::ReadReceiptEvent) refers to
        send_message / send_message_sync => send_message_with(friend: u32, message: &str) -> u32
    }

    dual_mode! {
        send_action / send_action_sync => send_action_with(friend: u32, action: &str) -> u32
    }

    // Profile

    fn set_name_with<C: Completion>(&self, name: &str) -> C::Output<()> {
        let request = check_text("name", name, MAX_NAME_LENGTH, true).map(|()| {
            EngineRequest::SetName {
                name: name.to_string(),
            }
        });
        self.execute::<C, _>(Operation::validated(
            "set_name",
            request,
            decode!("set_name", EngineResponse::Done => ()),
        ))
    }

    fn get_name_with<C: Completion>(&self) -> C::Output<String> {
        self.execute::<C, _>(Operation::new(
            EngineRequest::GetName,
            decode!("get_name", EngineResponse::Text(t) => t),
        ))
    }

    fn set_status_message_with<C: Completion>(&self, message: &str) -> C::Output<()> {
        let request = check_text("status message", message, MAX_STATUS_MESSAGE_LENGTH, true).map(
            |()| EngineRequest::SetStatusMessage {
                message: message.to_string(),
            },
        );
        self.execute::<C, _>(Operation::validated(
            "set_status_message",
            request,
            decode!("set_status_message", EngineResponse::Done => ()),
        ))
    }

    fn get_status_message_with<C: Completion>(&self) -> C::Output<String> {
        self.execute::<C, _>(Operation::new(
            EngineRequest::GetStatusMessage,
            decode!("get_status_message", EngineResponse::Text(t) => t),
        ))
    }

    dual_mode! {
        set_name / set_name_sync => set_name_with(name: &str) -> ()
    }

    dual_mode! {
        get_name / get_name_sync => get_name_with() -> String
    }

    dual_mode! {
        set_status_message / set_status_message_sync => set_status_message_with(message: &str) -> ()
    }

    dual_mode! {
        get_status_message / get_status_message_sync => get_status_message_with() -> String
    }

    // Groupchats

    fn add_groupchat_with<C: Completion>(&self) -> C::Output<u32> {
        self.execute::<C, _>(Operation::new(
            EngineRequest::AddGroupchat,
            decode!("add_groupchat", EngineResponse::GroupNumber(n) => n),
        ))
    }

    fn delete_groupchat_with<C: Completion>(&self, group: u32) -> C::Output<()> {
        self.execute::<C, _>(Operation::new(
            EngineRequest::DeleteGroupchat { group },
            decode!("delete_groupchat", EngineResponse::Done => ()),
        ))
    }

    fn count_chatlist_with<C: Completion>(&self) -> C::Output<u32> {
        self.execute::<C, _>(Operation::new(
            EngineRequest::CountChatlist,
            decode!("count_chatlist", EngineResponse::Count(n) => n),
        ))
    }

    fn get_chatlist_with<C: Completion>(&self) -> C::Output<Vec<u32>> {
        self.execute::<C, _>(Operation::new(
            EngineRequest::GetChatlist,
            decode!("get_chatlist", EngineResponse::Numbers(list) => list),
        ))
    }

    dual_mode! {
        /// Create a groupchat and return its number
        add_groupchat / add_groupchat_sync => add_groupchat_with() -> u32
    }

    dual_mode! {
        /// `NotFound` when `group` is not a current groupchat
        delete_groupchat / delete_groupchat_sync => delete_groupchat_with(group: u32) -> ()
    }

    dual_mode! {
        count_chatlist / count_chatlist_sync => count_chatlist_with() -> u32
    }

    dual_mode! {
        get_chatlist / get_chatlist_sync => get_chatlist_with() -> Vec<u32>
    }
}
