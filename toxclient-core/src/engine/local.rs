//! In-memory reference engine
//!
//! Implements the full request set against local tables, with no network
//! underneath. Notifications only arrive through [`LocalEngine::inject`],
//! which stands in for traffic from remote peers.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, trace};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};

use super::{
    EngineError, EngineFactory, EngineOptions, EngineRequest, EngineResponse, NetworkEngine,
    NotificationSink, RawNotification,
};
use crate::events::EventKind;
use crate::identity::{content_hash, Address, Keys, PublicKey, SecretKey, NOSPAM_SIZE};

/// Longest accepted display name, in bytes
pub const MAX_NAME_LENGTH: usize = 128;

/// Longest accepted status message, in bytes
pub const MAX_STATUS_MESSAGE_LENGTH: usize = 1007;

/// Longest accepted friend request message, in bytes
pub const MAX_FRIEND_REQUEST_LENGTH: usize = 1016;

/// Longest accepted chat message or action, in bytes
pub const MAX_MESSAGE_LENGTH: usize = 1372;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FriendRecord {
    public_key: PublicKey,
    /// Request message we sent, absent for friends added without request
    request_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GroupRecord {
    group_type: u8,
}

/// The part of the engine that would be written to a savefile
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistentState {
    public_key: PublicKey,
    secret_key: Option<SecretKey>,
    nospam: [u8; NOSPAM_SIZE],
    name: String,
    status_message: String,
    friends: BTreeMap<u32, FriendRecord>,
    groups: BTreeMap<u32, GroupRecord>,
}

struct Inner {
    state: PersistentState,
    subscribers: HashMap<EventKind, Vec<NotificationSink>>,
    next_receipt: u32,
    destroyed: bool,
}

/// Lowest number not present in `table`
fn free_number<V>(table: &BTreeMap<u32, V>) -> u32 {
    let mut candidate = 0;
    for &used in table.keys() {
        if used != candidate {
            break;
        }
        candidate += 1;
    }
    candidate
}

fn check_len(what: &str, value: &str, max: usize) -> Result<(), EngineError> {
    if value.len() > max {
        return Err(EngineError::InvalidArgument(format!(
            "{} is {} bytes, limit is {}",
            what,
            value.len(),
            max
        )));
    }
    Ok(())
}

/// In-memory engine
pub struct LocalEngine {
    options: EngineOptions,
    inner: Mutex<Inner>,
}

impl LocalEngine {
    /// Create an engine with a freshly generated keypair
    pub fn new(options: &EngineOptions) -> Self {
        let secret_bytes: [u8; 32] = rand::random();
        Self::with_secret_key(options, SecretKey::from_bytes(secret_bytes))
    }

    /// Create an engine from an existing secret key
    pub fn with_secret_key(options: &EngineOptions, secret_key: SecretKey) -> Self {
        let secret = StaticSecret::from(*secret_key.as_bytes());
        let public = PublicKey::from_bytes(X25519PublicKey::from(&secret).to_bytes());
        Self::build(options, public, Some(secret_key))
    }

    /// Create an engine that only knows its public key
    pub fn public_only(options: &EngineOptions, public_key: PublicKey) -> Self {
        Self::build(options, public_key, None)
    }

    fn build(options: &EngineOptions, public_key: PublicKey, secret_key: Option<SecretKey>) -> Self {
        let nospam: [u8; NOSPAM_SIZE] = rand::random();
        info!(
            public_key = %public_key,
            ipv6 = options.enable_ipv6,
            udp = options.enable_udp,
            proxy = ?options.proxy.as_ref().map(|p| p.to_string()),
            "Local engine created"
        );
        Self {
            options: options.clone(),
            inner: Mutex::new(Inner {
                state: PersistentState {
                    public_key,
                    secret_key,
                    nospam,
                    name: String::new(),
                    status_message: String::new(),
                    friends: BTreeMap::new(),
                    groups: BTreeMap::new(),
                },
                subscribers: HashMap::new(),
                next_receipt: 1,
                destroyed: false,
            }),
        }
    }

    /// Options the engine was created with
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Every mutation is a single map/field update, so a panicked holder
        // cannot leave the tables half-written.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver a notification to every sink subscribed to its kind, as if
    /// it arrived from the network. Returns the number of sinks reached.
    pub fn inject(&self, notification: RawNotification) -> usize {
        let mut inner = self.lock();
        if inner.destroyed {
            return 0;
        }
        let kind = notification.kind();
        let Some(sinks) = inner.subscribers.get_mut(&kind) else {
            trace!(?kind, "No subscriber for notification");
            return 0;
        };
        sinks.retain(|sink| !sink.is_closed());
        let mut delivered = 0;
        for sink in sinks.iter() {
            if sink.send(notification.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    /// Remove a friend on behalf of the network (no client call involved)
    pub fn remove_friend_remote(&self, friend: u32) -> Result<(), EngineError> {
        let mut inner = self.lock();
        if inner.destroyed {
            return Err(EngineError::Destroyed);
        }
        inner
            .state
            .friends
            .remove(&friend)
            .map(|_| ())
            .ok_or_else(|| EngineError::NotFound(format!("friend {}", friend)))
    }

    pub fn is_destroyed(&self) -> bool {
        self.lock().destroyed
    }

    fn handle(inner: &mut Inner, request: EngineRequest) -> Result<EngineResponse, EngineError> {
        let state = &mut inner.state;
        match request {
            EngineRequest::GetAddress => Ok(EngineResponse::Address(Address::new(
                &state.public_key,
                state.nospam,
            ))),

            EngineRequest::GetKeys => Ok(EngineResponse::Keys(Keys::new(
                state.public_key,
                state.secret_key.clone(),
            ))),

            EngineRequest::AddFriend { address, message } => {
                if !address.checksum_valid() {
                    return Err(EngineError::InvalidArgument("bad address checksum".into()));
                }
                if message.is_empty() {
                    return Err(EngineError::InvalidArgument("empty request message".into()));
                }
                check_len("request message", &message, MAX_FRIEND_REQUEST_LENGTH)?;
                let public_key = address.public_key();
                if public_key == state.public_key {
                    return Err(EngineError::InvalidArgument("cannot add own address".into()));
                }
                if state.friends.values().any(|f| f.public_key == public_key) {
                    return Err(EngineError::InvalidArgument("friend already added".into()));
                }
                let friend = free_number(&state.friends);
                state.friends.insert(
                    friend,
                    FriendRecord {
                        public_key,
                        request_message: Some(message),
                    },
                );
                Ok(EngineResponse::FriendNumber(friend))
            }

            EngineRequest::AddFriendNoRequest { public_key } => {
                if public_key == state.public_key {
                    return Err(EngineError::InvalidArgument("cannot add own key".into()));
                }
                if let Some((&n, _)) = state.friends.iter().find(|(_, f)| f.public_key == public_key) {
                    return Ok(EngineResponse::FriendNumber(n));
                }
                let friend = free_number(&state.friends);
                state.friends.insert(
                    friend,
                    FriendRecord {
                        public_key,
                        request_message: None,
                    },
                );
                Ok(EngineResponse::FriendNumber(friend))
            }

            EngineRequest::DeleteFriend { friend } => state
                .friends
                .remove(&friend)
                .map(|_| EngineResponse::Done)
                .ok_or_else(|| EngineError::NotFound(format!("friend {}", friend))),

            EngineRequest::HasFriend { friend } => {
                Ok(EngineResponse::Bool(state.friends.contains_key(&friend)))
            }

            EngineRequest::CountFriendList => Ok(EngineResponse::Count(state.friends.len() as u32)),

            EngineRequest::GetFriendList => {
                Ok(EngineResponse::Numbers(state.friends.keys().copied().collect()))
            }

            EngineRequest::GetFriendPublicKey { friend } => state
                .friends
                .get(&friend)
                .map(|f| EngineResponse::PublicKey(f.public_key))
                .ok_or_else(|| EngineError::NotFound(format!("friend {}", friend))),

            EngineRequest::GetFriendNumber { public_key } => state
                .friends
                .iter()
                .find(|(_, f)| f.public_key == public_key)
                .map(|(&n, _)| EngineResponse::FriendNumber(n))
                .ok_or_else(|| EngineError::NotFound(format!("friend with key {}", public_key))),

            EngineRequest::SendMessage { friend, message: text }
            | EngineRequest::SendAction { friend, action: text } => {
                if !state.friends.contains_key(&friend) {
                    return Err(EngineError::NotFound(format!("friend {}", friend)));
                }
                if text.is_empty() {
                    return Err(EngineError::InvalidArgument("empty message".into()));
                }
                check_len("message", &text, MAX_MESSAGE_LENGTH)?;
                let receipt = inner.next_receipt;
                inner.next_receipt = inner.next_receipt.wrapping_add(1).max(1);
                Ok(EngineResponse::Receipt(receipt))
            }

            EngineRequest::SetName { name } => {
                check_len("name", &name, MAX_NAME_LENGTH)?;
                state.name = name;
                Ok(EngineResponse::Done)
            }

            EngineRequest::GetName => Ok(EngineResponse::Text(state.name.clone())),

            EngineRequest::SetStatusMessage { message } => {
                check_len("status message", &message, MAX_STATUS_MESSAGE_LENGTH)?;
                state.status_message = message;
                Ok(EngineResponse::Done)
            }

            EngineRequest::GetStatusMessage => Ok(EngineResponse::Text(state.status_message.clone())),

            EngineRequest::AddGroupchat => {
                let group = free_number(&state.groups);
                state.groups.insert(group, GroupRecord { group_type: 0 });
                Ok(EngineResponse::GroupNumber(group))
            }

            EngineRequest::DeleteGroupchat { group } => state
                .groups
                .remove(&group)
                .map(|_| EngineResponse::Done)
                .ok_or_else(|| EngineError::NotFound(format!("groupchat {}", group))),

            EngineRequest::CountChatlist => Ok(EngineResponse::Count(state.groups.len() as u32)),

            EngineRequest::GetChatlist => {
                Ok(EngineResponse::Numbers(state.groups.keys().copied().collect()))
            }

            EngineRequest::Hash { data } => Ok(EngineResponse::Hash(content_hash(&data))),

            EngineRequest::Size => bincode::serialize(&*state)
                .map(|bytes| EngineResponse::Size(bytes.len()))
                .map_err(|e| EngineError::Failure(format!("failed to encode state: {}", e))),
        }
    }
}

impl NetworkEngine for LocalEngine {
    fn invoke(&self, request: EngineRequest) -> Result<EngineResponse, EngineError> {
        let mut inner = self.lock();
        if inner.destroyed {
            return Err(EngineError::Destroyed);
        }
        trace!(op = request.name(), "Local engine invoke");
        Self::handle(&mut inner, request)
    }

    fn subscribe(&self, kind: EventKind, sink: NotificationSink) -> Result<(), EngineError> {
        let mut inner = self.lock();
        if inner.destroyed {
            return Err(EngineError::Destroyed);
        }
        inner.subscribers.entry(kind).or_default().push(sink);
        Ok(())
    }

    fn destroy(&self) {
        let mut inner = self.lock();
        inner.destroyed = true;
        // Dropping the sinks ends every delivery loop fed by this engine
        inner.subscribers.clear();
        debug!("Local engine destroyed");
    }
}

/// Factory producing [`LocalEngine`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalEngineFactory;

impl EngineFactory for LocalEngineFactory {
    fn create(&self, options: &EngineOptions) -> Result<Arc<dyn NetworkEngine>, EngineError> {
        Ok(Arc::new(LocalEngine::new(options)))
    }
}
