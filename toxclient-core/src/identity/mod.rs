//! Identity & key store
//!
//! Local keypair, friend address and content hashing. All types here are
//! plain values: reading them never touches the engine.

mod hash;
mod keys;

pub use hash::{content_hash, ContentHash, HashInput, HASH_SIZE};
pub use keys::{
    Address, Keys, PublicKey, SecretKey, ADDRESS_SIZE, CHECKSUM_SIZE, NOSPAM_SIZE,
    PUBLIC_KEY_SIZE, SECRET_KEY_SIZE,
};
