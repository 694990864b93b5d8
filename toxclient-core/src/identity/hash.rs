//! Content hashing
//!
//! SHA-256 over raw bytes. Text is hashed as its UTF-8 encoding, so
//! `hash("abc")` and `hash(b"abc")` are byte-identical.

use sha2::{Digest, Sha256};
use std::fmt;

/// Digest length in bytes
pub const HASH_SIZE: usize = 32;

/// Input accepted by the hashing operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HashInput {
    Bytes(Vec<u8>),
    Text(String),
}

impl HashInput {
    /// Bytes actually fed to the digest
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            HashInput::Bytes(b) => b,
            HashInput::Text(s) => s.as_bytes(),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            HashInput::Bytes(b) => b,
            HashInput::Text(s) => s.into_bytes(),
        }
    }
}

impl From<Vec<u8>> for HashInput {
    fn from(b: Vec<u8>) -> Self {
        HashInput::Bytes(b)
    }
}

impl From<&[u8]> for HashInput {
    fn from(b: &[u8]) -> Self {
        HashInput::Bytes(b.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for HashInput {
    fn from(b: &[u8; N]) -> Self {
        HashInput::Bytes(b.to_vec())
    }
}

impl From<String> for HashInput {
    fn from(s: String) -> Self {
        HashInput::Text(s)
    }
}

impl From<&str> for HashInput {
    fn from(s: &str) -> Self {
        HashInput::Text(s.to_string())
    }
}

/// A content hash
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; HASH_SIZE]);

impl ContentHash {
    pub fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
        ContentHash(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.to_hex())
    }
}

/// Hash arbitrary bytes
pub fn content_hash(data: &[u8]) -> ContentHash {
    let digest = Sha256::digest(data);
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(&digest);
    ContentHash(out)
}
