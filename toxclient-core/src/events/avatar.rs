//! Avatar events

use serde::{Deserialize, Serialize};

/// Avatar image format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvatarFormat {
    /// No avatar set
    None,
    Png,
}

impl AvatarFormat {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(AvatarFormat::None),
            1 => Some(AvatarFormat::Png),
            _ => None,
        }
    }
}

/// A friend announced the hash of their current avatar
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarInfoEvent {
    friend: u32,
    format: u8,
    hash: Vec<u8>,
}

impl AvatarInfoEvent {
    pub fn new(friend: u32, format: u8, hash: Vec<u8>) -> Self {
        Self {
            friend,
            format,
            hash,
        }
    }

    pub fn friend(&self) -> u32 {
        self.friend
    }

    /// Raw format code
    pub fn format(&self) -> u8 {
        self.format
    }

    pub fn avatar_format(&self) -> Option<AvatarFormat> {
        AvatarFormat::from_code(self.format)
    }

    pub fn hash(&self) -> &[u8] {
        &self.hash
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(&self.hash)
    }

    /// False exactly when the format code is 0 (no avatar)
    pub fn is_valid(&self) -> bool {
        self.format != 0
    }
}

/// A friend sent their avatar image
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarDataEvent {
    friend: u32,
    format: u8,
    hash: Vec<u8>,
    data: Vec<u8>,
}

impl AvatarDataEvent {
    pub fn new(friend: u32, format: u8, hash: Vec<u8>, data: Vec<u8>) -> Self {
        Self {
            friend,
            format,
            hash,
            data,
        }
    }

    pub fn friend(&self) -> u32 {
        self.friend
    }

    pub fn format(&self) -> u8 {
        self.format
    }

    pub fn avatar_format(&self) -> Option<AvatarFormat> {
        AvatarFormat::from_code(self.format)
    }

    pub fn hash(&self) -> &[u8] {
        &self.hash
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(&self.hash)
    }

    /// Image bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_valid(&self) -> bool {
        self.format != 0
    }
}
