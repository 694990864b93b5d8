//! Key and address types
//!
//! Raw byte containers for the local identity. Every hex view is computed
//! from the raw bytes on demand; nothing here caches a string form.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{ClientError, ClientResult};

/// Public key length in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Secret key length in bytes
pub const SECRET_KEY_SIZE: usize = 32;

/// Nospam length in bytes
pub const NOSPAM_SIZE: usize = 4;

/// Address checksum length in bytes
pub const CHECKSUM_SIZE: usize = 2;

/// Friend address length: public key + nospam + checksum
pub const ADDRESS_SIZE: usize = PUBLIC_KEY_SIZE + NOSPAM_SIZE + CHECKSUM_SIZE;

fn decode_fixed<const N: usize>(what: &str, s: &str) -> ClientResult<[u8; N]> {
    let bytes = hex::decode(s)
        .map_err(|e| ClientError::InvalidArgument(format!("{} is not valid hex: {}", what, e)))?;
    bytes.as_slice().try_into().map_err(|_| {
        ClientError::InvalidArgument(format!(
            "{} must be {} bytes, got {}",
            what,
            N,
            bytes.len()
        ))
    })
}

/// Long-term public key identifying a peer
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PublicKey([u8; PUBLIC_KEY_SIZE]);

impl PublicKey {
    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        PublicKey(bytes)
    }

    /// Build from a slice, rejecting any other length
    pub fn from_slice(bytes: &[u8]) -> ClientResult<Self> {
        let arr: [u8; PUBLIC_KEY_SIZE] = bytes.try_into().map_err(|_| {
            ClientError::InvalidArgument(format!(
                "public key must be {} bytes, got {}",
                PUBLIC_KEY_SIZE,
                bytes.len()
            ))
        })?;
        Ok(PublicKey(arr))
    }

    pub fn from_hex(s: &str) -> ClientResult<Self> {
        decode_fixed::<PUBLIC_KEY_SIZE>("public key", s).map(PublicKey)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Lowercase hex projection (64 chars)
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Long-term secret key. Zeroized on drop; never printed.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop, Serialize, Deserialize)]
pub struct SecretKey([u8; SECRET_KEY_SIZE]);

impl SecretKey {
    pub fn from_bytes(bytes: [u8; SECRET_KEY_SIZE]) -> Self {
        SecretKey(bytes)
    }

    pub fn from_hex(s: &str) -> ClientResult<Self> {
        decode_fixed::<SECRET_KEY_SIZE>("secret key", s).map(SecretKey)
    }

    pub fn as_bytes(&self) -> &[u8; SECRET_KEY_SIZE] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Lowercase hex projection (64 chars)
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Friend address handed out of band: public key, nospam and checksum
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(#[serde(with = "address_bytes")] [u8; ADDRESS_SIZE]);

impl Address {
    /// Assemble an address, computing its checksum
    pub fn new(public_key: &PublicKey, nospam: [u8; NOSPAM_SIZE]) -> Self {
        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes[..PUBLIC_KEY_SIZE].copy_from_slice(public_key.as_bytes());
        bytes[PUBLIC_KEY_SIZE..PUBLIC_KEY_SIZE + NOSPAM_SIZE].copy_from_slice(&nospam);
        let checksum = Self::checksum_of(&bytes[..PUBLIC_KEY_SIZE + NOSPAM_SIZE]);
        bytes[PUBLIC_KEY_SIZE + NOSPAM_SIZE..].copy_from_slice(&checksum);
        Address(bytes)
    }

    /// Parse raw bytes, verifying length and checksum
    pub fn from_slice(bytes: &[u8]) -> ClientResult<Self> {
        let arr: [u8; ADDRESS_SIZE] = bytes.try_into().map_err(|_| {
            ClientError::InvalidArgument(format!(
                "address must be {} bytes, got {}",
                ADDRESS_SIZE,
                bytes.len()
            ))
        })?;
        let address = Address(arr);
        if !address.checksum_valid() {
            return Err(ClientError::InvalidArgument(
                "address checksum mismatch".to_string(),
            ));
        }
        Ok(address)
    }

    pub fn from_hex(s: &str) -> ClientResult<Self> {
        let arr = decode_fixed::<ADDRESS_SIZE>("address", s)?;
        Self::from_slice(&arr)
    }

    /// XOR of the preceding bytes folded into two
    fn checksum_of(data: &[u8]) -> [u8; CHECKSUM_SIZE] {
        let mut checksum = [0u8; CHECKSUM_SIZE];
        for (i, b) in data.iter().enumerate() {
            checksum[i % CHECKSUM_SIZE] ^= b;
        }
        checksum
    }

    pub fn checksum_valid(&self) -> bool {
        let (body, checksum) = self.0.split_at(PUBLIC_KEY_SIZE + NOSPAM_SIZE);
        Self::checksum_of(body) == checksum
    }

    pub fn public_key(&self) -> PublicKey {
        let mut pk = [0u8; PUBLIC_KEY_SIZE];
        pk.copy_from_slice(&self.0[..PUBLIC_KEY_SIZE]);
        PublicKey(pk)
    }

    pub fn nospam(&self) -> [u8; NOSPAM_SIZE] {
        let mut nospam = [0u8; NOSPAM_SIZE];
        nospam.copy_from_slice(&self.0[PUBLIC_KEY_SIZE..PUBLIC_KEY_SIZE + NOSPAM_SIZE]);
        nospam
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Lowercase hex projection (76 chars)
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// serde only derives array impls up to 32 elements
mod address_bytes {
    use super::ADDRESS_SIZE;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; ADDRESS_SIZE], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_bytes(bytes)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; ADDRESS_SIZE], D::Error> {
        let v: Vec<u8> = Deserialize::deserialize(d)?;
        v.as_slice()
            .try_into()
            .map_err(|_| D::Error::invalid_length(v.len(), &"38 bytes"))
    }
}

/// The local keypair as read from the engine
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keys {
    public: PublicKey,
    secret: Option<SecretKey>,
}

impl Keys {
    pub fn new(public: PublicKey, secret: Option<SecretKey>) -> Self {
        Self { public, secret }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    pub fn public_key_hex(&self) -> String {
        self.public.to_hex()
    }

    /// The secret key, or `KeyUnavailable` when the engine holds none
    pub fn secret_key(&self) -> ClientResult<&SecretKey> {
        self.secret.as_ref().ok_or_else(|| {
            ClientError::KeyUnavailable("engine was configured without a secret key".to_string())
        })
    }

    pub fn secret_key_hex(&self) -> ClientResult<String> {
        self.secret_key().map(SecretKey::to_hex)
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// Drop the secret half, e.g. when only the public key was requested
    pub fn into_public_only(self) -> Self {
        Self {
            public: self.public,
            secret: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pk() -> PublicKey {
        let mut bytes = [0u8; PUBLIC_KEY_SIZE];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        PublicKey::from_bytes(bytes)
    }

    #[test]
    fn test_public_key_hex_is_lowercase_64() {
        let hex = PublicKey::from_bytes([0xAB; 32]).to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(hex, "ab".repeat(32));
    }

    #[test]
    fn test_public_key_from_slice_rejects_wrong_length() {
        let err = PublicKey::from_slice(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument(_)));
    }

    #[test]
    fn test_address_layout() {
        let pk = sample_pk();
        let address = Address::new(&pk, [9, 8, 7, 6]);

        assert_eq!(address.as_bytes().len(), ADDRESS_SIZE);
        assert_eq!(address.public_key(), pk);
        assert_eq!(address.nospam(), [9, 8, 7, 6]);
        assert!(address.checksum_valid());
        assert_eq!(address.to_hex().len(), 76);
    }

    #[test]
    fn test_address_checksum_detects_corruption() {
        let address = Address::new(&sample_pk(), [1, 2, 3, 4]);
        let mut bytes = address.to_vec();
        bytes[5] ^= 0xFF;

        let err = Address::from_slice(&bytes).unwrap_err();
        assert!(err.to_string().contains("checksum"));
    }

    #[test]
    fn test_address_hex_parse() {
        let address = Address::new(&sample_pk(), [0, 0, 0, 1]);
        let parsed = Address::from_hex(&address.to_hex()).unwrap();
        assert_eq!(parsed, address);

        assert!(Address::from_hex("zz").is_err());
        assert!(Address::from_hex(&"00".repeat(37)).is_err());
    }

    #[test]
    fn test_keys_without_secret() {
        let keys = Keys::new(sample_pk(), None);
        assert!(!keys.has_secret());
        assert!(matches!(
            keys.secret_key(),
            Err(ClientError::KeyUnavailable(_))
        ));
        assert_eq!(keys.public_key_hex().len(), 64);
    }

    #[test]
    fn test_secret_key_debug_is_redacted() {
        let sk = SecretKey::from_bytes([7; 32]);
        assert_eq!(format!("{:?}", sk), "SecretKey(<redacted>)");
        assert_eq!(sk.to_hex().len(), 64);
    }
}
