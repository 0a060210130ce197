//! ECDSA key management
//!
//! Wraps a secp256k1 secret scalar, derives its compressed public key and
//! chain address, and produces deterministic (RFC 6979) signatures over
//! the SHA-256 digest of a message.

use std::fmt;
use std::str::FromStr;

use rand::rngs::OsRng;
use secp256k1::ecdsa::Signature;
use secp256k1::{Message, Secp256k1, SecretKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::hash::{checksum, hash160, sha256};
use crate::address::Address;

/// Length of a raw private key
pub const PRIVATE_KEY_LEN: usize = 32;
/// Length of a compressed public key
pub const PUBLIC_KEY_LEN: usize = 33;
/// Length of a compact `R || S` signature
pub const SIGNATURE_LEN: usize = 64;

/// A compact 64-byte ECDSA signature
pub type CompactSignature = [u8; SIGNATURE_LEN];

/// Errors that can occur during key operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Invalid hex encoding")]
    InvalidHex,
}

/// A compressed secp256k1 public key
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey(secp256k1::PublicKey);

impl PublicKey {
    /// Parse a 33-byte compressed point
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != PUBLIC_KEY_LEN {
            return Err(KeyError::InvalidKeyLength {
                expected: PUBLIC_KEY_LEN,
                got: bytes.len(),
            });
        }
        secp256k1::PublicKey::from_slice(bytes)
            .map(Self)
            .map_err(|_| KeyError::InvalidPublicKey)
    }

    /// Parse a public key from hex string
    pub fn from_hex(hex_key: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_key).map_err(|_| KeyError::InvalidHex)?;
        Self::from_slice(&bytes)
    }

    /// Compressed point encoding
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LEN] {
        self.0.serialize()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Chain address: `RIPEMD160(SHA256(compressed key))`
    pub fn address(&self) -> Address {
        Address::from(hash160(&self.to_bytes()))
    }

    /// Verify a compact signature over `message` made by this key
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        verify_signature(self, message, signature)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A private key together with its derived public key
///
/// The secret scalar never leaves this struct: there is no accessor that
/// returns it and `Debug` only shows the public half.
#[derive(Clone)]
pub struct KeyPair {
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key: PublicKey(public_key),
        }
    }

    /// Create a key pair from exactly 32 raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != PRIVATE_KEY_LEN {
            return Err(KeyError::InvalidKeyLength {
                expected: PRIVATE_KEY_LEN,
                got: bytes.len(),
            });
        }
        let secret_key = SecretKey::from_slice(bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Create a key pair from a hex-encoded private key
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_key.trim()).map_err(|_| KeyError::InvalidHex)?;
        Self::from_bytes(&bytes)
    }

    fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::signing_only();
        let public_key = secp256k1::PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key: PublicKey(public_key),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    /// Get the public key as a hex string (compressed format)
    pub fn public_key_hex(&self) -> String {
        self.public_key.to_hex()
    }

    /// Chain address derived from the public key
    pub fn address(&self) -> Address {
        self.public_key.address()
    }

    /// Sign `message` (hashed with SHA-256 first)
    pub fn sign(&self, message: &[u8]) -> CompactSignature {
        sign_message(&self.secret_key, message)
    }

    /// Verify a signature against this key pair's public key
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        verify_signature(&self.public_key, message, signature)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Sign the SHA-256 digest of `message`
///
/// The nonce is derived per RFC 6979 and the result is low-S normalized,
/// so the same key and message always give the same 64 bytes.
pub fn sign_message(secret_key: &SecretKey, message: &[u8]) -> CompactSignature {
    let secp = Secp256k1::signing_only();
    let digest = Message::from_digest(sha256(message));
    secp.sign_ecdsa(&digest, secret_key).serialize_compact()
}

/// Verify a compact signature over the SHA-256 digest of `message`
///
/// Malformed or high-S signatures verify as false.
pub fn verify_signature(public_key: &PublicKey, message: &[u8], signature: &[u8]) -> bool {
    if signature.len() != SIGNATURE_LEN {
        return false;
    }
    let sig = match Signature::from_compact(signature) {
        Ok(sig) => sig,
        Err(_) => return false,
    };
    let secp = Secp256k1::verification_only();
    let digest = Message::from_digest(sha256(message));
    secp.verify_ecdsa(&digest, &sig, &public_key.0).is_ok()
}

/// Generic Bitcoin P2PKH address: `Base58Check(0x00 || RIPEMD160(SHA256(pubkey)))`
pub fn bitcoin_address(public_key: &PublicKey) -> String {
    let mut address_bytes = vec![0x00];
    address_bytes.extend_from_slice(&hash160(&public_key.to_bytes()));
    let check = checksum(&address_bytes);
    address_bytes.extend_from_slice(&check);
    bs58::encode(address_bytes).into_string()
}
