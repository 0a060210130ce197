//! Cryptographic utilities
//!
//! This module provides:
//! - SHA-256, double SHA-256 and `RIPEMD160(SHA256(x))` hashing
//! - ECDSA key management (secp256k1) with deterministic signatures

pub mod hash;
pub mod keys;

pub use hash::{checksum, double_sha256, hash160, sha256, sha256_truncated, ADDRESS_LEN};
pub use keys::{
    bitcoin_address, sign_message, verify_signature, CompactSignature, KeyError, KeyPair,
    PublicKey, PRIVATE_KEY_LEN, PUBLIC_KEY_LEN, SIGNATURE_LEN,
};
