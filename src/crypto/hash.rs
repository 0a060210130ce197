//! Hashing primitives used for addresses and checksums
//!
//! Provides SHA-256, the Base58Check double hash, and the two-stage
//! `RIPEMD160(SHA256(x))` pipeline that turns a public key into a
//! 20-byte address payload.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Length of a raw address payload in bytes
pub const ADDRESS_LEN: usize = 20;

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Computes double SHA-256 hash (SHA-256 of SHA-256)
/// Used for Base58Check checksums
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// First four bytes of the double SHA-256 of `data`
pub fn checksum(data: &[u8]) -> [u8; 4] {
    let hash = double_sha256(data);
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Computes `RIPEMD160(SHA256(data))`, the Bitcoin-style address hash
pub fn hash160(data: &[u8]) -> [u8; ADDRESS_LEN] {
    let mut ripemd = Ripemd160::new();
    ripemd.update(sha256(data));
    ripemd.finalize().into()
}

/// SHA-256 truncated to the address length
///
/// Composite (threshold) keys derive their address this way.
pub fn sha256_truncated(data: &[u8]) -> [u8; ADDRESS_LEN] {
    let hash = sha256(data);
    let mut out = [0u8; ADDRESS_LEN];
    out.copy_from_slice(&hash[..ADDRESS_LEN]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let data = b"hello world";
        assert_eq!(
            hex::encode(sha256(data)),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_checksum_is_prefix_of_double_hash() {
        let data = b"hello world";
        let full = double_sha256(data);
        assert_eq!(checksum(data), full[..4]);
        assert_ne!(double_sha256(data), sha256(data));
    }

    #[test]
    fn test_hash160_of_empty_input() {
        // RIPEMD160(SHA256(""))
        assert_eq!(
            hex::encode(hash160(b"")),
            "b472a266d0bd89c13706a4132ccfb16f7c3b9fcb"
        );
    }

    #[test]
    fn test_sha256_truncated() {
        let data = b"hello world";
        assert_eq!(sha256_truncated(data), sha256(data)[..ADDRESS_LEN]);
    }
}
