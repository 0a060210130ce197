//! Checksummed base-58 address codec
//!
//! Text form: `base58(prefix || payload || checksum)` where `prefix` is
//! [`ADDRESS_PREFIX`], `payload` is the 20-byte address and `checksum`
//! is the first four bytes of the double SHA-256 of `prefix || payload`.
//! The prefix bytes are chosen so that every encoded address starts with
//! the text [`ADDRESS_TEXT_PREFIX`].

use thiserror::Error;

use crate::crypto::{checksum, ADDRESS_LEN};

/// Version byte, the first byte of [`ADDRESS_PREFIX`]
pub const ADDRESS_VERSION: u8 = 0x02;

/// Raw prefix bytes prepended to every payload
pub const ADDRESS_PREFIX: [u8; 3] = [ADDRESS_VERSION, 0x10, 0x42];

/// Text every encoded address starts with
pub const ADDRESS_TEXT_PREFIX: &str = "HBC";

const CHECKSUM_LEN: usize = 4;

const ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Errors raised while encoding or decoding addresses
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Address is not prefixed with `{}`", ADDRESS_TEXT_PREFIX)]
    InvalidPrefix,
    #[error("Incorrect address length: expected {expected} bytes, got {got}")]
    IncorrectLength { expected: usize, got: usize },
    #[error("Address checksum mismatch")]
    ChecksumMismatch,
    #[error("Invalid base58 character {character:?} at index {index}")]
    InvalidCharacter { character: char, index: usize },
}

/// Encode a raw 20-byte address payload
pub fn encode(raw: &[u8]) -> Result<String, AddressError> {
    if raw.len() != ADDRESS_LEN {
        return Err(AddressError::IncorrectLength {
            expected: ADDRESS_LEN,
            got: raw.len(),
        });
    }

    let mut buf = Vec::with_capacity(ADDRESS_PREFIX.len() + ADDRESS_LEN + CHECKSUM_LEN);
    buf.extend_from_slice(&ADDRESS_PREFIX);
    buf.extend_from_slice(raw);
    let check = checksum(&buf);
    buf.extend_from_slice(&check);

    Ok(bs58::encode(buf).into_string())
}

/// Decode an address string into its payload and version byte
///
/// The checksum is verified before the payload length, so a corrupted
/// character anywhere after the text prefix reports a checksum mismatch.
pub fn decode(s: &str) -> Result<([u8; ADDRESS_LEN], u8), AddressError> {
    if !s.starts_with(ADDRESS_TEXT_PREFIX) {
        return Err(AddressError::InvalidPrefix);
    }

    if let Some((index, character)) = s.char_indices().find(|(_, c)| !ALPHABET.contains(*c)) {
        return Err(AddressError::InvalidCharacter { character, index });
    }

    let decoded = bs58::decode(s).into_vec().map_err(|err| match err {
        bs58::decode::Error::InvalidCharacter { character, index } => {
            AddressError::InvalidCharacter { character, index }
        }
        _ => AddressError::IncorrectLength {
            expected: ADDRESS_LEN,
            got: 0,
        },
    })?;

    let payload_len = decoded
        .len()
        .saturating_sub(ADDRESS_PREFIX.len() + CHECKSUM_LEN);
    if decoded.len() < CHECKSUM_LEN + 1 {
        return Err(AddressError::IncorrectLength {
            expected: ADDRESS_LEN,
            got: payload_len,
        });
    }

    let (body, check) = decoded.split_at(decoded.len() - CHECKSUM_LEN);
    if checksum(body) != check {
        return Err(AddressError::ChecksumMismatch);
    }

    if body.len() != ADDRESS_PREFIX.len() + ADDRESS_LEN {
        return Err(AddressError::IncorrectLength {
            expected: ADDRESS_LEN,
            got: payload_len,
        });
    }

    let (prefix, payload) = body.split_at(ADDRESS_PREFIX.len());
    if prefix != ADDRESS_PREFIX {
        return Err(AddressError::InvalidPrefix);
    }

    let mut raw = [0u8; ADDRESS_LEN];
    raw.copy_from_slice(payload);
    Ok((raw, prefix[0]))
}

/// True iff `s` decodes as an address
pub fn is_valid(s: &str) -> bool {
    decode(s).is_ok()
}
