//! Chain addresses
//!
//! An [`Address`] is the raw 20-byte hash of a public key (or of a composite
//! key). It is only ever rendered through the checksummed codec in
//! [`codec`]; a value of any other length renders as the empty string.

pub mod codec;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::crypto::ADDRESS_LEN;

pub use codec::{
    decode, encode, is_valid, AddressError, ADDRESS_PREFIX, ADDRESS_TEXT_PREFIX, ADDRESS_VERSION,
};

/// Raw address bytes
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(Vec<u8>);

impl Address {
    /// Wrap raw bytes; the length is checked when rendering
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The empty address (a missing sender or recipient)
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Render through the codec, failing unless exactly 20 bytes
    pub fn encode(&self) -> Result<String, AddressError> {
        encode(&self.0)
    }

    /// Decode an address string, returning the address and its version byte
    pub fn decode(s: &str) -> Result<(Self, u8), AddressError> {
        let (raw, version) = decode(s)?;
        Ok((Self::from(raw), version))
    }

    /// Whether the payload has the 20 bytes an address string needs
    ///
    /// Length only; use [`is_valid`] to check an encoded string.
    pub fn has_valid_length(&self) -> bool {
        self.0.len() == ADDRESS_LEN
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(raw: [u8; ADDRESS_LEN]) -> Self {
        Self(raw.to_vec())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode().unwrap_or_default())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", hex::encode_upper(&self.0))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s).map(|(addr, _)| addr)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.trim().is_empty() {
            return Ok(Self::empty());
        }
        s.parse().map_err(serde::de::Error::custom)
    }
}
