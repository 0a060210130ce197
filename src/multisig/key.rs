//! Threshold composite keys
//!
//! A [`CompositeKey`] is an ordered list of member public keys plus a
//! threshold K. Member order is part of the key's identity: reordering the
//! members changes both the canonical encoding and the address.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::amino::{
    bytes_key, malformed, put_bytes, put_uvarint, varint_key, Reader, MULTISIG_THRESHOLD_PREFIX,
    SECP256K1_PUBKEY_PREFIX,
};
use super::signature::SignatureSet;
use crate::address::Address;
use crate::crypto::{sha256_truncated, KeyError, PublicKey, PUBLIC_KEY_LEN};

/// Errors related to multisig operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MultisigError {
    #[error("Invalid threshold: {threshold} of {keys} keys")]
    InvalidThreshold { threshold: usize, keys: usize },
    #[error("Signer not part of the composite key: {0}")]
    UnknownSigner(String),
    #[error("Conflicting signature for signer index {index}")]
    DuplicateSignature { index: usize },
    #[error("Signature sets belong to different composite keys")]
    IncompatibleKeySet,
    #[error("Signature verification failed for signer index {index}")]
    SignatureVerificationFailed { index: usize },
    #[error("Threshold not met: have {have} valid signatures, need {need}")]
    ThresholdNotMet { have: usize, need: usize },
    #[error("Malformed multisig encoding: {0}")]
    MalformedEncoding(String),
    #[error("Key error: {0}")]
    Key(#[from] KeyError),
}

/// An ordered K-of-N set of public keys
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CompositeKeyRepr")]
pub struct CompositeKey {
    threshold: usize,
    pubkeys: Vec<PublicKey>,
}

#[derive(Deserialize)]
struct CompositeKeyRepr {
    threshold: usize,
    pubkeys: Vec<PublicKey>,
}

impl TryFrom<CompositeKeyRepr> for CompositeKey {
    type Error = MultisigError;

    fn try_from(repr: CompositeKeyRepr) -> Result<Self, Self::Error> {
        Self::new(repr.pubkeys, repr.threshold)
    }
}

impl CompositeKey {
    /// Combine `pubkeys` (in this order) with a threshold
    ///
    /// # Errors
    /// `InvalidThreshold` unless `1 <= threshold <= pubkeys.len()`.
    pub fn new(pubkeys: Vec<PublicKey>, threshold: usize) -> Result<Self, MultisigError> {
        if threshold == 0 || threshold > pubkeys.len() {
            return Err(MultisigError::InvalidThreshold {
                threshold,
                keys: pubkeys.len(),
            });
        }
        Ok(Self { threshold, pubkeys })
    }

    /// Get the threshold (K)
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Members in composite order
    pub fn pubkeys(&self) -> &[PublicKey] {
        &self.pubkeys
    }

    /// Get the member count (N)
    pub fn len(&self) -> usize {
        self.pubkeys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pubkeys.is_empty()
    }

    /// Position of `pubkey` among the members
    pub fn index_of(&self, pubkey: &PublicKey) -> Option<usize> {
        self.pubkeys.iter().position(|pk| pk == pubkey)
    }

    /// Get description like "2-of-3"
    pub fn description(&self) -> String {
        format!("{}-of-{}", self.threshold, self.pubkeys.len())
    }

    /// Canonical amino encoding: type prefix, threshold, then each member
    /// as a prefixed secp256k1 key, in order
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = MULTISIG_THRESHOLD_PREFIX.to_vec();
        out.push(varint_key(1));
        put_uvarint(&mut out, self.threshold as u64);
        for pubkey in &self.pubkeys {
            let mut member = SECP256K1_PUBKEY_PREFIX.to_vec();
            put_bytes(&mut member, &pubkey.to_bytes());
            out.push(bytes_key(2));
            put_bytes(&mut out, &member);
        }
        out
    }

    /// Parse the canonical encoding produced by [`CompositeKey::to_bytes`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MultisigError> {
        let mut reader = Reader::new(bytes);
        reader.expect_prefix(&MULTISIG_THRESHOLD_PREFIX)?;

        let mut threshold = 0u64;
        let mut pubkeys = Vec::new();
        while !reader.is_done() {
            match reader.byte()? {
                key if key == varint_key(1) => threshold = reader.uvarint()?,
                key if key == bytes_key(2) => {
                    let mut member = Reader::new(reader.bytes()?);
                    member.expect_prefix(&SECP256K1_PUBKEY_PREFIX)?;
                    let raw = member.bytes()?;
                    if raw.len() != PUBLIC_KEY_LEN || !member.is_done() {
                        return Err(malformed("bad member key length"));
                    }
                    pubkeys.push(PublicKey::from_slice(raw)?);
                }
                other => return Err(malformed(format!("unexpected field key {other:#04x}"))),
            }
        }

        let threshold = usize::try_from(threshold).map_err(|_| malformed("threshold overflow"))?;
        Self::new(pubkeys, threshold)
    }

    /// Composite address: SHA-256 of the canonical encoding, truncated to
    /// 20 bytes
    pub fn address(&self) -> Address {
        Address::from(sha256_truncated(&self.to_bytes()))
    }

    /// Start an empty signature set for this key
    pub fn new_signature_set(&self) -> SignatureSet {
        SignatureSet::new(self)
    }

    /// Re-check every stored signature against its member and `message`
    ///
    /// Accepts only when at least K entries verify. Entries that fail are
    /// not counted.
    pub fn verify(&self, message: &[u8], set: &SignatureSet) -> Result<(), MultisigError> {
        if set.composite_key() != self {
            return Err(MultisigError::IncompatibleKeySet);
        }
        let have = set
            .iter()
            .filter(|(index, signature)| self.pubkeys[*index].verify(message, *signature))
            .count();
        if have < self.threshold {
            return Err(MultisigError::ThresholdNotMet {
                have,
                need: self.threshold,
            });
        }
        Ok(())
    }

    /// Verify the packed chain form produced by
    /// [`SignatureSet::to_multisignature_bytes`]
    ///
    /// Every populated index must verify, as the chain requires.
    pub fn verify_multisignature(&self, message: &[u8], packed: &[u8]) -> bool {
        SignatureSet::from_multisignature_bytes(self, packed)
            .and_then(|set| {
                self.verify(message, &set)?;
                Ok(set.verified(message).len() == set.len())
            })
            .unwrap_or(false)
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.description())?;
        for (i, pk) in self.pubkeys.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{pk}")?;
        }
        f.write_str("]")
    }
}
