//! Partial signature accumulation for composite keys
//!
//! A [`SignatureSet`] maps member indices of one [`CompositeKey`] to
//! 64-byte signatures. It is a value: [`SignatureSet::add_signature`] and
//! [`SignatureSet::merge`] return a new set and leave their inputs
//! untouched, so independent signers can build partial sets and combine
//! them later in any order.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::amino::{bytes_key, malformed, put_bytes, put_uvarint, varint_key, Reader};
use super::key::{CompositeKey, MultisigError};
use crate::crypto::{CompactSignature, PublicKey, SIGNATURE_LEN};

/// Signatures collected so far for one composite key
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SignatureSetRepr", into = "SignatureSetRepr")]
pub struct SignatureSet {
    key: CompositeKey,
    signatures: BTreeMap<usize, CompactSignature>,
}

/// JSON form exchanged between signers
#[derive(Serialize, Deserialize)]
struct SignatureSetRepr {
    composite_key: CompositeKey,
    signatures: BTreeMap<usize, String>,
}

impl From<SignatureSet> for SignatureSetRepr {
    fn from(set: SignatureSet) -> Self {
        Self {
            composite_key: set.key,
            signatures: set
                .signatures
                .into_iter()
                .map(|(index, sig)| (index, BASE64.encode(sig)))
                .collect(),
        }
    }
}

impl TryFrom<SignatureSetRepr> for SignatureSet {
    type Error = MultisigError;

    fn try_from(repr: SignatureSetRepr) -> Result<Self, Self::Error> {
        let mut signatures = BTreeMap::new();
        for (index, encoded) in repr.signatures {
            if index >= repr.composite_key.len() {
                return Err(malformed(format!("signer index {index} out of range")));
            }
            let raw = BASE64
                .decode(encoded)
                .map_err(|_| malformed("signature is not base64"))?;
            signatures.insert(index, to_compact(&raw, index)?);
        }
        Ok(Self {
            key: repr.composite_key,
            signatures,
        })
    }
}

fn to_compact(raw: &[u8], index: usize) -> Result<CompactSignature, MultisigError> {
    raw.try_into()
        .map_err(|_| MultisigError::SignatureVerificationFailed { index })
}

impl SignatureSet {
    /// Empty set bound to `key`
    pub fn new(key: &CompositeKey) -> Self {
        Self {
            key: key.clone(),
            signatures: BTreeMap::new(),
        }
    }

    pub fn composite_key(&self) -> &CompositeKey {
        &self.key
    }

    /// Number of populated member indices
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Signature stored for member `index`, if any
    pub fn get(&self, index: usize) -> Option<&CompactSignature> {
        self.signatures.get(&index)
    }

    /// Entries in ascending index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &CompactSignature)> {
        self.signatures.iter().map(|(index, sig)| (*index, sig))
    }

    /// True once at least K distinct members have signed
    pub fn is_complete(&self) -> bool {
        self.signatures.len() >= self.key.threshold()
    }

    /// Copy keeping only the entries that verify against `message`
    pub fn verified(&self, message: &[u8]) -> Self {
        let mut next = self.clone();
        next.signatures.retain(|index, signature| {
            let valid = self.key.pubkeys()[*index].verify(message, &signature[..]);
            if !valid {
                log::warn!("dropping unverified signature for signer index {}", index);
            }
            valid
        });
        next
    }

    /// Add `signer`'s signature over `message`
    ///
    /// Re-adding byte-identical bytes for the same member is a no-op;
    /// different bytes for an already populated index are rejected.
    ///
    /// # Errors
    /// `UnknownSigner`, `SignatureVerificationFailed` or `DuplicateSignature`.
    pub fn add_signature(
        &self,
        signature: &[u8],
        signer: &PublicKey,
        message: &[u8],
    ) -> Result<Self, MultisigError> {
        let index = self.key.index_of(signer).ok_or_else(|| {
            log::warn!("rejected signature from non-member {}", signer);
            MultisigError::UnknownSigner(signer.to_hex())
        })?;

        if !signer.verify(message, signature) {
            log::warn!("rejected invalid signature for signer index {}", index);
            return Err(MultisigError::SignatureVerificationFailed { index });
        }
        let signature = to_compact(signature, index)?;

        match self.signatures.get(&index) {
            Some(existing) if *existing == signature => {
                log::debug!("signature for index {} already present", index);
                Ok(self.clone())
            }
            Some(_) => Err(MultisigError::DuplicateSignature { index }),
            None => {
                let mut next = self.clone();
                next.signatures.insert(index, signature);
                log::debug!(
                    "added signature for index {} ({}/{})",
                    index,
                    next.len(),
                    self.key.threshold()
                );
                Ok(next)
            }
        }
    }

    /// Union of two sets for the same composite key
    ///
    /// Commutative and associative. Indices present in both inputs must
    /// carry identical bytes.
    pub fn merge(&self, other: &Self) -> Result<Self, MultisigError> {
        if self.key != other.key {
            return Err(MultisigError::IncompatibleKeySet);
        }

        let mut merged = self.signatures.clone();
        for (index, signature) in &other.signatures {
            match merged.get(index) {
                Some(existing) if existing != signature => {
                    return Err(MultisigError::DuplicateSignature { index: *index });
                }
                Some(_) => {}
                None => {
                    merged.insert(*index, *signature);
                }
            }
        }

        log::debug!(
            "merged signature sets: {} + {} -> {} entries",
            self.len(),
            other.len(),
            merged.len()
        );
        Ok(Self {
            key: self.key.clone(),
            signatures: merged,
        })
    }

    /// Pack as the chain's `Multisignature`: a compact bit array of
    /// populated indices followed by the signatures in index order
    pub fn to_multisignature_bytes(&self) -> Vec<u8> {
        let n = self.key.len();
        let mut elems = vec![0u8; n.div_ceil(8)];
        for index in self.signatures.keys() {
            elems[index / 8] |= 1 << (7 - index % 8);
        }

        let mut bit_array = Vec::new();
        let extra_bits = (n % 8) as u64;
        if extra_bits != 0 {
            bit_array.push(varint_key(1));
            put_uvarint(&mut bit_array, extra_bits);
        }
        bit_array.push(bytes_key(2));
        put_bytes(&mut bit_array, &elems);

        let mut out = vec![bytes_key(1)];
        put_bytes(&mut out, &bit_array);
        for signature in self.signatures.values() {
            out.push(bytes_key(2));
            put_bytes(&mut out, signature);
        }
        out
    }

    /// Unpack the chain's `Multisignature` form for `key`
    ///
    /// Signatures are not verified here; use [`CompositeKey::verify`].
    pub fn from_multisignature_bytes(
        key: &CompositeKey,
        bytes: &[u8],
    ) -> Result<Self, MultisigError> {
        let mut reader = Reader::new(bytes);
        let mut extra_bits = 0u64;
        let mut elems: &[u8] = &[];
        let mut sigs = Vec::new();

        while !reader.is_done() {
            match reader.byte()? {
                k if k == bytes_key(1) => {
                    let mut bits = Reader::new(reader.bytes()?);
                    while !bits.is_done() {
                        match bits.byte()? {
                            k if k == varint_key(1) => extra_bits = bits.uvarint()?,
                            k if k == bytes_key(2) => elems = bits.bytes()?,
                            other => {
                                return Err(malformed(format!("unexpected field key {other:#04x}")))
                            }
                        }
                    }
                }
                k if k == bytes_key(2) => sigs.push(reader.bytes()?),
                other => return Err(malformed(format!("unexpected field key {other:#04x}"))),
            }
        }

        let n = key.len();
        if extra_bits >= 8 {
            return Err(malformed(format!("bit array has {extra_bits} extra bits")));
        }
        if elems.len() != n.div_ceil(8) || (extra_bits != 0 && elems.is_empty()) {
            return Err(malformed(format!(
                "bit array has {} bytes, key has {n} members",
                elems.len()
            )));
        }
        let size = if extra_bits == 0 {
            elems.len() * 8
        } else {
            (elems.len() - 1) * 8 + extra_bits as usize
        };
        if size != n {
            return Err(malformed(format!("bit array holds {size} bits, key has {n}")));
        }

        let indices: Vec<usize> = (0..n)
            .filter(|i| elems[i / 8] & (1 << (7 - i % 8)) != 0)
            .collect();
        if indices.len() != sigs.len() {
            return Err(malformed("signature count does not match bit array"));
        }

        let mut signatures = BTreeMap::new();
        for (index, raw) in indices.into_iter().zip(sigs) {
            if raw.len() != SIGNATURE_LEN {
                return Err(malformed(format!("signature {index} has {} bytes", raw.len())));
            }
            signatures.insert(index, to_compact(raw, index)?);
        }

        Ok(Self {
            key: key.clone(),
            signatures,
        })
    }
}
