//! Signed transactions
//!
//! A [`StdTx`] carries its messages, fee, memo and one [`StdSignature`]
//! per distinct required signer. The signer of each signature is either a
//! single key or a threshold composite key; the variant is fixed when the
//! signature is built.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::fee::{StdFee, MAX_GAS_WANTED};
use super::msg::Msg;
use super::TransactionError;
use crate::address::Address;
use crate::crypto::PublicKey;
use crate::multisig::CompositeKey;

/// Amino name of a single secp256k1 public key
pub const PUBKEY_SECP256K1_NAME: &str = "tendermint/PubKeySecp256k1";

/// Amino name of a threshold composite key
pub const PUBKEY_MULTISIG_NAME: &str = "tendermint/PubKeyMultisigThreshold";

// =============================================================================
// Signer Key
// =============================================================================

/// The key a signature was produced under
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignerKey {
    Single(PublicKey),
    Threshold(CompositeKey),
}

impl SignerKey {
    pub fn address(&self) -> Address {
        match self {
            SignerKey::Single(pk) => pk.address(),
            SignerKey::Threshold(key) => key.address(),
        }
    }

    /// Amino JSON form: `{"type": <name>, "value": ...}`
    pub fn to_json(&self) -> Value {
        match self {
            SignerKey::Single(pk) => single_json(pk),
            SignerKey::Threshold(key) => json!({
                "type": PUBKEY_MULTISIG_NAME,
                "value": {
                    "threshold": key.threshold().to_string(),
                    "pubkeys": key.pubkeys().iter().map(single_json).collect::<Vec<_>>(),
                },
            }),
        }
    }
}

fn single_json(pk: &PublicKey) -> Value {
    json!({
        "type": PUBKEY_SECP256K1_NAME,
        "value": BASE64.encode(pk.to_bytes()),
    })
}

impl From<PublicKey> for SignerKey {
    fn from(pk: PublicKey) -> Self {
        SignerKey::Single(pk)
    }
}

impl From<CompositeKey> for SignerKey {
    fn from(key: CompositeKey) -> Self {
        SignerKey::Threshold(key)
    }
}

// =============================================================================
// Signature
// =============================================================================

/// A signature together with the key that verifies it
///
/// For a threshold key the bytes are the packed multisignature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StdSignature {
    pub pub_key: SignerKey,
    pub signature: Vec<u8>,
}

impl StdSignature {
    pub fn new(pub_key: impl Into<SignerKey>, signature: Vec<u8>) -> Self {
        Self {
            pub_key: pub_key.into(),
            signature,
        }
    }

    /// Check the signature over `sign_bytes`
    pub fn verify(&self, sign_bytes: &[u8]) -> bool {
        match &self.pub_key {
            SignerKey::Single(pk) => pk.verify(sign_bytes, &self.signature),
            SignerKey::Threshold(key) => key.verify_multisignature(sign_bytes, &self.signature),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "pub_key": self.pub_key.to_json(),
            "signature": BASE64.encode(&self.signature),
        })
    }
}

// =============================================================================
// Broadcast Mode
// =============================================================================

/// How long the node holds the broadcast request open
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastMode {
    /// Return after the check phase
    #[default]
    Sync,
    /// Return immediately
    Async,
    /// Wait for the block to commit
    Block,
}

impl BroadcastMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BroadcastMode::Sync => "sync",
            BroadcastMode::Async => "async",
            BroadcastMode::Block => "block",
        }
    }
}

impl fmt::Display for BroadcastMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BroadcastMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sync" => Ok(BroadcastMode::Sync),
            "async" => Ok(BroadcastMode::Async),
            "block" => Ok(BroadcastMode::Block),
            other => Err(format!("unknown broadcast mode {other:?}")),
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A transaction ready for broadcast
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StdTx {
    pub msgs: Vec<Msg>,
    pub fee: StdFee,
    pub signatures: Vec<StdSignature>,
    pub memo: String,
}

impl StdTx {
    /// Assemble without validating
    pub fn new(
        msgs: Vec<Msg>,
        fee: StdFee,
        signatures: Vec<StdSignature>,
        memo: impl Into<String>,
    ) -> Self {
        Self {
            msgs,
            fee,
            signatures,
            memo: memo.into(),
        }
    }

    /// Required signers across all messages, first occurrence order,
    /// duplicates removed
    pub fn signers(&self) -> Vec<Address> {
        let mut signers: Vec<Address> = Vec::new();
        for signer in self.msgs.iter().flat_map(Msg::signers) {
            if !signers.contains(&signer) {
                signers.push(signer);
            }
        }
        signers
    }

    /// Structural checks that need no chain state
    ///
    /// Messages themselves are checked by [`Msg::validate_basic`].
    pub fn validate_basic(&self) -> Result<(), TransactionError> {
        if self.fee.gas > MAX_GAS_WANTED {
            return Err(TransactionError::GasExceedsMaximum {
                gas: self.fee.gas,
                max: MAX_GAS_WANTED,
            });
        }
        if self.signatures.is_empty() {
            return Err(TransactionError::NoSignatures);
        }
        let expected = self.signers().len();
        if self.signatures.len() != expected {
            return Err(TransactionError::SignerCountMismatch {
                expected,
                got: self.signatures.len(),
            });
        }
        Ok(())
    }

    /// True when every signature matches its signer's address and verifies
    /// over `sign_bytes`
    pub fn verify_signatures(&self, sign_bytes: &[u8]) -> bool {
        let signers = self.signers();
        signers.len() == self.signatures.len()
            && signers
                .iter()
                .zip(&self.signatures)
                .all(|(signer, sig)| sig.pub_key.address() == *signer && sig.verify(sign_bytes))
    }

    pub fn to_json(&self) -> Value {
        json!({
            "msg": self.msgs.iter().map(Msg::to_json).collect::<Vec<_>>(),
            "fee": self.fee.to_json(),
            "signatures": self.signatures.iter().map(StdSignature::to_json).collect::<Vec<_>>(),
            "memo": self.memo,
        })
    }

    /// Request body for the broadcaster
    pub fn envelope(&self, mode: BroadcastMode) -> Value {
        json!({ "tx": self.to_json(), "mode": mode.as_str() })
    }
}
