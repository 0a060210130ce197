//! Wallet implementation for the HBC chain
//!
//! Builds transfers, signs them with a single key or as one member of a
//! threshold group, and hands finished envelopes to a broadcaster.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::{Address, AddressError};
use crate::client::{Broadcaster, ClientError, SequenceSource};
use crate::config::TxConfig;
use crate::crypto::{KeyError, KeyPair};
use crate::multisig::{CompositeKey, MultisigError, SignatureSet};
use crate::tx::coin::parse_amount;
use crate::tx::{Coins, Msg, MsgSend, StdFee, StdSignMsg, StdSignature, StdTx, TransactionError};

/// Wallet-related errors
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Address error: {0}")]
    AddressError(#[from] AddressError),
    #[error("Crypto error: {0}")]
    CryptoError(#[from] KeyError),
    #[error("Multisig error: {0}")]
    MultisigError(#[from] MultisigError),
    #[error("Transaction error: {0}")]
    TransactionError(#[from] TransactionError),
    #[error("Client error: {0}")]
    ClientError(#[from] ClientError),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Sender {sender} is not controlled by signer {signer}")]
    SignerMismatch { sender: String, signer: String },
}

/// Logical content of a transfer, as a user supplies it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Denomination being sent
    pub denom: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub memo: String,
    /// Decimal amount in base units
    pub amount: String,
    /// Decimal fee in base units; raised to the configured minimum
    pub fee: String,
    #[serde(default)]
    pub sequence: u64,
}

/// Parse and validate a transfer into unsigned transaction content
pub fn build_unsigned_transfer(
    config: &TxConfig,
    request: &TransferRequest,
) -> Result<StdSignMsg, WalletError> {
    let from: Address = request.from.parse()?;
    let to: Address = request.to.parse()?;
    let amount = parse_amount(&request.amount)?;

    let requested_fee = parse_amount(&request.fee)?;
    let fee_amount = requested_fee.max(config.min_fee);
    if fee_amount != requested_fee {
        log::debug!("Fee {} below minimum, using {}", requested_fee, fee_amount);
    }
    let fee = StdFee::new(
        config.gas_limit,
        Coins::single(config.fee_denom.clone(), fee_amount),
    );

    let msgs = vec![Msg::from(MsgSend::new(
        from,
        to,
        Coins::single(request.denom.clone(), amount),
    ))];
    for msg in &msgs {
        msg.validate_basic()?;
    }

    Ok(StdSignMsg::new(
        config.chain_id.clone(),
        request.sequence,
        msgs,
        request.memo.clone(),
        fee,
    ))
}

/// Check that `address` is the single-signer address of `private_key`
pub fn check_private_key_address(private_key: &[u8], address: &str) -> Result<bool, WalletError> {
    let key_pair = KeyPair::from_bytes(private_key)?;
    let expected: Address = address.parse()?;
    Ok(key_pair.address() == expected)
}

/// Validate a signed transaction and encode its broadcast envelope
pub fn encode_envelope(config: &TxConfig, tx: &StdTx) -> Result<Vec<u8>, WalletError> {
    tx.validate_basic()?;
    Ok(serde_json::to_vec(&tx.envelope(config.broadcast_mode))?)
}

/// Look up the sender's sequence, then build, sign and submit with `sign`
///
/// Returns the transaction hash reported by the broadcaster.
pub fn send_transfer<F>(
    config: &TxConfig,
    request: &TransferRequest,
    sequences: &dyn SequenceSource,
    broadcaster: &dyn Broadcaster,
    sign: F,
) -> Result<String, WalletError>
where
    F: FnOnce(&TxConfig, &TransferRequest) -> Result<StdTx, WalletError>,
{
    let from: Address = request.from.parse()?;
    let request = TransferRequest {
        sequence: sequences.sequence(&from)?,
        ..request.clone()
    };
    log::debug!("Sequence for {} is {}", from, request.sequence);

    let tx = sign(config, &request)?;
    let envelope = encode_envelope(config, &tx)?;
    let hash = broadcaster.broadcast(&envelope)?;
    log::info!("Broadcast transaction {} from {}", hash, from);
    Ok(hash)
}

/// A key holder for the HBC chain
pub struct Wallet {
    /// The key pair for signing transactions
    key_pair: KeyPair,
}

impl Wallet {
    /// Create a new wallet with a fresh key pair
    pub fn new() -> Self {
        Self {
            key_pair: KeyPair::generate(),
        }
    }

    /// Import a wallet from raw private key bytes
    pub fn from_bytes(private_key: &[u8]) -> Result<Self, WalletError> {
        Ok(Self {
            key_pair: KeyPair::from_bytes(private_key)?,
        })
    }

    /// Import a wallet from a hex private key
    pub fn from_private_key(private_key_hex: &str) -> Result<Self, WalletError> {
        Ok(Self {
            key_pair: KeyPair::from_private_key_hex(private_key_hex)?,
        })
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    /// Get the wallet's single-signer address
    pub fn address(&self) -> Address {
        self.key_pair.address()
    }

    /// Get the wallet's public key (hex)
    pub fn public_key(&self) -> String {
        self.key_pair.public_key_hex()
    }

    /// Sign a transfer from this wallet's own address
    pub fn create_transaction(
        &self,
        config: &TxConfig,
        request: &TransferRequest,
    ) -> Result<StdTx, WalletError> {
        let sign_msg = build_unsigned_transfer(config, request)?;
        self.ensure_sender(&sign_msg, &self.address())?;

        let bytes = sign_msg.bytes()?;
        let signature = StdSignature::new(
            self.key_pair.public_key(),
            self.key_pair.sign(&bytes).to_vec(),
        );
        let tx = StdTx::new(sign_msg.msgs, sign_msg.fee, vec![signature], sign_msg.memo);
        tx.validate_basic()?;

        log::info!("Signed transfer from {}", self.address());
        Ok(tx)
    }

    /// Contribute this wallet's signature to a fresh set for `composite`
    pub fn partial_sign(
        &self,
        config: &TxConfig,
        request: &TransferRequest,
        composite: &CompositeKey,
    ) -> Result<SignatureSet, WalletError> {
        self.partial_sign_onto(config, request, &composite.new_signature_set())
    }

    /// Add this wallet's signature to an existing set
    pub fn partial_sign_onto(
        &self,
        config: &TxConfig,
        request: &TransferRequest,
        set: &SignatureSet,
    ) -> Result<SignatureSet, WalletError> {
        let sign_msg = build_unsigned_transfer(config, request)?;
        self.ensure_sender(&sign_msg, &set.composite_key().address())?;

        let bytes = sign_msg.bytes()?;
        let signer = self.key_pair.public_key();
        let next = set.add_signature(&self.key_pair.sign(&bytes), &signer, &bytes)?;
        log::debug!(
            "Partial signature added ({}/{})",
            next.len(),
            set.composite_key().threshold()
        );
        Ok(next)
    }

    /// Merge a peer's partial set with this wallet's own signature and
    /// package the threshold transaction
    ///
    /// # Errors
    /// `ThresholdNotMet` when fewer than K verified signatures result.
    pub fn merge_multisig(
        &self,
        config: &TxConfig,
        request: &TransferRequest,
        peer: &SignatureSet,
    ) -> Result<StdTx, WalletError> {
        let bytes = build_unsigned_transfer(config, request)?.bytes()?;
        let peer = peer.verified(&bytes);
        let own = self.partial_sign_onto(config, request, &peer.composite_key().new_signature_set())?;
        let merged = peer.merge(&own)?;
        package_multisig(config, request, &merged)
    }

    fn ensure_sender(&self, sign_msg: &StdSignMsg, signer: &Address) -> Result<(), WalletError> {
        for sender in sign_msg.msgs.iter().flat_map(Msg::signers) {
            if sender != *signer {
                return Err(WalletError::SignerMismatch {
                    sender: sender.to_string(),
                    signer: signer.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

/// Verify a complete set and wrap it as the transaction's only signature
pub fn package_multisig(
    config: &TxConfig,
    request: &TransferRequest,
    set: &SignatureSet,
) -> Result<StdTx, WalletError> {
    let sign_msg = build_unsigned_transfer(config, request)?;
    let composite = set.composite_key();
    let bytes = sign_msg.bytes()?;
    let set = set.verified(&bytes);
    composite.verify(&bytes, &set)?;

    let packed = set.to_multisignature_bytes();
    let signature = StdSignature::new(composite.clone(), packed);
    let tx = StdTx::new(sign_msg.msgs, sign_msg.fee, vec![signature], sign_msg.memo);
    tx.validate_basic()?;
    if !tx.verify_signatures(&bytes) {
        return Err(WalletError::SignerMismatch {
            sender: request.from.clone(),
            signer: composite.address().to_string(),
        });
    }

    log::info!(
        "Assembled {} multisig transfer from {}",
        composite.description(),
        composite.address()
    );
    Ok(tx)
}

/// Public wallet information (safe to share)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletInfo {
    pub address: Address,
    pub public_key: String,
}

impl From<&Wallet> for WalletInfo {
    fn from(wallet: &Wallet) -> Self {
        Self {
            address: wallet.address(),
            public_key: wallet.public_key(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::PublicKey;
    use std::cell::RefCell;

    const PRIV: &str = "da0bbe0acb8aae423de68a1a59379512d9d92ed453743592d6c3b2bc04252640";
    const PRIV_A: &str = "01ee5aa673f63fc906fb2dbc191438217c5e3f2646381b5e261be2d1f8479086";
    const PRIV_B: &str = "1f118af86fcab84f1a7d5204e0cdda351dcf759498e3550a858b56fc719f5521";
    const TO: &str = "HBCgKep1AQKT1x9KhsDUThyRzkRMkYYoCGT8";

    fn request(from: &str) -> TransferRequest {
        TransferRequest {
            denom: "hbc".into(),
            from: from.into(),
            to: TO.into(),
            memo: String::new(),
            amount: "104416451".into(),
            fee: "1".into(),
            sequence: 4,
        }
    }

    struct FixedSequence(u64);

    impl SequenceSource for FixedSequence {
        fn sequence(&self, _address: &Address) -> Result<u64, ClientError> {
            Ok(self.0)
        }
    }

    #[derive(Default)]
    struct RecordingBroadcaster {
        sent: RefCell<Vec<Vec<u8>>>,
    }

    impl Broadcaster for RecordingBroadcaster {
        fn broadcast(&self, envelope: &[u8]) -> Result<String, ClientError> {
            self.sent.borrow_mut().push(envelope.to_vec());
            Ok("ABCDEF".into())
        }
    }

    struct DownBroadcaster;

    impl Broadcaster for DownBroadcaster {
        fn broadcast(&self, _envelope: &[u8]) -> Result<String, ClientError> {
            Err(ClientError::Request("connection refused".into()))
        }
    }

    #[test]
    fn test_wallet_import() {
        let wallet = Wallet::from_private_key(PRIV).unwrap();
        assert_eq!(
            wallet.address().to_string(),
            "HBCb1bg1Y2qxRhVQBUxHE7nWcuKzbM7scrwU"
        );
        let info = WalletInfo::from(&wallet);
        assert_eq!(info.public_key, wallet.public_key());
    }

    #[test]
    fn test_check_private_key_address() {
        let key = hex::decode(PRIV).unwrap();
        assert!(check_private_key_address(&key, "HBCb1bg1Y2qxRhVQBUxHE7nWcuKzbM7scrwU").unwrap());
        assert!(!check_private_key_address(&key, TO).unwrap());
        assert!(check_private_key_address(&key[..31], TO).is_err());
        assert!(check_private_key_address(&key, "HBCnope").is_err());
    }

    #[test]
    fn test_fee_raised_to_minimum() {
        let config = TxConfig::default();
        let wallet = Wallet::from_private_key(PRIV).unwrap();
        let sign_msg = build_unsigned_transfer(&config, &request(&wallet.address().to_string())).unwrap();
        assert_eq!(sign_msg.fee.amount.amount_of("hbc"), config.min_fee);
        assert_eq!(sign_msg.fee.gas, config.gas_limit);
        assert_eq!(sign_msg.chain_id, "hbtc-testnet");

        let mut generous = request(&wallet.address().to_string());
        generous.fee = "5000000000000".into();
        let sign_msg = build_unsigned_transfer(&config, &generous).unwrap();
        assert_eq!(sign_msg.fee.amount.amount_of("hbc"), 5_000_000_000_000);
    }

    #[test]
    fn test_malformed_requests() {
        let config = TxConfig::default();
        let from = Wallet::new().address().to_string();

        let mut bad_to = request(&from);
        bad_to.to = "HBCb1bg1Y2qxRhVQBUxHE7nWcuKzbM7scrwV".into();
        assert!(matches!(
            build_unsigned_transfer(&config, &bad_to),
            Err(WalletError::AddressError(_))
        ));

        let mut bad_amount = request(&from);
        bad_amount.amount = "1e9".into();
        assert!(matches!(
            build_unsigned_transfer(&config, &bad_amount),
            Err(WalletError::TransactionError(TransactionError::InvalidAmount(_)))
        ));

        let mut zero = request(&from);
        zero.amount = "0".into();
        assert!(matches!(
            build_unsigned_transfer(&config, &zero),
            Err(WalletError::TransactionError(TransactionError::InvalidAmount(_)))
        ));
    }

    #[test]
    fn test_single_signer_transaction() {
        let config = TxConfig::default();
        let wallet = Wallet::from_private_key(PRIV).unwrap();
        let req = request(&wallet.address().to_string());
        let tx = wallet.create_transaction(&config, &req).unwrap();

        let bytes = build_unsigned_transfer(&config, &req).unwrap().bytes().unwrap();
        assert!(tx.verify_signatures(&bytes));

        // deterministic signing
        assert_eq!(tx, wallet.create_transaction(&config, &req).unwrap());

        let other = Wallet::new();
        assert!(matches!(
            other.create_transaction(&config, &req),
            Err(WalletError::SignerMismatch { .. })
        ));
    }

    #[test]
    fn test_two_party_multisig() {
        let config = TxConfig::default();
        let a = Wallet::from_private_key(PRIV_A).unwrap();
        let b = Wallet::from_private_key(PRIV_B).unwrap();
        let members: Vec<PublicKey> = [&a, &b].iter().map(|w| w.key_pair().public_key()).collect();
        let composite = CompositeKey::new(members, 2).unwrap();
        let req = request(&composite.address().to_string());

        let partial = a.partial_sign(&config, &req, &composite).unwrap();
        assert!(!partial.is_complete());

        // exchanged as JSON between the parties
        let wire = serde_json::to_string(&partial).unwrap();
        let received: SignatureSet = serde_json::from_str(&wire).unwrap();

        let tx = b.merge_multisig(&config, &req, &received).unwrap();
        let bytes = build_unsigned_transfer(&config, &req).unwrap().bytes().unwrap();
        assert!(tx.verify_signatures(&bytes));
        assert_eq!(tx.signatures.len(), 1);
    }

    #[test]
    fn test_merge_drops_unverified_peer_entries() {
        use base64::engine::general_purpose::STANDARD as BASE64;
        use base64::Engine;

        let config = TxConfig::default();
        let a = Wallet::from_private_key(PRIV_A).unwrap();
        let b = Wallet::from_private_key(PRIV_B).unwrap();
        let c = Wallet::new();
        let members: Vec<PublicKey> = [&a, &b, &c].iter().map(|w| w.key_pair().public_key()).collect();
        let composite = CompositeKey::new(members, 2).unwrap();
        let req = request(&composite.address().to_string());

        let partial = a.partial_sign(&config, &req, &composite).unwrap();
        let mut json = serde_json::to_value(&partial).unwrap();
        json["signatures"]["1"] = serde_json::Value::String(BASE64.encode([7u8; 64]));
        json["signatures"]["2"] = serde_json::Value::String(BASE64.encode([9u8; 64]));
        let received: SignatureSet = serde_json::from_value(json).unwrap();
        assert_eq!(received.len(), 3);

        let tx = b.merge_multisig(&config, &req, &received).unwrap();
        let bytes = build_unsigned_transfer(&config, &req).unwrap().bytes().unwrap();
        assert!(tx.verify_signatures(&bytes));

        let packed = SignatureSet::from_multisignature_bytes(&composite, &tx.signatures[0].signature).unwrap();
        assert_eq!(packed.iter().map(|(i, _)| i).collect::<Vec<_>>(), vec![0, 1]);

        // packaging the forged set directly keeps only what verifies
        assert!(matches!(
            package_multisig(&config, &req, &received),
            Err(WalletError::MultisigError(MultisigError::ThresholdNotMet { have: 1, need: 2 }))
        ));
    }

    #[test]
    fn test_merge_below_threshold() {
        let config = TxConfig::default();
        let a = Wallet::from_private_key(PRIV_A).unwrap();
        let b = Wallet::from_private_key(PRIV_B).unwrap();
        let c = Wallet::new();
        let members: Vec<PublicKey> = [&a, &b, &c].iter().map(|w| w.key_pair().public_key()).collect();
        let composite = CompositeKey::new(members, 3).unwrap();
        let req = request(&composite.address().to_string());

        let partial = a.partial_sign(&config, &req, &composite).unwrap();
        assert!(matches!(
            b.merge_multisig(&config, &req, &partial),
            Err(WalletError::MultisigError(MultisigError::ThresholdNotMet { have: 2, need: 3 }))
        ));
    }

    #[test]
    fn test_send_uses_fetched_sequence() {
        let config = TxConfig::default();
        let wallet = Wallet::from_private_key(PRIV).unwrap();
        let broadcaster = RecordingBroadcaster::default();

        let hash = send_transfer(
            &config,
            &request(&wallet.address().to_string()),
            &FixedSequence(42),
            &broadcaster,
            |config, req| {
                assert_eq!(req.sequence, 42);
                wallet.create_transaction(config, req)
            },
        )
        .unwrap();
        assert_eq!(hash, "ABCDEF");

        let sent = broadcaster.sent.borrow();
        let envelope: serde_json::Value = serde_json::from_slice(&sent[0]).unwrap();
        assert_eq!(envelope["mode"], "sync");
        assert_eq!(envelope["tx"]["signatures"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_send_reports_transport_failure() {
        let config = TxConfig::default();
        let wallet = Wallet::from_private_key(PRIV).unwrap();
        let result = send_transfer(
            &config,
            &request(&wallet.address().to_string()),
            &FixedSequence(0),
            &DownBroadcaster,
            |config, req| wallet.create_transaction(config, req),
        );
        assert!(matches!(
            result,
            Err(WalletError::ClientError(ClientError::Request(_)))
        ));
    }
}
