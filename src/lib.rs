//! HBC SDK: offline signing for the HBC chain
//!
//! This crate provides:
//! - Checksummed base-58 addresses with the `HBC` text prefix
//! - secp256k1 keys with deterministic (RFC 6979) ECDSA signatures
//! - K-of-N threshold composite keys and mergeable partial signature sets
//! - Canonical sign documents and structural transaction validation
//! - Single-signer and multisig transfer flows over pluggable
//!   sequence lookup and broadcast collaborators
//!
//! # Example
//!
//! ```rust
//! use hbc_sdk::config::TxConfig;
//! use hbc_sdk::wallet::{TransferRequest, Wallet};
//!
//! let wallet = Wallet::new();
//! let request = TransferRequest {
//!     denom: "hbc".into(),
//!     from: wallet.address().to_string(),
//!     to: "HBCb1bg1Y2qxRhVQBUxHE7nWcuKzbM7scrwU".into(),
//!     memo: String::new(),
//!     amount: "1000".into(),
//!     fee: "0".into(),
//!     sequence: 0,
//! };
//!
//! let tx = wallet.create_transaction(&TxConfig::default(), &request).unwrap();
//! assert_eq!(tx.signatures.len(), 1);
//! ```

pub mod address;
pub mod cli;
pub mod client;
pub mod config;
pub mod crypto;
pub mod multisig;
pub mod tx;
pub mod wallet;

// Re-export commonly used types
pub use address::{Address, AddressError};
pub use client::{Broadcaster, ClientError, SequenceSource};
pub use config::TxConfig;
pub use crypto::{KeyError, KeyPair, PublicKey};
pub use multisig::{CompositeKey, MultisigError, SignatureSet};
pub use tx::{BroadcastMode, Msg, MsgMultiSend, MsgSend, StdFee, StdSignMsg, StdTx, TransactionError};
pub use wallet::{TransferRequest, Wallet, WalletError};
