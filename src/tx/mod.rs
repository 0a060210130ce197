//! Transaction content, sign documents and assembly
//!
//! - [`coin`]: denominations and amounts
//! - [`msg`]: the transfer messages a transaction can carry
//! - [`fee`]: fee and gas limit
//! - [`sign_doc`]: the canonical bytes every signer signs
//! - [`transaction`]: signatures, structural validation and the
//!   broadcast envelope

pub mod canonical;
pub mod coin;
pub mod fee;
pub mod msg;
pub mod sign_doc;
pub mod transaction;

use thiserror::Error;

pub use coin::{Coin, Coins};
pub use fee::{StdFee, MAX_GAS_WANTED};
pub use msg::{Input, Msg, MsgMultiSend, MsgSend, Output};
pub use sign_doc::StdSignMsg;
pub use transaction::{BroadcastMode, SignerKey, StdSignature, StdTx};

// =============================================================================
// Error Types
// =============================================================================

/// Message and transaction validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Missing sender address")]
    MissingSenderAddress,
    #[error("Missing recipient address")]
    MissingRecipientAddress,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Sum of inputs does not equal sum of outputs")]
    InputOutputMismatch,
    #[error("No inputs to send transaction")]
    NoInputs,
    #[error("No outputs to send transaction")]
    NoOutputs,
    #[error("Invalid gas supplied; {gas} > {max}")]
    GasExceedsMaximum { gas: u64, max: u64 },
    #[error("No signers")]
    NoSignatures,
    #[error("Wrong number of signers; expected {expected}, got {got}")]
    SignerCountMismatch { expected: usize, got: usize },
    #[error("Encoding failed: {0}")]
    Encoding(String),
}
