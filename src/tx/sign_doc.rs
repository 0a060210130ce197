//! Sign document construction
//!
//! The sign document is the only thing a key ever signs. Every signer and
//! every verifier rebuilds it from transaction content, so the output must
//! depend on the logical values alone: each message is rendered to its own
//! canonical bytes, embedded verbatim, and the top-level fields are emitted
//! in byte order of their names.

use serde::Serialize;
use serde_json::value::RawValue;

use super::fee::StdFee;
use super::msg::Msg;
use super::{canonical, TransactionError};

/// Top-level layout; fields are declared in sorted order
#[derive(Serialize)]
struct SignDoc<'a> {
    chain_id: &'a str,
    fee: Box<RawValue>,
    memo: &'a str,
    msgs: Vec<Box<RawValue>>,
    #[serde(serialize_with = "as_decimal")]
    sequence: u64,
}

fn as_decimal<S: serde::Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

fn raw(bytes: Vec<u8>) -> Result<Box<RawValue>, TransactionError> {
    let text = String::from_utf8(bytes).map_err(|e| TransactionError::Encoding(e.to_string()))?;
    RawValue::from_string(text).map_err(|e| TransactionError::Encoding(e.to_string()))
}

/// Canonical sign bytes for the given transaction content
pub fn build(
    chain_id: &str,
    sequence: u64,
    memo: &str,
    fee: &StdFee,
    msgs: &[Msg],
) -> Result<Vec<u8>, TransactionError> {
    let msgs = msgs
        .iter()
        .map(|msg| msg.sign_bytes().and_then(raw))
        .collect::<Result<Vec<_>, _>>()?;
    let doc = SignDoc {
        chain_id,
        fee: raw(canonical::value_to_vec(fee.to_json())?)?,
        memo,
        msgs,
        sequence,
    };
    canonical::to_vec(&doc)
}

/// Transaction content awaiting signatures
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StdSignMsg {
    pub chain_id: String,
    pub sequence: u64,
    pub msgs: Vec<Msg>,
    pub memo: String,
    pub fee: StdFee,
}

impl StdSignMsg {
    pub fn new(
        chain_id: impl Into<String>,
        sequence: u64,
        msgs: Vec<Msg>,
        memo: impl Into<String>,
        fee: StdFee,
    ) -> Self {
        Self {
            chain_id: chain_id.into(),
            sequence,
            msgs,
            memo: memo.into(),
            fee,
        }
    }

    /// Bytes to sign
    pub fn bytes(&self) -> Result<Vec<u8>, TransactionError> {
        build(
            &self.chain_id,
            self.sequence,
            &self.memo,
            &self.fee,
            &self.msgs,
        )
    }
}
