//! External collaborators
//!
//! Chain reads and broadcasting live outside this crate. Callers plug in
//! their own transport by implementing these traits; timeouts and retries
//! are theirs to decide.

use thiserror::Error;

use crate::address::Address;

/// Transport or node-side failure, carried as the node's message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Rejected by node: {0}")]
    Rejected(String),
}

/// Read path for an account's replay-protection counter
pub trait SequenceSource {
    fn sequence(&self, address: &Address) -> Result<u64, ClientError>;
}

/// Submits an encoded envelope and returns the transaction hash
pub trait Broadcaster {
    fn broadcast(&self, envelope: &[u8]) -> Result<String, ClientError>;
}
