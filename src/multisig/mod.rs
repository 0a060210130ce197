//! Threshold multi-signature support
//!
//! Combines an ordered list of public keys with a threshold K into a
//! composite key (and address), and accumulates independently produced
//! member signatures into a set that is complete once K members signed.
//! No signature aggregation happens: a verifier re-checks every stored
//! signature against its member key.
//!
//! # Example
//!
//! ```
//! use hbc_sdk::crypto::KeyPair;
//! use hbc_sdk::multisig::CompositeKey;
//!
//! let keys: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
//! let composite = CompositeKey::new(keys.iter().map(|k| k.public_key()).collect(), 2).unwrap();
//!
//! let message = b"sign bytes";
//! let set = composite
//!     .new_signature_set()
//!     .add_signature(&keys[0].sign(message), &keys[0].public_key(), message)
//!     .unwrap()
//!     .add_signature(&keys[1].sign(message), &keys[1].public_key(), message)
//!     .unwrap();
//!
//! assert!(set.is_complete());
//! assert!(composite.verify(message, &set).is_ok());
//! ```

mod amino;
pub mod key;
pub mod signature;

pub use key::{CompositeKey, MultisigError};
pub use signature::SignatureSet;
