//! Transaction defaults
//!
//! [`TxConfig`] is an immutable value passed to every flow that needs the
//! chain id, gas limit or fee floor. Nothing reads these from globals.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tx::BroadcastMode;

pub const DEFAULT_CHAIN_ID: &str = "hbtc-testnet";
pub const DEFAULT_GAS_LIMIT: u64 = 2_000_000;
/// Smallest fee accepted, in `DEFAULT_FEE_DENOM` base units
pub const DEFAULT_MIN_FEE: u128 = 1_000_000_000_000;
pub const DEFAULT_FEE_DENOM: &str = "hbc";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    ParseError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxConfig {
    pub chain_id: String,
    pub gas_limit: u64,
    /// Requested fees below this are raised to it
    #[serde(with = "amount_string")]
    pub min_fee: u128,
    pub fee_denom: String,
    pub broadcast_mode: BroadcastMode,
}

impl Default for TxConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID.to_string(),
            gas_limit: DEFAULT_GAS_LIMIT,
            min_fee: DEFAULT_MIN_FEE,
            fee_denom: DEFAULT_FEE_DENOM.to_string(),
            broadcast_mode: BroadcastMode::Sync,
        }
    }
}

impl TxConfig {
    /// Load from a JSON file; absent fields keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn with_chain_id(mut self, chain_id: impl Into<String>) -> Self {
        self.chain_id = chain_id.into();
        self
    }
}

/// Fee floor as a decimal string, so values beyond 2^53 survive JSON tools
mod amount_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let s = String::deserialize(deserializer)?;
        crate::tx::coin::parse_amount(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TxConfig::default();
        assert_eq!(config.chain_id, "hbtc-testnet");
        assert_eq!(config.gas_limit, 2_000_000);
        assert_eq!(config.min_fee, 1_000_000_000_000);
        assert_eq!(config.fee_denom, "hbc");
        assert_eq!(config.broadcast_mode, BroadcastMode::Sync);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("hbc.json");
        fs::write(
            &path,
            r#"{"chain_id": "hbtc-mainnet", "min_fee": "5000", "broadcast_mode": "block"}"#,
        )
        .unwrap();

        let config = TxConfig::from_file(&path).unwrap();
        assert_eq!(config.chain_id, "hbtc-mainnet");
        assert_eq!(config.min_fee, 5000);
        assert_eq!(config.broadcast_mode, BroadcastMode::Block);
        assert_eq!(config.gas_limit, DEFAULT_GAS_LIMIT);
        assert_eq!(config.fee_denom, DEFAULT_FEE_DENOM);
    }

    #[test]
    fn test_bad_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing.json");
        assert!(matches!(
            TxConfig::from_file(&missing),
            Err(ConfigError::IoError(_))
        ));

        let broken = temp_dir.path().join("broken.json");
        fs::write(&broken, r#"{"min_fee": 12}"#).unwrap();
        assert!(matches!(
            TxConfig::from_file(&broken),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_chain_id_override() {
        let config = TxConfig::default().with_chain_id("local");
        assert_eq!(config.chain_id, "local");
    }
}
