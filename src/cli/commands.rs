//! CLI commands for the HBC signer
//!
//! Implements all command handlers for the CLI interface. Signing commands
//! print JSON to stdout so the output can be piped to another party or to a
//! broadcaster; private keys are read from arguments and never written out.

use std::fs;
use std::path::Path;

use crate::address::Address;
use crate::config::TxConfig;
use crate::crypto::PublicKey;
use crate::multisig::{CompositeKey, SignatureSet};
use crate::wallet::{encode_envelope, TransferRequest, Wallet, WalletInfo};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Load the config file if given, then apply the chain id override
pub fn load_config(path: Option<&Path>, chain_id: Option<&str>) -> CliResult<TxConfig> {
    let config = match path {
        Some(path) => TxConfig::from_file(path)?,
        None => TxConfig::default(),
    };
    Ok(match chain_id {
        Some(id) => config.with_chain_id(id),
        None => config,
    })
}

/// Build a composite key from hex public keys in the given order
pub fn parse_composite(pubkeys: &[String], threshold: usize) -> CliResult<CompositeKey> {
    let keys = pubkeys
        .iter()
        .map(|k| PublicKey::from_hex(k.trim()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CompositeKey::new(keys, threshold)?)
}

/// Show the address and public key of a private key
pub fn cmd_address(private_key: &str) -> CliResult<()> {
    let wallet = Wallet::from_private_key(private_key)?;
    let info = WalletInfo::from(&wallet);
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

/// Show the address of a threshold group
pub fn cmd_multisig_address(pubkeys: &[String], threshold: usize) -> CliResult<()> {
    let composite = parse_composite(pubkeys, threshold)?;
    println!("🔐 {} multisig", composite.description());
    println!("   📍 Address: {}", composite.address());
    for (i, pk) in composite.pubkeys().iter().enumerate() {
        println!("   {}. {}", i, pk);
    }
    Ok(())
}

/// Check an address string and report why it fails
pub fn cmd_validate_address(address: &str) -> CliResult<()> {
    match Address::decode(address) {
        Ok((addr, version)) => {
            println!("✅ Valid address (version {:#04x})", version);
            println!("   Raw: {}", hex::encode(addr.as_bytes()));
        }
        Err(e) => println!("❌ Invalid address: {}", e),
    }
    Ok(())
}

/// Sign a transfer with a single key and print the broadcast envelope
pub fn cmd_sign_transfer(
    config: &TxConfig,
    private_key: &str,
    request: &TransferRequest,
) -> CliResult<()> {
    let wallet = Wallet::from_private_key(private_key)?;
    let tx = wallet.create_transaction(config, request)?;
    let envelope = encode_envelope(config, &tx)?;
    println!("{}", String::from_utf8(envelope)?);
    Ok(())
}

/// Sign as one member of a threshold group and print the partial set
pub fn cmd_partial_sign(
    config: &TxConfig,
    private_key: &str,
    composite: &CompositeKey,
    request: &TransferRequest,
) -> CliResult<()> {
    let wallet = Wallet::from_private_key(private_key)?;
    let set = wallet.partial_sign(config, request, composite)?;
    log::info!(
        "Partial set holds {}/{} signatures",
        set.len(),
        composite.threshold()
    );
    println!("{}", serde_json::to_string(&set)?);
    Ok(())
}

/// Add this key's signature to a peer's partial set and print the envelope
pub fn cmd_merge(
    config: &TxConfig,
    private_key: &str,
    partial: &Path,
    request: &TransferRequest,
) -> CliResult<()> {
    let peer: SignatureSet = serde_json::from_str(&fs::read_to_string(partial)?)?;
    let wallet = Wallet::from_private_key(private_key)?;
    let tx = wallet.merge_multisig(config, request, &peer)?;
    let envelope = encode_envelope(config, &tx)?;
    println!("{}", String::from_utf8(envelope)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUB_A: &str = "03922d2cf81982b51bb2e3073a0de4d49de7a0dc2dadee3534b4c57fa76968fe68";
    const PUB_B: &str = "03673ef1ee3170ab19847fc20cc3edcbe40f76013e54a2ff798018db058903e65f";

    #[test]
    fn test_parse_composite() {
        let composite = parse_composite(&[PUB_A.to_string(), PUB_B.to_string()], 2).unwrap();
        assert_eq!(
            composite.address().to_string(),
            "HBCTeUXgzx8eenRXmd6ztAJe4xdQmjMFUV4t"
        );
        assert!(parse_composite(&[PUB_A.to_string()], 2).is_err());
        assert!(parse_composite(&["zz".to_string()], 1).is_err());
    }

    #[test]
    fn test_load_config_override() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{"chain_id": "from-file", "gas_limit": 10}"#).unwrap();

        let config = load_config(Some(path.as_path()), Some("from-flag")).unwrap();
        assert_eq!(config.chain_id, "from-flag");
        assert_eq!(config.gas_limit, 10);

        assert_eq!(load_config(None, None).unwrap(), TxConfig::default());
    }

    #[test]
    fn test_merge_reads_partial_file() {
        let config = TxConfig::default();
        let a = "01ee5aa673f63fc906fb2dbc191438217c5e3f2646381b5e261be2d1f8479086";
        let b = "1f118af86fcab84f1a7d5204e0cdda351dcf759498e3550a858b56fc719f5521";
        let composite = parse_composite(&[PUB_A.to_string(), PUB_B.to_string()], 2).unwrap();
        let request = TransferRequest {
            denom: "hbc".into(),
            from: composite.address().to_string(),
            to: "HBCb1bg1Y2qxRhVQBUxHE7nWcuKzbM7scrwU".into(),
            memo: "payout".into(),
            amount: "10".into(),
            fee: "0".into(),
            sequence: 1,
        };

        let set = Wallet::from_private_key(a)
            .unwrap()
            .partial_sign(&config, &request, &composite)
            .unwrap();
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("partial.json");
        fs::write(&path, serde_json::to_string(&set).unwrap()).unwrap();

        assert!(cmd_merge(&config, b, &path, &request).is_ok());
        assert!(cmd_merge(&config, b, &temp_dir.path().join("missing.json"), &request).is_err());
    }
}
