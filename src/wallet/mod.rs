//! Wallet module for key holders and signing flows

pub mod wallet;

pub use wallet::{
    build_unsigned_transfer, check_private_key_address, encode_envelope, package_multisig,
    send_transfer, TransferRequest, Wallet, WalletError, WalletInfo,
};
