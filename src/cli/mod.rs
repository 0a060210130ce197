//! Command handlers for the `hbc` binary

pub mod commands;

pub use commands::{
    cmd_address, cmd_merge, cmd_multisig_address, cmd_partial_sign, cmd_sign_transfer,
    cmd_validate_address, load_config, parse_composite, CliResult,
};
