//! HBC signer CLI
//!
//! Derives addresses and signs transfers offline. Output envelopes are
//! submitted by whatever broadcaster the operator uses.

use clap::{Args, Parser, Subcommand};
use hbc_sdk::cli;
use hbc_sdk::wallet::TransferRequest;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hbc")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "Offline address and transaction signing for the HBC chain", long_about = None)]
struct Cli {
    /// JSON file overriding the transaction defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Chain id to sign for
    #[arg(long, global = true)]
    chain_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the address of a private key
    Address {
        /// Private key (64 hex digits)
        #[arg(short, long)]
        private_key: String,
    },

    /// Show the address of a threshold group
    MultisigAddress {
        /// Member public keys in group order, comma separated
        #[arg(short = 'k', long, value_delimiter = ',', required = true)]
        pubkeys: Vec<String>,

        /// Signatures required
        #[arg(short, long)]
        threshold: usize,
    },

    /// Check an address string
    ValidateAddress {
        address: String,
    },

    /// Sign a transfer with a single key
    SignTransfer {
        #[arg(short, long)]
        private_key: String,

        #[command(flatten)]
        transfer: TransferArgs,
    },

    /// Produce this member's partial signature for a group transfer
    PartialSign {
        #[arg(short, long)]
        private_key: String,

        #[arg(short = 'k', long, value_delimiter = ',', required = true)]
        pubkeys: Vec<String>,

        #[arg(short, long)]
        threshold: usize,

        #[command(flatten)]
        transfer: TransferArgs,
    },

    /// Merge a peer's partial signature with this member's and assemble
    Merge {
        #[arg(short, long)]
        private_key: String,

        /// File holding the peer's partial signature set
        #[arg(long)]
        partial: PathBuf,

        #[command(flatten)]
        transfer: TransferArgs,
    },
}

#[derive(Args)]
struct TransferArgs {
    /// Sender address (the group address for multisig)
    #[arg(short, long)]
    from: String,

    /// Recipient address
    #[arg(long)]
    to: String,

    /// Amount in base units
    #[arg(short, long)]
    amount: String,

    /// Denomination to send
    #[arg(short, long, default_value = "hbc")]
    denom: String,

    /// Fee in base units; raised to the configured minimum
    #[arg(long, default_value = "0")]
    fee: String,

    #[arg(short, long, default_value = "")]
    memo: String,

    /// Account sequence number
    #[arg(short, long)]
    sequence: u64,
}

impl From<TransferArgs> for TransferRequest {
    fn from(args: TransferArgs) -> Self {
        Self {
            denom: args.denom,
            from: args.from,
            to: args.to,
            memo: args.memo,
            amount: args.amount,
            fee: args.fee,
            sequence: args.sequence,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli::load_config(cli.config.as_deref(), cli.chain_id.as_deref())?;

    match cli.command {
        Commands::Address { private_key } => {
            cli::cmd_address(&private_key)?;
        }

        Commands::MultisigAddress { pubkeys, threshold } => {
            cli::cmd_multisig_address(&pubkeys, threshold)?;
        }

        Commands::ValidateAddress { address } => {
            cli::cmd_validate_address(&address)?;
        }

        Commands::SignTransfer {
            private_key,
            transfer,
        } => {
            cli::cmd_sign_transfer(&config, &private_key, &transfer.into())?;
        }

        Commands::PartialSign {
            private_key,
            pubkeys,
            threshold,
            transfer,
        } => {
            let composite = cli::parse_composite(&pubkeys, threshold)?;
            cli::cmd_partial_sign(&config, &private_key, &composite, &transfer.into())?;
        }

        Commands::Merge {
            private_key,
            partial,
            transfer,
        } => {
            cli::cmd_merge(&config, &private_key, &partial, &transfer.into())?;
        }
    }

    Ok(())
}
