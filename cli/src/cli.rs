//! # CLI Interface
//!
//! Defines the command-line argument structure for `massa-wallet-cli` using
//! `clap` derive. Offline commands (`generate`, `inspect`, `sign`, ...) never
//! touch the network; the rest talk to the node at `--rpc-url`.

use clap::{Args, Parser, Subcommand};

use massa_wallet::config::{DEFAULT_RPC_URL, DEFAULT_VALIDITY_WINDOW};

/// Massa wallet command-line client.
///
/// Generates and inspects accounts, signs and verifies messages, and submits
/// signed operations to a node.
#[derive(Parser, Debug)]
#[command(
    name = "massa-wallet-cli",
    about = "Massa account and operation-signing client",
    version,
    propagate_version = true
)]
pub struct WalletCli {
    /// JSON-RPC endpoint of the node.
    #[arg(long, global = true, env = "MASSA_RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Periods after the current one during which new operations stay valid.
    #[arg(long, global = true, default_value_t = DEFAULT_VALIDITY_WINDOW)]
    pub validity_window: u64,

    /// Log output format: "pretty" or "json".
    #[arg(long, global = true, env = "MASSA_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a new account and print it, secret key included.
    Generate,
    /// Derive the account behind a secret key.
    Inspect(SignerArgs),
    /// Derive the address and thread of a public key.
    Address(AddressArgs),
    /// Sign a UTF-8 message.
    Sign(SignArgs),
    /// Verify a message signature.
    Verify(VerifyArgs),
    /// Decode a hex-encoded operation payload.
    Decode(DecodeArgs),
    /// Transfer coins.
    Transfer(TransferArgs),
    /// Buy rolls.
    BuyRolls(RollArgs),
    /// Sell rolls.
    SellRolls(RollArgs),
    /// Query the node's current slot.
    Status,
}

/// The signing account. Read from the environment when not passed.
#[derive(Args, Debug)]
pub struct SignerArgs {
    /// `S…` secret key of the signer.
    ///
    /// Prefer the environment variable; flags end up in shell history.
    #[arg(long, env = "MASSA_SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,
}

#[derive(Args, Debug)]
pub struct AddressArgs {
    /// `P…` public key.
    pub public_key: String,
}

#[derive(Args, Debug)]
pub struct SignArgs {
    /// Message to sign.
    pub message: String,

    #[command(flatten)]
    pub signer: SignerArgs,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Message that was signed.
    pub message: String,

    /// Base58 signature.
    pub signature: String,

    /// `P…` public key of the signer.
    pub public_key: String,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Serialized operation as hex.
    pub payload: String,
}

#[derive(Args, Debug)]
pub struct TransferArgs {
    /// `AU…` or `AS…` recipient address.
    pub recipient: String,

    /// Amount in the smallest unit.
    pub amount: u64,

    /// Fee in the smallest unit.
    #[arg(long, default_value_t = 0)]
    pub fee: u64,

    #[command(flatten)]
    pub signer: SignerArgs,
}

#[derive(Args, Debug)]
pub struct RollArgs {
    /// Number of rolls.
    pub count: u64,

    /// Fee in the smallest unit.
    #[arg(long, default_value_t = 0)]
    pub fee: u64,

    #[command(flatten)]
    pub signer: SignerArgs,
}
