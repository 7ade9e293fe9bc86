// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Massa Wallet CLI
//!
//! Entry point for the `massa-wallet-cli` binary. Parses CLI arguments,
//! initializes logging, and runs one command.
//!
//! Offline: `generate`, `inspect`, `address`, `sign`, `verify`, `decode`.
//! Against the node: `transfer`, `buy-rolls`, `sell-rolls`, `status`.
//!
//! Results are printed to stdout as JSON; logs go to stderr.

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;

use massa_wallet::client::{TransferRequest, WalletClient};
use massa_wallet::config::{ClientConfig, THREAD_COUNT};
use massa_wallet::crypto::keys::PublicKey;
use massa_wallet::crypto::signatures::SigningEngine;
use massa_wallet::identity::account::Account;
use massa_wallet::identity::address::derive_address;
use massa_wallet::network::JsonRpcNodeClient;
use massa_wallet::transaction::types::Operation;

use cli::{Commands, SignerArgs, WalletCli};
use logging::LogFormat;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = WalletCli::parse();
    logging::init_logging(
        "massa_wallet=info,massa_wallet_cli=info",
        LogFormat::from_str_lossy(&cli.log_format),
    );

    let config = ClientConfig {
        rpc_url: cli.rpc_url.clone(),
        validity_window: cli.validity_window,
        ..ClientConfig::default()
    };
    config.validate().context("invalid client configuration")?;

    match cli.command {
        Commands::Generate => print_json(&Account::generate()),
        Commands::Inspect(args) => {
            let account = signer(&args)?;
            print_json(&json!({
                "address": account.address,
                "public_key": account.public_key,
                "thread": account.created_in_thread,
            }))
        }
        Commands::Address(args) => {
            let public_key: PublicKey = args.public_key.parse().context("invalid public key")?;
            let address = derive_address(&public_key);
            print_json(&json!({
                "address": address.to_string(),
                "thread": address.thread(THREAD_COUNT),
            }))
        }
        Commands::Sign(args) => {
            let account = signer(&args.signer)?;
            let signature = SigningEngine::new()
                .sign(&args.message, &account)
                .context("signing failed")?;
            print_json(&json!({
                "public_key": account.public_key,
                "signature": signature.to_string(),
            }))
        }
        Commands::Verify(args) => {
            let valid = SigningEngine::new()
                .verify(&args.message, &args.signature, &args.public_key)
                .context("verification failed")?;
            print_json(&json!({ "valid": valid }))
        }
        Commands::Decode(args) => print_json(&decode_operation(&args.payload)?),
        Commands::Transfer(args) => {
            let account = signer(&args.signer)?;
            let client = WalletClient::connect(&config)?;
            let request = TransferRequest {
                fee: args.fee,
                amount: args.amount,
                recipient_address: args.recipient,
            };
            let ids = client
                .send_transaction(&request, Some(&account))
                .await
                .context("transfer failed")?;
            print_json(&json!({ "operation_ids": ids }))
        }
        Commands::BuyRolls(args) => {
            let account = signer(&args.signer)?;
            let client = WalletClient::connect(&config)?;
            let ids = client
                .buy_rolls(args.fee, args.count, Some(&account))
                .await
                .context("roll purchase failed")?;
            print_json(&json!({ "operation_ids": ids }))
        }
        Commands::SellRolls(args) => {
            let account = signer(&args.signer)?;
            let client = WalletClient::connect(&config)?;
            let ids = client
                .sell_rolls(args.fee, args.count, Some(&account))
                .await
                .context("roll sale failed")?;
            print_json(&json!({ "operation_ids": ids }))
        }
        Commands::Status => {
            let node = JsonRpcNodeClient::new(&config)?;
            let status = node
                .get_status()
                .await
                .with_context(|| format!("failed to query {}", node.url()))?;
            print_json(&json!({
                "node_id": status.node_id,
                "version": status.version,
                "next_slot": {
                    "period": status.next_slot.period,
                    "thread": status.next_slot.thread,
                },
            }))
        }
    }
}

fn signer(args: &SignerArgs) -> Result<Account> {
    Account::from_secret_key(&args.secret_key).context("invalid secret key")
}

fn decode_operation(payload: &str) -> Result<Operation> {
    let bytes = hex::decode(payload.trim_start_matches("0x")).context("payload is not valid hex")?;
    Operation::from_bytes(&bytes).context("malformed operation")
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
