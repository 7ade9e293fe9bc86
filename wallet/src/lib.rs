// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Massa Wallet Core Library
//!
//! Accounts, addresses and operation signing for Massa clients. The library
//! holds keys, turns them into the network's textual formats, encodes
//! operations into their canonical bytes, signs them, and hands them to a
//! node.
//!
//! ## Architecture
//!
//! - **crypto**: Ed25519 keys, BLAKE3, Base58Check with version prefixes.
//! - **identity**: addresses (`AU…`/`AS…`) and the account record.
//! - **vault**: the in-memory key store with its base account.
//! - **transaction**: operation types, wire codec, signing, submission.
//! - **network**: the `NodeClient` seam and a JSON-RPC implementation.
//! - **client**: `WalletClient`, the facade tying the rest together.
//! - **config**: format constants and client settings.
//! - **varint**: unsigned LEB128, shared by every encoder.
//!
//! ## Ground rules
//!
//! 1. Every textual key and address carries a checksum; a bad one is rejected.
//! 2. Secret material is zeroized on drop and never logged.
//! 3. Amounts are `u64` in the smallest unit. No floating point anywhere.
//! 4. The library never retries; failures come back to the caller as-is.

pub mod client;
pub mod config;
pub mod crypto;
pub mod identity;
pub mod network;
pub mod transaction;
pub mod varint;
pub mod vault;

pub use client::{CallRequest, ClientError, ExecuteRequest, TransferRequest, WalletClient};
pub use config::ClientConfig;
pub use crypto::{PublicKey, SecretKey, Signature, SigningEngine};
pub use identity::{Account, Address, AddressKind};
pub use network::{JsonRpcNodeClient, NodeClient, OperationId, PeriodContext, RpcError};
pub use transaction::{Operation, OperationKind, OperationRequest, SignedOperation};
pub use vault::KeyStore;
