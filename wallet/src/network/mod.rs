//! # Network Module
//!
//! The wallet core computes nothing about chain state. It needs exactly two
//! things from a node:
//!
//! 1. the current period, to pick an expiry for new operations;
//! 2. a way to submit a batch of signed operations and get their ids back.
//!
//! Both sit behind [`NodeClient`]. [`rpc::JsonRpcNodeClient`] implements it
//! over the node's public JSON-RPC API; tests use in-memory mocks.
//!
//! Nothing here retries. A failure is returned to the caller as-is.

pub mod rpc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transaction::signing::SignedOperation;

pub use rpc::JsonRpcNodeClient;

/// Identifier the node assigns to an accepted operation. Opaque to us.
pub type OperationId = String;

/// Snapshot of the node's notion of "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodContext {
    pub current_period: u64,
}

/// Failures talking to a node.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// Connection, timeout, or HTTP-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Node { code: i64, message: String },

    /// The node answered with something we could not interpret.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for RpcError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RpcError::MalformedResponse(err.to_string())
        } else {
            RpcError::Transport(err.to_string())
        }
    }
}

/// The node as seen by the transaction builder.
#[async_trait]
pub trait NodeClient: Send + Sync {
    async fn current_period(&self) -> Result<PeriodContext, RpcError>;

    /// Submit `operations` in one call. Ids come back in the node's order.
    async fn send_operations(
        &self,
        operations: &[SignedOperation],
    ) -> Result<Vec<OperationId>, RpcError>;
}
