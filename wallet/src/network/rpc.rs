//! # JSON-RPC Node Client
//!
//! A minimal client for the node's public JSON-RPC 2.0 API. Only the two
//! calls the wallet core needs are wired up:
//!
//! | Method            | Params                 | Used for                   |
//! |-------------------|------------------------|----------------------------|
//! | `get_status`      | `[]`                   | `next_slot.period`         |
//! | `send_operations` | `[[SignedOperation…]]` | batch submission, ids back |
//!
//! Everything else in a status response is ignored.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{NodeClient, OperationId, PeriodContext, RpcError};
use crate::config::ClientConfig;
use crate::transaction::signing::SignedOperation;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// A block slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Slot {
    pub period: u64,
    pub thread: u8,
}

/// The subset of `get_status` the wallet reads.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeStatus {
    pub next_slot: Slot,
    #[serde(default)]
    pub node_id: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

// ---------------------------------------------------------------------------
// JsonRpcNodeClient
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct JsonRpcNodeClient {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcNodeClient {
    /// Build a client for `config.rpc_url` with `config.request_timeout`.
    pub fn new(config: &ClientConfig) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            url: config.rpc_url.clone(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };
        debug!(method, id, url = %self.url, "rpc call");

        let response = self.client.post(&self.url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(RpcError::Transport(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let body: JsonRpcResponse<T> = response.json().await?;
        if let Some(error) = body.error {
            return Err(RpcError::Node {
                code: error.code,
                message: error.message,
            });
        }
        body.result
            .ok_or_else(|| RpcError::MalformedResponse(format!("missing result for {method}")))
    }

    pub async fn get_status(&self) -> Result<NodeStatus, RpcError> {
        self.call("get_status", json!([])).await
    }
}

#[async_trait]
impl NodeClient for JsonRpcNodeClient {
    async fn current_period(&self) -> Result<PeriodContext, RpcError> {
        let status = self.get_status().await?;
        Ok(PeriodContext {
            current_period: status.next_slot.period,
        })
    }

    async fn send_operations(
        &self,
        operations: &[SignedOperation],
    ) -> Result<Vec<OperationId>, RpcError> {
        let ids: Vec<OperationId> = self
            .call("send_operations", json!([operations]))
            .await?;
        info!(count = ids.len(), "operations submitted");
        Ok(ids)
    }
}
