//! Operation submission pipeline.
//!
//! Every submission walks the same stages:
//!
//! ```text
//! BUILD ──▶ SIGN ──▶ SUBMIT ──▶ DONE
//!   │        │         │
//!   └────────┴─────────┴──────▶ FAILED
//! ```
//!
//! - **BUILD** resolves the signer and asks the node for the current period
//!   exactly once. Every operation in the batch gets
//!   `expire_period = current_period + validity_window`.
//! - **SIGN** serializes and signs each operation (see [`super::signing`]).
//! - **SUBMIT** hands the whole batch to the node in one call and returns the
//!   ids untouched.
//!
//! A failure in BUILD or SIGN means nothing was sent. Nothing is retried; if
//! the expiry goes stale before SUBMIT, the node's rejection is returned.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use super::signing::{sign_operation, SignedOperation};
use super::types::OperationRequest;
use crate::config::DEFAULT_VALIDITY_WINDOW;
use crate::crypto::signatures::{Ed25519, SignatureError, SignatureScheme, SigningEngine};
use crate::identity::account::Account;
use crate::network::{NodeClient, OperationId, RpcError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("No tx sender available")]
    NoSigner,

    #[error("no operations to submit")]
    EmptyBatch,

    /// `current_period + validity_window` does not fit in a u64.
    #[error("expiry period overflows")]
    ExpiryOverflow,

    #[error("signing failed: {0}")]
    Sign(#[from] SignatureError),

    #[error(transparent)]
    Rpc(#[from] RpcError),
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Build,
    Sign,
    Submit,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build => write!(f, "BUILD"),
            Self::Sign => write!(f, "SIGN"),
            Self::Submit => write!(f, "SUBMIT"),
            Self::Done => write!(f, "DONE"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Builds, signs and submits operations against one node.
pub struct TransactionBuilder<N: ?Sized, S = Ed25519> {
    node: Arc<N>,
    engine: SigningEngine<S>,
    validity_window: u64,
}

impl<N: NodeClient + ?Sized> TransactionBuilder<N, Ed25519> {
    pub fn new(node: Arc<N>) -> Self {
        Self::with_engine(node, SigningEngine::new())
    }
}

impl<N: NodeClient + ?Sized, S: SignatureScheme> TransactionBuilder<N, S> {
    pub fn with_engine(node: Arc<N>, engine: SigningEngine<S>) -> Self {
        Self {
            node,
            engine,
            validity_window: DEFAULT_VALIDITY_WINDOW,
        }
    }

    /// Periods added to the node's current period. Defaults to 5.
    pub fn validity_window(mut self, periods: u64) -> Self {
        self.validity_window = periods;
        self
    }

    pub fn engine(&self) -> &SigningEngine<S> {
        &self.engine
    }

    /// BUILD and SIGN only. Returns operations ready for submission; nothing
    /// is sent.
    pub async fn prepare(
        &self,
        requests: Vec<OperationRequest>,
        signer: Option<&Account>,
    ) -> Result<Vec<SignedOperation>, TransactionError> {
        let result = self.build_and_sign(requests, signer).await;
        if let Err(error) = &result {
            debug!(stage = %Stage::Failed, %error, "operation preparation failed");
        }
        result
    }

    /// Full pipeline: BUILD, SIGN, SUBMIT.
    pub async fn submit(
        &self,
        requests: Vec<OperationRequest>,
        signer: Option<&Account>,
    ) -> Result<Vec<OperationId>, TransactionError> {
        let result = self.run(requests, signer).await;
        match &result {
            Ok(ids) => debug!(stage = %Stage::Done, count = ids.len(), "operations submitted"),
            Err(error) => debug!(stage = %Stage::Failed, %error, "operation submission failed"),
        }
        result
    }

    async fn run(
        &self,
        requests: Vec<OperationRequest>,
        signer: Option<&Account>,
    ) -> Result<Vec<OperationId>, TransactionError> {
        let signed = self.build_and_sign(requests, signer).await?;

        debug!(stage = %Stage::Submit, count = signed.len());
        let ids = self.node.send_operations(&signed).await?;
        info!(count = ids.len(), "node accepted operations");
        Ok(ids)
    }

    async fn build_and_sign(
        &self,
        requests: Vec<OperationRequest>,
        signer: Option<&Account>,
    ) -> Result<Vec<SignedOperation>, TransactionError> {
        debug!(stage = %Stage::Build, count = requests.len());
        let signer = signer.ok_or(TransactionError::NoSigner)?;
        if requests.is_empty() {
            return Err(TransactionError::EmptyBatch);
        }

        let context = self.node.current_period().await?;
        let expire_period = context
            .current_period
            .checked_add(self.validity_window)
            .ok_or(TransactionError::ExpiryOverflow)?;
        let operations: Vec<_> = requests
            .into_iter()
            .map(|request| request.into_operation(expire_period))
            .collect();

        debug!(stage = %Stage::Sign, signer = %signer.address, expire_period);
        let signed = operations
            .iter()
            .map(|operation| sign_operation(&self.engine, operation, signer))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(signed)
    }
}
