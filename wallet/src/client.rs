//! # Wallet Client
//!
//! The surface applications talk to. A [`WalletClient`] owns one
//! [`KeyStore`] and one [`TransactionBuilder`]; nothing is global, and
//! dropping the client drops (and zeroizes) every secret it held.
//!
//! ## Signer resolution
//!
//! Operations take an optional explicit signer. Without one, the base account
//! signs. With neither, submission fails with "No tx sender available" before
//! the node is contacted.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ClientConfig, ConfigError};
use crate::crypto::signatures::{Signature, SignatureError, SigningEngine};
use crate::identity::account::{Account, AccountError};
use crate::identity::address::{decode_address, AddressError};
use crate::network::{JsonRpcNodeClient, NodeClient, OperationId, RpcError};
use crate::transaction::builder::{TransactionBuilder, TransactionError};
use crate::transaction::signing::SignedOperation;
use crate::transaction::types::{Datastore, OperationKind, OperationRequest};
use crate::vault::keystore::{KeyStore, KeyStoreError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("No signer account {0} found in wallet")]
    SignerNotFound(String),

    #[error("no base account set")]
    NoBaseAccount,

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    KeyStore(#[from] KeyStoreError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// A coin transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub fee: u64,
    pub amount: u64,
    /// `AU…` or `AS…` text; decoded before anything is built.
    pub recipient_address: String,
}

/// A call into a deployed contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub fee: u64,
    pub max_gas: u64,
    pub coins: u64,
    pub target_address: String,
    pub function: String,
    pub parameter: Vec<u8>,
}

/// Bytecode execution, typically a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteRequest {
    pub fee: u64,
    pub max_gas: u64,
    pub max_coins: u64,
    pub bytecode: Vec<u8>,
    pub datastore: Datastore,
}

// ---------------------------------------------------------------------------
// WalletClient
// ---------------------------------------------------------------------------

pub struct WalletClient<N: NodeClient + ?Sized> {
    store: KeyStore,
    builder: TransactionBuilder<N>,
}

impl WalletClient<JsonRpcNodeClient> {
    /// A client talking JSON-RPC to `config.rpc_url`.
    pub fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let node = JsonRpcNodeClient::new(config)?;
        Self::new(Arc::new(node), config)
    }
}

impl<N: NodeClient + ?Sized> WalletClient<N> {
    /// A client with an empty key store using `node` as its collaborator.
    pub fn new(node: Arc<N>, config: &ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        debug!(
            rpc_url = %config.rpc_url,
            validity_window = config.validity_window,
            "wallet client created"
        );
        Ok(Self {
            store: KeyStore::new(),
            builder: TransactionBuilder::new(node).validity_window(config.validity_window),
        })
    }

    // -- Account lifecycle --------------------------------------------------

    /// A brand new account. Not added to the store.
    pub fn generate_account() -> Account {
        Account::generate()
    }

    /// Derive the full account behind an `S…` secret key. Not added to the
    /// store.
    pub fn account_from_secret_key(secret_key: &str) -> Result<Account, ClientError> {
        Ok(Account::from_secret_key(secret_key)?)
    }

    pub fn key_store(&self) -> &KeyStore {
        &self.store
    }

    pub fn add_accounts(&self, accounts: Vec<Account>) -> Result<Vec<Account>, ClientError> {
        Ok(self.store.add_accounts(accounts)?)
    }

    pub fn add_secret_keys<K: AsRef<str>>(
        &self,
        secret_keys: &[K],
    ) -> Result<Vec<Account>, ClientError> {
        Ok(self.store.add_secret_keys(secret_keys)?)
    }

    pub fn remove_addresses<A: AsRef<str>>(&self, addresses: &[A]) -> usize {
        self.store.remove_by_addresses(addresses)
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.store.accounts()
    }

    pub fn get_account(&self, address: &str) -> Option<Account> {
        self.store.get_by_address(address)
    }

    pub fn base_account(&self) -> Option<Account> {
        self.store.base_account()
    }

    pub fn set_base_account(&self, account: Account) -> Result<(), ClientError> {
        Ok(self.store.set_base_account(account)?)
    }

    pub fn clear(&self) {
        self.store.clear();
    }

    // -- Signing ------------------------------------------------------------

    /// Sign with the stored account at `signer_address`, or the base account.
    pub fn sign_message(
        &self,
        message: impl AsRef<[u8]>,
        signer_address: Option<&str>,
    ) -> Result<Signature, ClientError> {
        let signer = match signer_address {
            Some(address) => self
                .store
                .get_by_address(address)
                .ok_or_else(|| ClientError::SignerNotFound(address.to_string()))?,
            None => self.store.base_account().ok_or(ClientError::NoBaseAccount)?,
        };
        Ok(self.builder.engine().sign(message, &signer)?)
    }

    /// `Ok(false)` for a wrong signature; `Err` only for an unusable public key.
    pub fn verify_signature(
        &self,
        message: impl AsRef<[u8]>,
        signature: &str,
        public_key: &str,
    ) -> Result<bool, ClientError> {
        Ok(self.builder.engine().verify(message, signature, public_key)?)
    }

    pub fn signing_engine(&self) -> &SigningEngine {
        self.builder.engine()
    }

    // -- Operations ---------------------------------------------------------

    fn resolve_signer(&self, explicit: Option<&Account>) -> Option<Account> {
        explicit.cloned().or_else(|| self.store.base_account())
    }

    /// Build, sign and submit arbitrary operations in one batch.
    pub async fn send_operations(
        &self,
        requests: Vec<OperationRequest>,
        signer: Option<&Account>,
    ) -> Result<Vec<OperationId>, ClientError> {
        let signer = self.resolve_signer(signer);
        let ids = self.builder.submit(requests, signer.as_ref()).await?;
        info!(count = ids.len(), "operations sent");
        Ok(ids)
    }

    /// Build and sign without submitting.
    pub async fn prepare_operations(
        &self,
        requests: Vec<OperationRequest>,
        signer: Option<&Account>,
    ) -> Result<Vec<SignedOperation>, ClientError> {
        let signer = self.resolve_signer(signer);
        Ok(self.builder.prepare(requests, signer.as_ref()).await?)
    }

    /// Transfer coins. Returns the node's operation ids.
    pub async fn send_transaction(
        &self,
        request: &TransferRequest,
        signer: Option<&Account>,
    ) -> Result<Vec<OperationId>, ClientError> {
        let recipient = decode_address(&request.recipient_address)?;
        let operation = OperationRequest::transfer(request.fee, recipient, request.amount);
        self.send_operations(vec![operation], signer).await
    }

    pub async fn buy_rolls(
        &self,
        fee: u64,
        roll_count: u64,
        signer: Option<&Account>,
    ) -> Result<Vec<OperationId>, ClientError> {
        self.send_operations(vec![OperationRequest::roll_buy(fee, roll_count)], signer)
            .await
    }

    pub async fn sell_rolls(
        &self,
        fee: u64,
        roll_count: u64,
        signer: Option<&Account>,
    ) -> Result<Vec<OperationId>, ClientError> {
        self.send_operations(vec![OperationRequest::roll_sell(fee, roll_count)], signer)
            .await
    }

    pub async fn call_smart_contract(
        &self,
        request: &CallRequest,
        signer: Option<&Account>,
    ) -> Result<Vec<OperationId>, ClientError> {
        let target = decode_address(&request.target_address)?;
        let kind = OperationKind::CallSC {
            target,
            function: request.function.clone(),
            parameter: request.parameter.clone(),
            max_gas: request.max_gas,
            coins: request.coins,
        };
        self.send_operations(vec![OperationRequest::new(request.fee, kind)], signer)
            .await
    }

    pub async fn execute_smart_contract(
        &self,
        request: &ExecuteRequest,
        signer: Option<&Account>,
    ) -> Result<Vec<OperationId>, ClientError> {
        let kind = OperationKind::ExecuteSC {
            max_gas: request.max_gas,
            max_coins: request.max_coins,
            bytecode: request.bytecode.clone(),
            datastore: request.datastore.clone(),
        };
        self.send_operations(vec![OperationRequest::new(request.fee, kind)], signer)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::PeriodContext;
    use async_trait::async_trait;

    struct UnreachableNode;

    #[async_trait]
    impl NodeClient for UnreachableNode {
        async fn current_period(&self) -> Result<PeriodContext, RpcError> {
            Err(RpcError::Transport("connection refused".to_string()))
        }

        async fn send_operations(
            &self,
            _operations: &[SignedOperation],
        ) -> Result<Vec<OperationId>, RpcError> {
            Err(RpcError::Transport("connection refused".to_string()))
        }
    }

    fn client() -> WalletClient<UnreachableNode> {
        WalletClient::new(Arc::new(UnreachableNode), &ClientConfig::default()).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ClientConfig {
            validity_window: 0,
            ..ClientConfig::default()
        };
        assert!(matches!(
            WalletClient::new(Arc::new(UnreachableNode), &config),
            Err(ClientError::Config(ConfigError::ZeroValidityWindow))
        ));
    }

    #[test]
    fn test_sign_message_unknown_signer() {
        let err = client()
            .sign_message("Test message", Some("nonExistentSignerAddress"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "No signer account nonExistentSignerAddress found in wallet"
        );
    }

    #[test]
    fn test_sign_message_without_base() {
        assert!(matches!(
            client().sign_message("m", None),
            Err(ClientError::NoBaseAccount)
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces() {
        let client = client();
        client.set_base_account(Account::generate()).unwrap();
        let err = client.buy_rolls(0, 1, None).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Transaction(TransactionError::Rpc(RpcError::Transport(_)))
        ));
    }

    #[tokio::test]
    async fn test_bad_recipient_rejected_before_network() {
        let client = client();
        client.set_base_account(Account::generate()).unwrap();
        let request = TransferRequest {
            fee: 1,
            amount: 1,
            recipient_address: "XX123".to_string(),
        };
        assert!(matches!(
            client.send_transaction(&request, None).await,
            Err(ClientError::Address(AddressError::InvalidFormat(_)))
        ));
    }
}
