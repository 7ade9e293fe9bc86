//! # Key Store
//!
//! The in-memory set of accounts a wallet client works with.
//!
//! ## Invariants
//!
//! - Accounts are unique by [`normalize`]d address and kept in insertion
//!   order. The stored address text is never rewritten.
//! - At most [`MAX_WALLET_ACCOUNTS`] entries.
//! - At most one base account, and it is always one of the stored entries.
//!
//! ## Concurrency
//!
//! All state sits behind one `parking_lot::RwLock`. Every mutation, including
//! its capacity check, runs under a single write guard, so two concurrent
//! batches cannot both pass the check against a stale size. Readers see
//! either the old or the new state. Validation and key derivation happen
//! before the lock is taken.
//!
//! ## Capacity
//!
//! The check is deliberately coarse: a batch is rejected when
//! `len + batch.len()` exceeds the limit, counting duplicates in the batch.
//! It is all-or-nothing; a rejected batch leaves the store untouched.

use std::collections::HashSet;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::debug;

use crate::config::MAX_WALLET_ACCOUNTS;
use crate::crypto::keys::KeyError;
use crate::identity::account::{Account, AccountError};
use crate::identity::address::normalize;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyStoreError {
    #[error("Maximum number of allowed wallet accounts exceeded {max}")]
    CapacityExceeded { max: usize },

    #[error("invalid account {address}: {reason}")]
    InvalidAccount {
        address: String,
        #[source]
        reason: AccountError,
    },

    /// A secret key in an import batch could not be parsed.
    #[error(transparent)]
    Key(#[from] KeyError),
}

// ---------------------------------------------------------------------------
// KeyStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Inner {
    accounts: Vec<Account>,
    /// Normalized address of the base account.
    base: Option<String>,
}

impl Inner {
    fn position(&self, key: &str) -> Option<usize> {
        self.accounts
            .iter()
            .position(|account| normalize(&account.address) == key)
    }
}

/// Capacity-bounded, de-duplicated account collection with a base account.
#[derive(Debug)]
pub struct KeyStore {
    inner: RwLock<Inner>,
    capacity: usize,
}

impl Default for KeyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyStore {
    /// An empty store holding up to [`MAX_WALLET_ACCOUNTS`] accounts.
    pub fn new() -> Self {
        Self::with_capacity(MAX_WALLET_ACCOUNTS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert accounts, skipping any whose address is already stored or
    /// appeared earlier in the batch.
    ///
    /// Watch-only accounts are accepted. Returns the accounts actually added,
    /// in batch order.
    pub fn add_accounts(&self, accounts: Vec<Account>) -> Result<Vec<Account>, KeyStoreError> {
        for account in &accounts {
            account
                .validate()
                .map_err(|reason| KeyStoreError::InvalidAccount {
                    address: account.address.clone(),
                    reason,
                })?;
        }

        let mut inner = self.inner.write();
        if inner.accounts.len() + accounts.len() > self.capacity {
            return Err(KeyStoreError::CapacityExceeded { max: self.capacity });
        }

        let mut seen: HashSet<String> = inner
            .accounts
            .iter()
            .map(|account| normalize(&account.address))
            .collect();
        let mut added = Vec::new();
        for account in accounts {
            if seen.insert(normalize(&account.address)) {
                inner.accounts.push(account.clone());
                added.push(account);
            }
        }

        debug!(added = added.len(), total = inner.accounts.len(), "accounts added");
        Ok(added)
    }

    /// Derive an account from each `S…` secret key and add them.
    ///
    /// Any unparsable key fails the whole batch before anything is stored.
    pub fn add_secret_keys<K: AsRef<str>>(
        &self,
        secret_keys: &[K],
    ) -> Result<Vec<Account>, KeyStoreError> {
        let accounts = secret_keys
            .iter()
            .map(|key| Account::from_secret_key(key.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| match err {
                AccountError::Key(key) => KeyStoreError::Key(key),
                reason => KeyStoreError::InvalidAccount {
                    address: String::new(),
                    reason,
                },
            })?;
        self.add_accounts(accounts)
    }

    /// Remove every account matching one of `addresses`, ignoring case.
    ///
    /// Unknown addresses are ignored. Removing the base account clears the
    /// base. Returns the number of accounts removed.
    pub fn remove_by_addresses<A: AsRef<str>>(&self, addresses: &[A]) -> usize {
        let keys: HashSet<String> = addresses.iter().map(|a| normalize(a.as_ref())).collect();

        let mut inner = self.inner.write();
        let before = inner.accounts.len();
        inner
            .accounts
            .retain(|account| !keys.contains(&normalize(&account.address)));
        if inner.base.as_ref().is_some_and(|base| keys.contains(base)) {
            inner.base = None;
        }
        let removed = before - inner.accounts.len();

        debug!(removed, total = inner.accounts.len(), "accounts removed");
        removed
    }

    /// Case-insensitive lookup.
    pub fn get_by_address(&self, address: &str) -> Option<Account> {
        let inner = self.inner.read();
        let key = normalize(address);
        inner.position(&key).map(|i| inner.accounts[i].clone())
    }

    /// Make `account` the default signer.
    ///
    /// The account must hold a secret key and be self-consistent. If it is
    /// not stored yet it is added; if a watch-only record for the same address
    /// is stored, it is replaced by `account`. The previous base stays in the
    /// store.
    pub fn set_base_account(&self, account: Account) -> Result<(), KeyStoreError> {
        account
            .validate_signer()
            .map_err(|reason| KeyStoreError::InvalidAccount {
                address: account.address.clone(),
                reason,
            })?;

        let key = normalize(&account.address);
        let mut inner = self.inner.write();
        match inner.position(&key) {
            Some(i) => {
                if inner.accounts[i].is_watch_only() {
                    inner.accounts[i] = account;
                }
            }
            None => {
                if inner.accounts.len() + 1 > self.capacity {
                    return Err(KeyStoreError::CapacityExceeded { max: self.capacity });
                }
                inner.accounts.push(account);
            }
        }
        inner.base = Some(key);

        debug!(total = inner.accounts.len(), "base account set");
        Ok(())
    }

    pub fn base_account(&self) -> Option<Account> {
        let inner = self.inner.read();
        let base = inner.base.as_ref()?;
        inner.position(base).map(|i| inner.accounts[i].clone())
    }

    /// Remove every account and the base flag.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.accounts.clear();
        inner.base = None;
        debug!("key store cleared");
    }

    /// Snapshot of all accounts in insertion order.
    pub fn accounts(&self) -> Vec<Account> {
        self.inner.read().accounts.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
