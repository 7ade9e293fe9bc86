//! # Accounts
//!
//! An [`Account`] is the record the key store holds and the wallet API hands
//! out: the textual address, public key and (optionally) secret key, plus the
//! thread the address lives in.
//!
//! Accounts are plain data so callers can build them however they like
//! (JSON import, a UI form, a test fixture). That freedom means an account
//! can lie, so [`Account::validate`] re-derives everything it can and rejects
//! any mismatch before the account is trusted:
//!
//! - secret key present: public key must be present and derived from it.
//! - public key present: address must be derived from it.
//! - `created_in_thread` must match the address digest.
//!
//! An account without a secret key is watch-only. It can be stored and looked
//! up, never used to sign.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

use super::address::{decode_address, derive_address, Address, AddressError};
use crate::config::THREAD_COUNT;
use crate::crypto::keys::{KeyError, KeyPair, PublicKey, SecretKey};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Ways an account record can be inconsistent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("account has no secret key")]
    MissingSecretKey,

    #[error("account has no public key")]
    MissingPublicKey,

    #[error("public key does not match secret key")]
    PublicKeyMismatch,

    #[error("address does not match public key")]
    AddressMismatch,

    #[error("created_in_thread {stored} does not match address thread {derived}")]
    ThreadMismatch { stored: u8, derived: u8 },

    /// Only user addresses can belong to an account.
    #[error("account address must be a user address")]
    NotUserAddress,

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Address(#[from] AddressError),
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: String,
    pub public_key: Option<String>,
    pub secret_key: Option<Zeroizing<String>>,
    pub created_in_thread: u8,
}

impl Account {
    /// A fresh account backed by a newly generated key.
    pub fn generate() -> Self {
        Self::from_keypair(&KeyPair::generate())
    }

    pub fn from_keypair(keypair: &KeyPair) -> Self {
        let address = derive_address(keypair.public());
        Self {
            address: address.to_string(),
            public_key: Some(keypair.public().to_string()),
            secret_key: Some(keypair.secret().to_text()),
            created_in_thread: address.thread(THREAD_COUNT),
        }
    }

    /// Import from an `S…` secret key, deriving everything else.
    pub fn from_secret_key(secret_key: &str) -> Result<Self, AccountError> {
        Ok(Self::from_keypair(&KeyPair::from_secret_text(secret_key)?))
    }

    /// A watch-only account for `public_key`.
    pub fn watch_only(public_key: &PublicKey) -> Self {
        let address = derive_address(public_key);
        Self {
            address: address.to_string(),
            public_key: Some(public_key.to_string()),
            secret_key: None,
            created_in_thread: address.thread(THREAD_COUNT),
        }
    }

    pub fn is_watch_only(&self) -> bool {
        self.secret_key.is_none()
    }

    /// Check the record is internally consistent. Watch-only accounts pass.
    pub fn validate(&self) -> Result<(), AccountError> {
        let address = decode_address(&self.address)?;
        if !address.is_user() {
            return Err(AccountError::NotUserAddress);
        }

        let public_key = match (&self.public_key, &self.secret_key) {
            (None, Some(_)) => return Err(AccountError::MissingPublicKey),
            (None, None) => None,
            (Some(text), secret) => {
                let public_key = PublicKey::from_text(text)?;
                if let Some(secret) = secret {
                    let derived = SecretKey::from_text(secret)?.public_key();
                    if derived != public_key {
                        return Err(AccountError::PublicKeyMismatch);
                    }
                }
                Some(public_key)
            }
        };

        if let Some(public_key) = public_key {
            if derive_address(&public_key) != address {
                return Err(AccountError::AddressMismatch);
            }
        }

        let derived = address.thread(THREAD_COUNT);
        if derived != self.created_in_thread {
            return Err(AccountError::ThreadMismatch {
                stored: self.created_in_thread,
                derived,
            });
        }
        Ok(())
    }

    /// [`validate`](Self::validate), and additionally require a secret key.
    pub fn validate_signer(&self) -> Result<(), AccountError> {
        if self.secret_key.is_none() {
            return Err(AccountError::MissingSecretKey);
        }
        self.validate()
    }

    /// Parsed address.
    pub fn parsed_address(&self) -> Result<Address, AddressError> {
        decode_address(&self.address)
    }

    /// Rebuild the key pair. Fails for watch-only accounts.
    pub fn keypair(&self) -> Result<KeyPair, AccountError> {
        let secret = self
            .secret_key
            .as_ref()
            .ok_or(AccountError::MissingSecretKey)?;
        Ok(KeyPair::from_secret_text(secret)?)
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .field(
                "secret_key",
                &self.secret_key.as_ref().map(|_| "<redacted>"),
            )
            .field("created_in_thread", &self.created_in_thread)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "S12syP5uCVEwaJwvXLqJyD1a2GqZjsup13UnhY6uzbtyu7ExXWZS";
    const PUBLIC: &str = "P12c2wsKxEyAhPC4ouNsgywzM41VsNSuwH9JdMbRt9bM8ZsMLPQA";
    const ADDRESS: &str = "AU12KgrLq2vhMgi8aAwbxytiC4wXBDGgvTtqGTM5R7wEB9En8WBHB";

    #[test]
    fn test_from_secret_key_golden() {
        let account = Account::from_secret_key(SECRET).unwrap();
        assert_eq!(account.address, ADDRESS);
        assert_eq!(account.public_key.as_deref(), Some(PUBLIC));
        assert_eq!(account.secret_key.as_deref().map(String::as_str), Some(SECRET));
        assert_eq!(account.created_in_thread, 21);
        account.validate_signer().unwrap();
    }

    #[test]
    fn test_generated_account_is_consistent() {
        let account = Account::generate();
        assert!(account.address.starts_with("AU"));
        assert!(account.created_in_thread < THREAD_COUNT);
        account.validate_signer().unwrap();
    }

    #[test]
    fn test_watch_only_validates_but_cannot_sign() {
        let pk = PublicKey::from_text(PUBLIC).unwrap();
        let account = Account::watch_only(&pk);
        assert!(account.is_watch_only());
        account.validate().unwrap();
        assert_eq!(account.validate_signer(), Err(AccountError::MissingSecretKey));
        assert!(matches!(
            account.keypair(),
            Err(AccountError::MissingSecretKey)
        ));
    }

    #[test]
    fn test_mismatched_public_key_rejected() {
        let mut account = Account::from_secret_key(SECRET).unwrap();
        account.public_key = Some(Account::generate().public_key.unwrap());
        assert_eq!(account.validate(), Err(AccountError::PublicKeyMismatch));
    }

    #[test]
    fn test_mismatched_address_rejected() {
        let mut account = Account::from_secret_key(SECRET).unwrap();
        let other = Account::generate();
        account.address = other.address;
        account.created_in_thread = other.created_in_thread;
        assert_eq!(account.validate(), Err(AccountError::AddressMismatch));
    }

    #[test]
    fn test_secret_without_public_rejected() {
        let mut account = Account::from_secret_key(SECRET).unwrap();
        account.public_key = None;
        assert_eq!(account.validate(), Err(AccountError::MissingPublicKey));
    }

    #[test]
    fn test_wrong_thread_rejected() {
        let mut account = Account::from_secret_key(SECRET).unwrap();
        account.created_in_thread = 3;
        assert_eq!(
            account.validate(),
            Err(AccountError::ThreadMismatch {
                stored: 3,
                derived: 21
            })
        );
    }

    #[test]
    fn test_garbage_address_rejected() {
        let mut account = Account::from_secret_key(SECRET).unwrap();
        account.address = "not an address".to_string();
        assert!(matches!(
            account.validate(),
            Err(AccountError::Address(AddressError::InvalidFormat(_)))
        ));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let account = Account::from_secret_key(SECRET).unwrap();
        let rendered = format!("{account:?}");
        assert!(!rendered.contains(SECRET));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains(ADDRESS));
    }

    #[test]
    fn test_keypair_roundtrip() {
        let account = Account::from_secret_key(SECRET).unwrap();
        let kp = account.keypair().unwrap();
        assert_eq!(kp.public().to_string(), PUBLIC);
    }
}
