//! # Addresses
//!
//! An address is the hash of a public key, wrapped in the usual
//! versioned base58-check envelope:
//!
//! ```text
//! public_key (32 bytes)
//!     -> blake3(varint(0) ‖ public_key)       -> digest (32 bytes)
//!     -> "AU" ‖ b58check(varint(0) ‖ digest)  -> AU12KgrLq2vh...
//! ```
//!
//! Smart-contract addresses use the same envelope with an `AS` prefix. The
//! wallet never derives those itself, but it must be able to decode them
//! because they appear as call targets.
//!
//! ## Case
//!
//! base58 is case-sensitive, so the stored text is always the exact encoding.
//! Lookups go through [`normalize`], which folds ASCII case. Two distinct
//! addresses colliding under case folding is not a practical concern for
//! 32-byte digests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::config::{
    thread_shift, ADDRESS_CONTRACT_PREFIX, ADDRESS_USER_PREFIX, ADDRESS_VERSION, HASH_LENGTH,
};
use crate::crypto::base58::{self, Base58Error};
use crate::crypto::hash::blake3_hash;
use crate::crypto::keys::PublicKey;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Missing or unknown prefix.
    #[error("invalid address format: {0}")]
    InvalidFormat(String),

    /// Not base58, or the decoded payload has the wrong shape.
    #[error("invalid address encoding: {0}")]
    InvalidEncoding(String),

    #[error("address checksum mismatch")]
    ChecksumMismatch,

    #[error("unsupported address version {0}")]
    UnsupportedVersion(u64),
}

impl From<Base58Error> for AddressError {
    fn from(err: Base58Error) -> Self {
        match err {
            Base58Error::ChecksumMismatch => AddressError::ChecksumMismatch,
            Base58Error::InvalidEncoding(reason) => AddressError::InvalidEncoding(reason),
        }
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// Who controls an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AddressKind {
    /// Controlled by a keypair (`AU`).
    User,
    /// Controlled by contract code (`AS`).
    SmartContract,
}

impl AddressKind {
    pub fn prefix(self) -> &'static str {
        match self {
            AddressKind::User => ADDRESS_USER_PREFIX,
            AddressKind::SmartContract => ADDRESS_CONTRACT_PREFIX,
        }
    }
}

/// A decoded address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    kind: AddressKind,
    version: u64,
    digest: [u8; HASH_LENGTH],
}

impl Address {
    /// Build an address from parts. The version is not checked here so the
    /// operation decoder can round-trip whatever it was given.
    pub fn new(kind: AddressKind, version: u64, digest: [u8; HASH_LENGTH]) -> Self {
        Self {
            kind,
            version,
            digest,
        }
    }

    /// The user address owned by `public_key`.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Self {
            kind: AddressKind::User,
            version: ADDRESS_VERSION,
            digest: blake3_hash(&public_key.versioned_bytes()),
        }
    }

    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn digest(&self) -> &[u8; HASH_LENGTH] {
        &self.digest
    }

    pub fn is_user(&self) -> bool {
        self.kind == AddressKind::User
    }

    /// Block-production thread this address belongs to.
    ///
    /// `thread_count` is expected to be a power of two. Other counts round
    /// down to one, and a count of 0 or 1 puts every address in thread 0.
    pub fn thread(&self, thread_count: u8) -> u8 {
        self.digest[0]
            .checked_shr(thread_shift(thread_count))
            .unwrap_or(0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = base58::encode_versioned(self.version, &self.digest);
        write!(f, "{}{}", self.kind.prefix(), body)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_address(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Codec functions
// ---------------------------------------------------------------------------

/// Derive the user address of a public key. Deterministic.
pub fn derive_address(public_key: &PublicKey) -> Address {
    Address::from_public_key(public_key)
}

/// Parse and validate a textual address.
///
/// # Errors
///
/// - [`AddressError::InvalidFormat`] when the text does not start with
///   `AU` or `AS`.
/// - [`AddressError::InvalidEncoding`] when the body is not base58 or does
///   not hold exactly one 32-byte digest.
/// - [`AddressError::ChecksumMismatch`] when the checksum fails.
/// - [`AddressError::UnsupportedVersion`] for any version other than 0.
pub fn decode_address(text: &str) -> Result<Address, AddressError> {
    let (kind, body) = if let Some(body) = text.strip_prefix(ADDRESS_USER_PREFIX) {
        (AddressKind::User, body)
    } else if let Some(body) = text.strip_prefix(ADDRESS_CONTRACT_PREFIX) {
        (AddressKind::SmartContract, body)
    } else {
        return Err(AddressError::InvalidFormat(format!(
            "expected '{ADDRESS_USER_PREFIX}' or '{ADDRESS_CONTRACT_PREFIX}' prefix"
        )));
    };

    let (version, payload) = base58::decode_versioned(body)?;
    if version != ADDRESS_VERSION {
        return Err(AddressError::UnsupportedVersion(version));
    }
    let digest: [u8; HASH_LENGTH] = payload.as_slice().try_into().map_err(|_| {
        AddressError::InvalidEncoding(format!(
            "expected {HASH_LENGTH}-byte digest, got {} bytes",
            payload.len()
        ))
    })?;

    Ok(Address::new(kind, version, digest))
}

/// Lookup key for an address string. Never use the result for display.
pub fn normalize(text: &str) -> String {
    text.to_ascii_lowercase()
}
