//! # Protocol Constants & Client Configuration
//!
//! Every magic number the wallet core depends on lives here. Most of them are
//! fixed by the node's wire format: change one and every address, key and
//! signature you produce stops round-tripping with the rest of the network.
//!
//! The only knobs a caller is expected to turn are grouped in
//! [`ClientConfig`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Textual prefixes
// ---------------------------------------------------------------------------

/// Prefix of a base58-check encoded secret key (`S1...`).
pub const SECRET_KEY_PREFIX: &str = "S";

/// Prefix of a base58-check encoded public key (`P1...`).
pub const PUBLIC_KEY_PREFIX: &str = "P";

/// Prefix of an address owned by a keypair (`AU1...`).
pub const ADDRESS_USER_PREFIX: &str = "AU";

/// Prefix of an address owned by a deployed smart contract (`AS1...`).
pub const ADDRESS_CONTRACT_PREFIX: &str = "AS";

// ---------------------------------------------------------------------------
// Versions
// ---------------------------------------------------------------------------

/// Version number varint-encoded in front of every key, address and
/// signature payload. Only version 0 exists on the network today.
pub const KEY_VERSION: u64 = 0;

/// Version of the address hashing scheme.
pub const ADDRESS_VERSION: u64 = 0;

// ---------------------------------------------------------------------------
// Cryptographic sizes
// ---------------------------------------------------------------------------

/// Ed25519 secret seed length.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Ed25519 public key length.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Ed25519 signature length. Anything else is an encoding error.
pub const SIGNATURE_LENGTH: usize = 64;

/// BLAKE3 digest length, used for address hashes and message digests.
pub const HASH_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Network parameters
// ---------------------------------------------------------------------------

/// Number of block-production threads. Determines the thread an address
/// "lives" in: the top `log2(THREAD_COUNT)` bits of its digest.
pub const THREAD_COUNT: u8 = 32;

/// Periods added to the node's current period to obtain an operation's
/// expiry period.
pub const DEFAULT_VALIDITY_WINDOW: u64 = 5;

/// Hard upper bound on the number of accounts a key store will hold.
pub const MAX_WALLET_ACCOUNTS: usize = 256;

/// Default public JSON-RPC endpoint of a local node.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:33035";

/// Default timeout for a single JSON-RPC round trip.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// Errors raised by [`ClientConfig::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An operation must expire strictly after the current period.
    #[error("validity window must be at least 1 period")]
    ZeroValidityWindow,

    #[error("rpc url must not be empty")]
    EmptyRpcUrl,

    #[error("request timeout must be non-zero")]
    ZeroTimeout,
}

/// Runtime settings for a [`WalletClient`](crate::client::WalletClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Public JSON-RPC endpoint used for status queries and submission.
    pub rpc_url: String,

    /// Periods between the node's current period and an operation's expiry.
    pub validity_window: u64,

    /// Per-request timeout for the JSON-RPC transport.
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            validity_window: DEFAULT_VALIDITY_WINDOW,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Checks the invariants the transaction pipeline relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.validity_window == 0 {
            return Err(ConfigError::ZeroValidityWindow);
        }
        if self.rpc_url.trim().is_empty() {
            return Err(ConfigError::EmptyRpcUrl);
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

/// Returns the right-shift that maps the first digest byte to a thread index.
///
/// Always in `1..=8`. A count that is not a power of two is rounded down to
/// one; 0 and 1 give 8, which leaves no bits at all.
pub fn thread_shift(thread_count: u8) -> u32 {
    u8::BITS - thread_count.checked_ilog2().unwrap_or(0)
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crypto_parameter_sizes() {
        assert_eq!(SECRET_KEY_LENGTH, 32);
        assert_eq!(PUBLIC_KEY_LENGTH, 32);
        assert_eq!(SIGNATURE_LENGTH, 64);
        assert_eq!(HASH_LENGTH, 32);
    }

    #[test]
    fn thread_shift_for_default_thread_count() {
        // 32 threads = 5 bits, so the top 5 bits of the first byte.
        assert_eq!(thread_shift(THREAD_COUNT), 3);
        assert_eq!(thread_shift(2), 7);
        assert_eq!(thread_shift(128), 1);
        assert_eq!(thread_shift(1), 8);
        assert_eq!(thread_shift(0), 8);
        assert_eq!(thread_shift(255), 1);
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(ClientConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_validity_window_rejected() {
        let config = ClientConfig {
            validity_window: 0,
            ..ClientConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroValidityWindow));
    }

    #[test]
    fn empty_rpc_url_rejected() {
        let config = ClientConfig {
            rpc_url: "  ".to_string(),
            ..ClientConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyRpcUrl));
    }

    #[test]
    fn config_json_roundtrip_and_defaults() {
        let json = r#"{ "validity_window": 8, "request_timeout": 3 }"#;
        let config: ClientConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.validity_window, 8);
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.rpc_url, DEFAULT_RPC_URL);

        let back: ClientConfig =
            serde_json::from_str(&serde_json::to_string(&config).unwrap()).unwrap();
        assert_eq!(back, config);
    }
}
