//! # Versioned Base58-Check
//!
//! Every textual object the wallet shows a human uses the same envelope:
//!
//! ```text
//! prefix ‖ base58( varint(version) ‖ payload ‖ sha256(sha256(..))[0..4] )
//! ```
//!
//! The prefix (`S`, `P`, `AU`, `AS`, or nothing for signatures) is plain
//! text outside the base58 body. Callers strip it themselves so they can
//! report a wrong prefix with their own error type. This module only deals
//! with the body.

use thiserror::Error;
use zeroize::Zeroizing;

use crate::varint::{self, VarintError};

/// Errors from decoding a base58-check body.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Base58Error {
    /// The text decoded fine but the 4-byte checksum did not match.
    #[error("base58 checksum mismatch")]
    ChecksumMismatch,

    /// Not base58, too short to hold a checksum, or a broken version prefix.
    #[error("invalid base58 encoding: {0}")]
    InvalidEncoding(String),
}

impl From<bs58::decode::Error> for Base58Error {
    fn from(err: bs58::decode::Error) -> Self {
        match err {
            bs58::decode::Error::InvalidChecksum { .. } => Base58Error::ChecksumMismatch,
            other => Base58Error::InvalidEncoding(other.to_string()),
        }
    }
}

impl From<VarintError> for Base58Error {
    fn from(err: VarintError) -> Self {
        Base58Error::InvalidEncoding(format!("version prefix: {err}"))
    }
}

/// Base58 of `data` followed by its 4-byte double-SHA256 checksum.
pub fn encode_check(data: &[u8]) -> String {
    bs58::encode(data).with_check().into_string()
}

/// Inverse of [`encode_check`]; the checksum is verified and stripped.
pub fn decode_check(text: &str) -> Result<Vec<u8>, Base58Error> {
    Ok(bs58::decode(text).with_check(None).into_vec()?)
}

/// Encode `varint(version) ‖ payload` as base58-check.
///
/// The payload may be a secret seed, so the concatenated buffer is wiped.
pub fn encode_versioned(version: u64, payload: &[u8]) -> String {
    let mut data = Zeroizing::new(varint::encode(version));
    data.extend_from_slice(payload);
    encode_check(&data)
}

/// Decode a base58-check body and split off its leading version varint.
///
/// Both the decoded buffer and the returned payload are wiped on drop.
pub fn decode_versioned(text: &str) -> Result<(u64, Zeroizing<Vec<u8>>), Base58Error> {
    let data = Zeroizing::new(decode_check(text)?);
    let (version, consumed) = varint::decode(&data)?;
    Ok((version, Zeroizing::new(data[consumed..].to_vec())))
}
