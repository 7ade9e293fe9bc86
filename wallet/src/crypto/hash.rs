//! # Hashing Utilities
//!
//! BLAKE3 is the only hash this crate computes itself. It is used twice:
//!
//! - **Address digests**: `blake3(varint(version) ‖ public_key)`.
//! - **Message digests**: every message is hashed before it reaches Ed25519,
//!   so what the signature commits to is always a 32-byte digest.
//!
//! The double SHA-256 checksum of base58-check lives inside the `bs58` crate
//! and never surfaces here.

use crate::config::HASH_LENGTH;

/// Compute the BLAKE3 hash of the input data.
///
/// # Example
///
/// ```
/// use massa_wallet::crypto::blake3_hash;
///
/// let hash = blake3_hash(b"massa");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn blake3_hash(data: &[u8]) -> [u8; HASH_LENGTH] {
    *blake3::hash(data).as_bytes()
}

/// Hash several byte slices as if they were concatenated.
///
/// Avoids building the concatenation when the parts already live in separate
/// buffers (public key and payload, version prefix and key bytes).
pub fn blake3_hash_multi(parts: &[&[u8]]) -> [u8; HASH_LENGTH] {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(part);
    }
    *hasher.finalize().as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blake3_deterministic() {
        assert_eq!(blake3_hash(b"abc"), blake3_hash(b"abc"));
    }

    #[test]
    fn test_blake3_different_inputs() {
        assert_ne!(blake3_hash(b"abc"), blake3_hash(b"abd"));
    }

    #[test]
    fn test_blake3_empty_known_vector() {
        assert_eq!(
            hex::encode(blake3_hash(b"")),
            "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
        );
    }

    #[test]
    fn test_blake3_hash_multi_matches_concatenation() {
        let joined = blake3_hash(b"hello world");
        let parts = blake3_hash_multi(&[b"hello", b" ", b"world"]);
        assert_eq!(joined, parts);
    }
}
