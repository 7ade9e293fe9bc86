//! # Cryptographic Primitives
//!
//! Everything that touches key material or produces a checksum goes through
//! here:
//!
//! - **Ed25519** for signatures, via `ed25519-dalek`.
//! - **BLAKE3** for address digests and message pre-hashing.
//! - **base58-check** (double SHA-256 checksum) for every textual object.
//!
//! Nothing here is hand-rolled. These are thin typed wrappers that fix the
//! versioning and prefixes the node expects.

pub mod base58;
pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{blake3_hash, blake3_hash_multi};
pub use keys::{KeyError, KeyPair, PublicKey, SecretKey};
pub use signatures::{Ed25519, Signature, SignatureError, SignatureScheme, SigningEngine};
