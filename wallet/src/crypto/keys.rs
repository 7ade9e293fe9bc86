//! # Key Material
//!
//! Ed25519 keys and their textual forms.
//!
//! | type        | text                                    |
//! |-------------|-----------------------------------------|
//! | [`SecretKey`] | `"S" ‖ b58check(varint(0) ‖ seed[32])` |
//! | [`PublicKey`] | `"P" ‖ b58check(varint(0) ‖ point[32])` |
//!
//! The secret seed is the only ownership root. A [`KeyPair`] never stores a
//! public key it was handed: it always re-derives it from the seed, so the two
//! halves cannot drift apart.
//!
//! ## Secrets
//!
//! `SigningKey` zeroizes itself on drop. The textual secret is handed out as
//! `Zeroizing<String>` for the same reason. `Debug` on anything holding a
//! secret prints the public half only. Do not add logging here.

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use zeroize::Zeroizing;

use super::base58::{self, Base58Error};
use crate::config::{
    KEY_VERSION, PUBLIC_KEY_LENGTH, PUBLIC_KEY_PREFIX, SECRET_KEY_LENGTH, SECRET_KEY_PREFIX,
    SIGNATURE_LENGTH,
};
use crate::varint;

/// Errors that can occur while parsing key material.
///
/// Messages never echo the offending text: it might be a secret.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// Missing or wrong textual prefix.
    #[error("invalid key format: expected prefix '{expected}'")]
    InvalidFormat { expected: &'static str },

    #[error("invalid key encoding: {0}")]
    InvalidEncoding(String),

    #[error("key checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("unsupported key version {0}")]
    UnsupportedVersion(u64),

    /// 32 bytes that are not a valid compressed Edwards point.
    #[error("invalid public key: not a valid Ed25519 point")]
    InvalidPublicKey,
}

impl From<Base58Error> for KeyError {
    fn from(err: Base58Error) -> Self {
        match err {
            Base58Error::ChecksumMismatch => KeyError::ChecksumMismatch,
            Base58Error::InvalidEncoding(reason) => KeyError::InvalidEncoding(reason),
        }
    }
}

/// Strip `prefix`, decode the versioned body and check the payload length.
fn decode_key_text<const N: usize>(
    text: &str,
    prefix: &'static str,
) -> Result<Zeroizing<[u8; N]>, KeyError> {
    let body = text
        .strip_prefix(prefix)
        .ok_or(KeyError::InvalidFormat { expected: prefix })?;
    let (version, payload) = base58::decode_versioned(body)?;
    if version != KEY_VERSION {
        return Err(KeyError::UnsupportedVersion(version));
    }
    if payload.len() != N {
        return Err(KeyError::InvalidLength {
            expected: N,
            actual: payload.len(),
        });
    }
    let mut out = Zeroizing::new([0u8; N]);
    out.copy_from_slice(&payload);
    Ok(out)
}

// ---------------------------------------------------------------------------
// SecretKey
// ---------------------------------------------------------------------------

/// An Ed25519 secret seed.
///
/// Deliberately not `Serialize`: exporting a secret should be an explicit
/// call to [`SecretKey::to_text`].
#[derive(Clone)]
pub struct SecretKey {
    signing_key: SigningKey,
}

impl SecretKey {
    /// Fresh key from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn from_bytes(seed: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Raw 32-byte seed, wiped when the returned value is dropped.
    pub fn to_bytes(&self) -> Zeroizing<[u8; SECRET_KEY_LENGTH]> {
        Zeroizing::new(self.signing_key.to_bytes())
    }

    /// `S…` textual form.
    pub fn to_text(&self) -> Zeroizing<String> {
        let body = Zeroizing::new(base58::encode_versioned(
            KEY_VERSION,
            self.to_bytes().as_slice(),
        ));
        Zeroizing::new(format!("{SECRET_KEY_PREFIX}{}", body.as_str()))
    }

    /// Parse an `S…` string.
    pub fn from_text(text: &str) -> Result<Self, KeyError> {
        let seed = decode_key_text::<SECRET_KEY_LENGTH>(text, SECRET_KEY_PREFIX)?;
        Ok(Self::from_bytes(&seed))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    /// Raw Ed25519 signature over `message`.
    ///
    /// Callers hash first; see [`crate::crypto::signatures`].
    pub fn sign_raw(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl FromStr for SecretKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(pub={})", self.public_key())
    }
}

impl PartialEq for SecretKey {
    /// Compared through the public half; no secret bytes are compared.
    fn eq(&self, other: &Self) -> bool {
        self.public_key() == other.public_key()
    }
}

impl Eq for SecretKey {}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// An Ed25519 public key, validated as a curve point on construction.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    verifying_key: VerifyingKey,
}

impl PublicKey {
    /// Rejects byte strings that are not a valid compressed point.
    pub fn from_bytes(bytes: &[u8; PUBLIC_KEY_LENGTH]) -> Result<Self, KeyError> {
        let verifying_key = VerifyingKey::from_bytes(bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { verifying_key })
    }

    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.verifying_key.to_bytes()
    }

    /// `varint(version) ‖ point`: what address digests and operation
    /// signatures commit to.
    pub fn versioned_bytes(&self) -> Vec<u8> {
        let mut out = varint::encode(KEY_VERSION);
        out.extend_from_slice(self.verifying_key.as_bytes());
        out
    }

    /// Inverse of [`versioned_bytes`](Self::versioned_bytes).
    pub fn from_versioned_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let (version, consumed) =
            varint::decode(bytes).map_err(|e| KeyError::InvalidEncoding(e.to_string()))?;
        if version != KEY_VERSION {
            return Err(KeyError::UnsupportedVersion(version));
        }
        let point: [u8; PUBLIC_KEY_LENGTH] =
            bytes[consumed..].try_into().map_err(|_| KeyError::InvalidLength {
                expected: PUBLIC_KEY_LENGTH,
                actual: bytes.len() - consumed,
            })?;
        Self::from_bytes(&point)
    }

    /// `P…` textual form.
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Parse a `P…` string.
    pub fn from_text(text: &str) -> Result<Self, KeyError> {
        let point = decode_key_text::<PUBLIC_KEY_LENGTH>(text, PUBLIC_KEY_PREFIX)?;
        Self::from_bytes(&point)
    }

    /// Strict Ed25519 verification of a raw signature over `message`.
    ///
    /// Small-order public keys and small-order `R` components are rejected.
    pub fn verify_raw(&self, message: &[u8], signature: &[u8; SIGNATURE_LENGTH]) -> bool {
        let signature = DalekSignature::from_bytes(signature);
        self.verifying_key.verify_strict(message, &signature).is_ok()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = base58::encode_versioned(KEY_VERSION, self.verifying_key.as_bytes());
        write!(f, "{PUBLIC_KEY_PREFIX}{body}")
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({self})")
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// KeyPair
// ---------------------------------------------------------------------------

/// A secret key together with the public key derived from it.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl KeyPair {
    pub fn generate() -> Self {
        Self::from_secret(SecretKey::generate())
    }

    pub fn from_secret(secret: SecretKey) -> Self {
        let public = secret.public_key();
        Self { secret, public }
    }

    /// Parse an `S…` string and derive the public half.
    pub fn from_secret_text(text: &str) -> Result<Self, KeyError> {
        SecretKey::from_text(text).map(Self::from_secret)
    }

    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }

    pub fn public(&self) -> &PublicKey {
        &self.public
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair(pub={})", self.public)
    }
}
