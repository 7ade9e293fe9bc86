//! # Digital Signatures
//!
//! Detached signatures over arbitrary byte buffers.
//!
//! What gets signed is never the message itself but its BLAKE3 digest:
//!
//! ```text
//! signature = ed25519_sign(secret, blake3(message))
//! text      = b58check(varint(0) ‖ signature[64])      (no prefix)
//! ```
//!
//! ## Signing is checked twice
//!
//! [`SigningEngine::sign`] refuses to hand out anything it has not verified
//! itself: the raw output must be exactly 64 bytes, and it must verify
//! against the signer's recorded public key. The second check also catches
//! accounts whose public key does not belong to their secret key.
//!
//! The raw primitive sits behind [`SignatureScheme`] so those checks can be
//! exercised with a scheme that misbehaves.
//!
//! ## Verification
//!
//! A wrong signature is an expected outcome, not an error: [`SigningEngine::verify`]
//! returns `Ok(false)` and logs a warning. Only a public key that cannot be
//! parsed at all is a caller error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::warn;

use super::base58;
use super::hash::blake3_hash;
use super::keys::{PublicKey, SecretKey};
use crate::config::{KEY_VERSION, SIGNATURE_LENGTH};
use crate::identity::account::Account;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signer has no secret key")]
    NoSecretKey,

    /// Needed for self-verification.
    #[error("signer has no public key")]
    NoPublicKey,

    #[error("Invalid signature length. Expected {expected}, got {actual}")]
    SignatureLengthMismatch { expected: usize, actual: usize },

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),

    #[error("invalid signature encoding: {0}")]
    InvalidEncoding(String),

    /// A freshly produced signature failed to verify.
    #[error("signature verification failed")]
    VerificationFailed,
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// Exactly 64 raw signature bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_LENGTH]);

impl Signature {
    pub fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Rejects anything that is not exactly 64 bytes. No padding, no
    /// truncation.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SignatureError> {
        let raw: [u8; SIGNATURE_LENGTH] =
            bytes.try_into().map_err(|_| SignatureError::SignatureLengthMismatch {
                expected: SIGNATURE_LENGTH,
                actual: bytes.len(),
            })?;
        Ok(Self(raw))
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// Parse the textual form.
    pub fn from_text(text: &str) -> Result<Self, SignatureError> {
        let (version, payload) = base58::decode_versioned(text)
            .map_err(|e| SignatureError::InvalidEncoding(e.to_string()))?;
        if version != KEY_VERSION {
            return Err(SignatureError::InvalidEncoding(format!(
                "unsupported signature version {version}"
            )));
        }
        Self::from_slice(&payload)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base58::encode_versioned(KEY_VERSION, &self.0))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Scheme
// ---------------------------------------------------------------------------

/// The raw signature primitive.
pub trait SignatureScheme: Send + Sync {
    /// Sign `digest`. A correct scheme returns exactly 64 bytes.
    fn sign(&self, secret: &SecretKey, digest: &[u8]) -> Vec<u8>;

    fn verify(&self, public: &PublicKey, digest: &[u8], signature: &Signature) -> bool;
}

/// RFC 8032 Ed25519 with strict verification.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ed25519;

impl SignatureScheme for Ed25519 {
    fn sign(&self, secret: &SecretKey, digest: &[u8]) -> Vec<u8> {
        secret.sign_raw(digest).to_vec()
    }

    fn verify(&self, public: &PublicKey, digest: &[u8], signature: &Signature) -> bool {
        public.verify_raw(digest, signature.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// SigningEngine
// ---------------------------------------------------------------------------

/// Signs and verifies messages. Stateless apart from its scheme.
#[derive(Debug, Default, Clone)]
pub struct SigningEngine<S = Ed25519> {
    scheme: S,
}

impl SigningEngine<Ed25519> {
    pub fn new() -> Self {
        Self { scheme: Ed25519 }
    }
}

impl<S: SignatureScheme> SigningEngine<S> {
    pub fn with_scheme(scheme: S) -> Self {
        Self { scheme }
    }

    /// Sign `message` with `signer`'s secret key.
    ///
    /// Text and byte messages go through the same path: `"abc"` and
    /// `b"abc"` produce identical signatures.
    ///
    /// # Errors
    ///
    /// In order: [`NoSecretKey`](SignatureError::NoSecretKey),
    /// [`NoPublicKey`](SignatureError::NoPublicKey), key parse failures,
    /// [`SignatureLengthMismatch`](SignatureError::SignatureLengthMismatch),
    /// [`VerificationFailed`](SignatureError::VerificationFailed).
    pub fn sign(
        &self,
        message: impl AsRef<[u8]>,
        signer: &Account,
    ) -> Result<Signature, SignatureError> {
        let secret_text = signer
            .secret_key
            .as_ref()
            .ok_or(SignatureError::NoSecretKey)?;
        let public_text = signer
            .public_key
            .as_ref()
            .ok_or(SignatureError::NoPublicKey)?;

        let secret = SecretKey::from_text(secret_text)
            .map_err(|e| SignatureError::InvalidSecretKey(e.to_string()))?;
        let public = PublicKey::from_text(public_text)
            .map_err(|e| SignatureError::InvalidPublicKey(e.to_string()))?;

        self.sign_with_keys(message.as_ref(), &secret, &public)
    }

    /// Sign with already-parsed keys. `public` is used for self-verification
    /// only and is not assumed to match `secret`.
    pub fn sign_with_keys(
        &self,
        message: &[u8],
        secret: &SecretKey,
        public: &PublicKey,
    ) -> Result<Signature, SignatureError> {
        let digest = blake3_hash(message);
        let raw = self.scheme.sign(secret, &digest);
        if raw.len() != SIGNATURE_LENGTH {
            return Err(SignatureError::SignatureLengthMismatch {
                expected: SIGNATURE_LENGTH,
                actual: raw.len(),
            });
        }
        let signature = Signature::from_slice(&raw)?;
        if !self.scheme.verify(public, &digest, &signature) {
            return Err(SignatureError::VerificationFailed);
        }
        Ok(signature)
    }

    /// Verify a textual signature against a textual public key.
    ///
    /// Returns `Ok(false)` for a wrong or malformed signature. Only an
    /// undecodable public key is an error.
    pub fn verify(
        &self,
        message: impl AsRef<[u8]>,
        signature: &str,
        public_key: &str,
    ) -> Result<bool, SignatureError> {
        let public = PublicKey::from_text(public_key)
            .map_err(|e| SignatureError::InvalidPublicKey(e.to_string()))?;

        let signature = match Signature::from_text(signature) {
            Ok(signature) => signature,
            Err(err) => {
                warn!(public_key = %public, error = %err, "malformed signature");
                return Ok(false);
            }
        };

        let valid = self.verify_signature(message.as_ref(), &signature, &public);
        if !valid {
            warn!(public_key = %public, "signature verification failed");
        }
        Ok(valid)
    }

    /// Typed verification. No logging.
    pub fn verify_signature(
        &self,
        message: &[u8],
        signature: &Signature,
        public_key: &PublicKey,
    ) -> bool {
        let digest = blake3_hash(message);
        self.scheme.verify(public_key, &digest, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_SECRET: &str = "S12XuWmm5jULpJGXBnkeBsuiNmsGi2F4rMiTvriCzENxBR4Ev7vd";
    const BASE_PUBLIC: &str = "P129tbNd4oVMRsnFvQcgSq4PUAZYYDA1pvqtef2ER6W7JqgY1Bfg";
    const TEST_MESSAGE_SIGNATURE: &str =
        "1TXucC8nai7BYpAnMPYrotVcKCZ5oxkfWHb2ykKj2tXmaGMDL1XTU5AbC6Z13RH3q59F8QtbzKq4gzBphGPWpiDonownxE";

    fn base_account() -> Account {
        Account::from_secret_key(BASE_SECRET).unwrap()
    }

    /// Returns one byte short of a real signature.
    struct TruncatingScheme;

    impl SignatureScheme for TruncatingScheme {
        fn sign(&self, _secret: &SecretKey, _digest: &[u8]) -> Vec<u8> {
            vec![0u8; 63]
        }

        fn verify(&self, _: &PublicKey, _: &[u8], _: &Signature) -> bool {
            true
        }
    }

    #[test]
    fn test_golden_signature() {
        let engine = SigningEngine::new();
        let signature = engine.sign("Test message", &base_account()).unwrap();
        assert_eq!(signature.to_string(), TEST_MESSAGE_SIGNATURE);
    }

    #[test]
    fn test_signing_is_deterministic() {
        let engine = SigningEngine::new();
        let account = base_account();
        let a = engine.sign(b"hello", &account).unwrap();
        let b = engine.sign(b"hello", &account).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_text_and_bytes_sign_identically() {
        let engine = SigningEngine::new();
        let account = base_account();
        let text = engine.sign("abc", &account).unwrap();
        let bytes = engine.sign([0x61u8, 0x62, 0x63], &account).unwrap();
        assert_eq!(text, bytes);
    }

    #[test]
    fn test_verify_golden() {
        let engine = SigningEngine::new();
        assert_eq!(
            engine.verify("Test message", TEST_MESSAGE_SIGNATURE, BASE_PUBLIC),
            Ok(true)
        );
    }

    #[test]
    fn test_verify_rejects_modified_signature() {
        let engine = SigningEngine::new();
        let tampered = format!("2{}", &TEST_MESSAGE_SIGNATURE[1..]);
        assert_eq!(engine.verify("Test message", &tampered, BASE_PUBLIC), Ok(false));
    }

    #[test]
    fn test_verify_rejects_other_key_and_flipped_message() {
        let engine = SigningEngine::new();
        let other = Account::generate();
        let other_public = other.public_key.as_deref().unwrap();
        assert_eq!(
            engine.verify("Test message", TEST_MESSAGE_SIGNATURE, other_public),
            Ok(false)
        );
        assert_eq!(
            engine.verify("Test messagf", TEST_MESSAGE_SIGNATURE, BASE_PUBLIC),
            Ok(false)
        );
    }

    #[test]
    fn test_verify_garbage_signature_is_false() {
        let engine = SigningEngine::new();
        assert_eq!(engine.verify("x", "not-base58!", BASE_PUBLIC), Ok(false));
    }

    #[test]
    fn test_verify_bad_public_key_is_error() {
        let engine = SigningEngine::new();
        assert!(matches!(
            engine.verify("x", TEST_MESSAGE_SIGNATURE, "garbage"),
            Err(SignatureError::InvalidPublicKey(_))
        ));
    }

    #[test]
    fn test_sign_without_secret_key() {
        let mut account = base_account();
        account.secret_key = None;
        assert_eq!(
            SigningEngine::new().sign("m", &account),
            Err(SignatureError::NoSecretKey)
        );
    }

    #[test]
    fn test_sign_without_public_key() {
        let mut account = base_account();
        account.public_key = None;
        assert_eq!(
            SigningEngine::new().sign("m", &account),
            Err(SignatureError::NoPublicKey)
        );
    }

    #[test]
    fn test_misbehaving_scheme_length_detected() {
        let engine = SigningEngine::with_scheme(TruncatingScheme);
        let err = engine.sign("m", &base_account()).unwrap_err();
        assert_eq!(
            err,
            SignatureError::SignatureLengthMismatch {
                expected: 64,
                actual: 63
            }
        );
        assert!(err
            .to_string()
            .starts_with("Invalid signature length. Expected 64, got"));
    }

    #[test]
    fn test_inconsistent_account_fails_self_verification() {
        let mut account = base_account();
        account.public_key = Account::generate().public_key;
        assert_eq!(
            SigningEngine::new().sign("m", &account),
            Err(SignatureError::VerificationFailed)
        );
    }

    #[test]
    fn test_signature_text_length_enforced() {
        let short = base58::encode_versioned(0, &[1u8; 63]);
        assert_eq!(
            Signature::from_text(&short),
            Err(SignatureError::SignatureLengthMismatch {
                expected: 64,
                actual: 63
            })
        );
    }
}
