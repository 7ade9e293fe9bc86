//! Operation signing.
//!
//! The signature binds the creator's identity into the signed material:
//!
//! ```text
//! signed_content = varint(0) ‖ public_key[32] ‖ serialized_operation
//! signature      = ed25519(blake3(signed_content))
//! ```
//!
//! A signature lifted from one operation therefore cannot be replayed under
//! a different claimed creator. The resulting [`SignedOperation`] is exactly
//! what the node's `send_operations` expects.

use serde::{Deserialize, Serialize};

use super::codec::{self, CodecError};
use super::types::Operation;
use crate::crypto::keys::PublicKey;
use crate::crypto::signatures::{Signature, SignatureError, SignatureScheme, SigningEngine};
use crate::identity::account::Account;

/// A serialized operation together with its creator and signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedOperation {
    /// Canonical operation bytes, exactly as signed.
    pub serialized_content: Vec<u8>,
    pub creator_public_key: PublicKey,
    pub signature: Signature,
}

impl SignedOperation {
    /// The bytes the signature covers.
    pub fn signed_content(&self) -> Vec<u8> {
        signed_content(&self.creator_public_key, &self.serialized_content)
    }

    /// Decode the embedded operation.
    pub fn operation(&self) -> Result<Operation, CodecError> {
        codec::deserialize(&self.serialized_content)
    }

    /// Check the signature against the embedded creator key.
    pub fn verify<S: SignatureScheme>(&self, engine: &SigningEngine<S>) -> bool {
        engine.verify_signature(
            &self.signed_content(),
            &self.signature,
            &self.creator_public_key,
        )
    }
}

fn signed_content(public_key: &PublicKey, payload: &[u8]) -> Vec<u8> {
    let mut content = public_key.versioned_bytes();
    content.extend_from_slice(payload);
    content
}

/// Serialize `operation` and sign it as `signer`.
///
/// Fails with the signing engine's errors, in the engine's order, so a
/// watch-only signer reports `NoSecretKey` before anything else.
pub fn sign_operation<S: SignatureScheme>(
    engine: &SigningEngine<S>,
    operation: &Operation,
    signer: &Account,
) -> Result<SignedOperation, SignatureError> {
    if signer.secret_key.is_none() {
        return Err(SignatureError::NoSecretKey);
    }
    let public_text = signer
        .public_key
        .as_deref()
        .ok_or(SignatureError::NoPublicKey)?;
    let creator_public_key = PublicKey::from_text(public_text)
        .map_err(|e| SignatureError::InvalidPublicKey(e.to_string()))?;

    let serialized_content = codec::serialize(operation);
    let signature = engine.sign(
        signed_content(&creator_public_key, &serialized_content),
        signer,
    )?;

    Ok(SignedOperation {
        serialized_content,
        creator_public_key,
        signature,
    })
}
