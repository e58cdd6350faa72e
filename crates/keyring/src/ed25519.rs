//! Ed25519 (EdDSA) key generation and signing.
//!
//! EdDSA signs the message bytes directly; no pre-hash.

use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier as _, VerifyingKey};
use rand::rngs::OsRng;

use crate::error::{Error, Result};

/// Generate a new Ed25519 key pair, returning `(public_bytes, private_bytes)`.
#[must_use]
pub fn generate() -> (Vec<u8>, Vec<u8>) {
    let signing_key = SigningKey::generate(&mut OsRng);
    let verifying_key = signing_key.verifying_key();
    (verifying_key.to_bytes().to_vec(), signing_key.to_bytes().to_vec())
}

/// Sign `message` with a raw (multicodec-header-stripped) Ed25519 private key.
///
/// # Errors
///
/// Returns [`Error::SigningFailed`] if `private_key_bytes` is not a valid
/// 32-byte Ed25519 seed.
pub fn sign(message: &[u8], private_key_bytes: &[u8]) -> Result<Vec<u8>> {
    let seed: [u8; 32] = private_key_bytes
        .try_into()
        .map_err(|_| Error::SigningFailed("Ed25519 private key must be 32 bytes".into()))?;
    let signing_key = SigningKey::from_bytes(&seed);
    Ok(signing_key.sign(message).to_bytes().to_vec())
}

/// Verify an Ed25519 signature. Never panics or propagates the underlying
/// decode/verify error; returns `false` on any failure.
#[must_use]
pub fn verify(message: &[u8], signature: &[u8], public_key_bytes: &[u8]) -> bool {
    let Ok(key_bytes): std::result::Result<[u8; 32], _> = public_key_bytes.try_into() else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_bytes(&key_bytes) else {
        return false;
    };
    let Ok(sig_bytes): std::result::Result<[u8; 64], _> = signature.try_into() else {
        return false;
    };
    let signature = Signature::from_bytes(&sig_bytes);
    verifying_key.verify(message, &signature).is_ok()
}
