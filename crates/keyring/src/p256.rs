//! NIST P-256 (ECDSA over SHA-256) key generation and signing.

use ecdsa::signature::{Signer as _, Verifier as _};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::NistP256;
use rand::rngs::OsRng;

use crate::error::{Error, Result};

/// Generate a new P-256 key pair, returning `(public_bytes, private_bytes)`.
#[must_use]
pub fn generate() -> (Vec<u8>, Vec<u8>) {
    let signing_key = SigningKey::random(&mut OsRng);
    let verifying_key = VerifyingKey::from(&signing_key);
    (
        verifying_key.to_encoded_point(true).as_bytes().to_vec(),
        signing_key.to_bytes().to_vec(),
    )
}

/// Sign `message` with a raw P-256 private key scalar, returning a 64-byte
/// compact `(r, s)` signature.
///
/// # Errors
///
/// Returns [`Error::SigningFailed`] if `private_key_bytes` is not a valid
/// scalar.
pub fn sign(message: &[u8], private_key_bytes: &[u8]) -> Result<Vec<u8>> {
    let signing_key = SigningKey::<NistP256>::from_slice(private_key_bytes)
        .map_err(|e| Error::SigningFailed(e.to_string()))?;
    let signature: Signature = signing_key.sign(message);
    Ok(signature.to_bytes().to_vec())
}

/// Verify a P-256 ECDSA signature over SHA-256(message). Never propagates
/// the underlying error; returns `false` on any failure.
#[must_use]
pub fn verify(message: &[u8], signature: &[u8], public_key_bytes: &[u8]) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_sec1_bytes(public_key_bytes) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    verifying_key.verify(message, &signature).is_ok()
}
