//! secp256k1 (ECDSA over SHA-256) key generation and signing.
//!
//! Produces 64-byte compact signatures, normalized from whatever shape the
//! underlying primitive returns.

use ecdsa::signature::{Signer as _, Verifier as _};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::Secp256k1;
use rand::rngs::OsRng;

use crate::error::{Error, Result};

/// Generate a new secp256k1 key pair, returning `(public_bytes, private_bytes)`.
///
/// The public key is SEC1 compressed (33 bytes); the private key is the raw
/// 32-byte scalar.
#[must_use]
pub fn generate() -> (Vec<u8>, Vec<u8>) {
    let signing_key = SigningKey::random(&mut OsRng);
    let verifying_key = VerifyingKey::from(&signing_key);
    (
        verifying_key.to_encoded_point(true).as_bytes().to_vec(),
        signing_key.to_bytes().to_vec(),
    )
}

/// Sign `message` with a raw secp256k1 private key scalar, returning a
/// 64-byte compact `(r, s)` signature.
///
/// # Errors
///
/// Returns [`Error::SigningFailed`] if `private_key_bytes` is not a valid
/// scalar.
pub fn sign(message: &[u8], private_key_bytes: &[u8]) -> Result<Vec<u8>> {
    let signing_key = SigningKey::<Secp256k1>::from_slice(private_key_bytes)
        .map_err(|e| Error::SigningFailed(e.to_string()))?;
    let signature: Signature = signing_key.sign(message);
    Ok(normalize_compact(&signature))
}

/// Normalizes a signature into a plain 64-byte compact `Vec<u8>`.
fn normalize_compact(signature: &Signature) -> Vec<u8> {
    signature.to_bytes().to_vec()
}

/// Verify a secp256k1 ECDSA signature over SHA-256(message). Never
/// propagates the underlying error; returns `false` on any failure.
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
