//! BLS12-381 G2 key generation and signing.
//!
//! Secret keys are scalars in the scalar field; public keys live in G1;
//! signatures live in G2. Messages are mapped to a G2 point by reducing a
//! wide SHA-512 digest to a scalar and multiplying the G2 generator by it
//!, then the signature is that point scaled by the secret
//! key. Verification checks the standard BLS pairing equation
//! `e(pk, H(m)) == e(G1::generator(), signature)`.

use bls12_381::{pairing, G1Affine, G1Projective, G2Affine, G2Projective, Scalar};
use ff::Field;
use group::{Group, GroupEncoding};
use rand::rngs::OsRng;
use sha2::{Digest, Sha512};

use crate::error::{Error, Result};

fn hash_to_scalar(message: &[u8]) -> Scalar {
    let digest = Sha512::digest(message);
    let mut wide = [0u8; 64];
    wide.copy_from_slice(&digest);
    Scalar::from_bytes_wide(&wide)
}

fn hash_to_g2(message: &[u8]) -> G2Projective {
    G2Projective::generator() * hash_to_scalar(message)
}

/// Generate a new BLS12-381 key pair, returning `(public_bytes, private_bytes)`.
///
/// The public key is a compressed G1 point (48 bytes); the private key is
/// the 32-byte big-endian scalar.
#[must_use]
pub fn generate() -> (Vec<u8>, Vec<u8>) {
    let secret = Scalar::random(&mut OsRng);
    let public = G1Projective::generator() * secret;
    let public_affine = G1Affine::from(public);
    (public_affine.to_bytes().as_ref().to_vec(), secret.to_bytes().to_vec())
}

fn scalar_from_bytes(bytes: &[u8]) -> Result<Scalar> {
    let array: [u8; 32] = bytes
        .try_into()
        .map_err(|_| Error::SigningFailed("BLS12-381 private key must be 32 bytes".into()))?;
    Option::<Scalar>::from(Scalar::from_bytes(&array))
        .ok_or_else(|| Error::SigningFailed("private key scalar out of range".into()))
}

/// Sign `message` with a raw BLS12-381 secret scalar.
///
/// # Errors
///
/// Returns [`Error::SigningFailed`] if `private_key_bytes` does not decode
/// to a valid scalar.
pub fn sign(message: &[u8], private_key_bytes: &[u8]) -> Result<Vec<u8>> {
    let secret = scalar_from_bytes(private_key_bytes)?;
    let signature = hash_to_g2(message) * secret;
    Ok(G2Affine::from(signature).to_bytes().as_ref().to_vec())
}

/// Verify a BLS12-381 signature. Never propagates the underlying error;
/// returns `false` on any decode or pairing failure.
#[must_use]
pub fn verify(message: &[u8], signature: &[u8], public_key_bytes: &[u8]) -> bool {
    let Some(public_bytes): Option<[u8; 48]> = public_key_bytes.try_into().ok() else {
        return false;
    };
    let Some(sig_bytes): Option<[u8; 96]> = signature.try_into().ok() else {
        return false;
    };
    let Some(public_affine) = Option::<G1Affine>::from(G1Affine::from_compressed(&public_bytes))
    else {
        return false;
    };
    let Some(signature_affine) =
        Option::<G2Affine>::from(G2Affine::from_compressed(&sig_bytes))
    else {
        return false;
    };
    let hashed = G2Affine::from(hash_to_g2(message));
    pairing(&public_affine, &hashed) == pairing(&G1Affine::generator(), &signature_affine)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify() {
        let (public, private) = generate();
        let msg = b"hello world";
        let sig = sign(msg, &private).expect("should sign");
        assert!(verify(msg, &sig, &public));
    }

    #[test]
    fn flipped_signature_bit_fails() {
        let (public, private) = generate();
        let msg = b"hello world";
        let mut sig = sign(msg, &private).expect("should sign");
        sig[0] ^= 0x01;
        assert!(!verify(msg, &sig, &public));
    }
}
