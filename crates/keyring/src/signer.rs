//! # Polymorphic signer/verifier suite
//!
//! Each curve is modeled as a variant dispatched on the algorithm tag
//! decoded from the key's multicodec header, rather than through
//! inheritance. A concrete [`Signer`] asserts that the key it is handed
//! actually matches its own algorithm before delegating to the curve
//! primitive.

use crate::algorithm::Algorithm;
use crate::error::{Error, Result};
use crate::multicodec::{self, KeyRole};
use crate::{bls12381, ed25519, p256, secp256k1};

/// A single-algorithm signer/verifier.
///
/// Implementations decode the supplied multibase key, check its multicodec
/// header against [`Signer::algorithm`], and delegate to the underlying
/// curve primitive. `verify` never propagates an underlying error; any
/// failure (bad key, bad signature, algorithm mismatch) becomes `false`.
pub trait Signer {
    /// The algorithm this signer handles.
    fn algorithm(&self) -> Algorithm;

    /// Sign `message` using `private_key_multibase`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WrongKeyType`] if the key's multicodec header names
    /// a different algorithm, or a codec/signing error otherwise.
    fn sign(&self, message: &[u8], private_key_multibase: &str) -> Result<Vec<u8>>;

    /// Verify `signature` over `message` using `public_key_multibase`.
    /// Returns `false` rather than propagating any error.
    fn verify(&self, message: &[u8], signature: &[u8], public_key_multibase: &str) -> bool;
}

macro_rules! curve_signer {
    ($name:ident, $algorithm:expr, $module:ident) => {
        /// Signer/verifier for a single curve; see module docs.
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $name;

        impl Signer for $name {
            fn algorithm(&self) -> Algorithm {
                $algorithm
            }

            fn sign(&self, message: &[u8], private_key_multibase: &str) -> Result<Vec<u8>> {
                let decoded = multicodec::decode_key(private_key_multibase)?;
                if decoded.role != KeyRole::Private {
                    return Err(Error::WrongKeyType {
                        expected: $algorithm.as_str(),
                        actual: "public key supplied for signing".into(),
                    });
                }
                if decoded.algorithm != $algorithm {
                    return Err(Error::WrongKeyType {
                        expected: $algorithm.as_str(),
                        actual: decoded.algorithm.to_string(),
                    });
                }
                $module::sign(message, &decoded.bytes)
            }

            fn verify(
                &self, message: &[u8], signature: &[u8], public_key_multibase: &str,
            ) -> bool {
                let Ok(decoded) = multicodec::decode_key(public_key_multibase) else {
                    return false;
                };
                if decoded.algorithm != $algorithm || decoded.role != KeyRole::Public {
                    return false;
                }
                $module::verify(message, signature, &decoded.bytes)
            }
        }
    };
}

curve_signer!(Ed25519Signer, Algorithm::Ed25519, ed25519);
curve_signer!(Secp256k1Signer, Algorithm::Secp256k1, secp256k1);
curve_signer!(P256Signer, Algorithm::P256, p256);
curve_signer!(Bls12381Signer, Algorithm::Bls12381G2, bls12381);

/// Return the signer implementation for an algorithm.
#[must_use]
pub fn signer_for(algorithm: Algorithm) -> Box<dyn Signer + Send + Sync> {
    match algorithm {
        Algorithm::Ed25519 => Box::new(Ed25519Signer),
        Algorithm::Secp256k1 => Box::new(Secp256k1Signer),
        Algorithm::P256 => Box::new(P256Signer),
        Algorithm::Bls12381G2 => Box::new(Bls12381Signer),
    }
}

/// Sign `message` with `private_key_multibase`, dispatching on the
/// algorithm embedded in the key's multicodec header.
///
/// # Errors
///
/// Returns an error if the key cannot be decoded or signing fails.
pub fn sign(message: &[u8], private_key_multibase: &str) -> Result<Vec<u8>> {
    let decoded = multicodec::decode_key(private_key_multibase)?;
    signer_for(decoded.algorithm).sign(message, private_key_multibase)
}

/// Verify `signature` over `message` with `public_key_multibase`,
/// dispatching on the algorithm embedded in the key's multicodec header.
/// Returns `false` on any failure, including an undecodable key.
#[must_use]
pub fn verify(message: &[u8], signature: &[u8], public_key_multibase: &str) -> bool {
    let Ok(decoded) = multicodec::decode_key(public_key_multibase) else {
        return false;
    };
    signer_for(decoded.algorithm).verify(message, signature, public_key_multibase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypair::KeyPair;

    #[test]
    fn generic_dispatch_round_trips_all_algorithms() {
        for algorithm in
            [Algorithm::Ed25519, Algorithm::Secp256k1, Algorithm::P256, Algorithm::Bls12381G2]
        {
            let kp = KeyPair::generate(algorithm);
            let msg = b"hello world";
            let sig = sign(msg, &kp.private_key_multibase).expect("should sign");
            assert!(verify(msg, &sig, &kp.public_key_multibase));
        }
    }

    #[test]
    fn wrong_key_type_is_rejected() {
        let kp = KeyPair::generate(Algorithm::Ed25519);
        let err = Secp256k1Signer.sign(b"msg", &kp.private_key_multibase).unwrap_err();
        assert!(matches!(err, Error::WrongKeyType { .. }));
    }

    #[test]
    fn verify_swallows_bad_key_as_false() {
        assert!(!verify(b"msg", b"notasignature", "not-a-multibase-key"));
    }
}
