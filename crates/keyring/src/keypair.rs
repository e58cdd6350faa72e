//! Key pair generation and multibase (de)serialization.
//!
//! A [`KeyPair`] is an `(algorithm, publicKeyMultibase, privateKeyMultibase)`
//! triple where both fields are `z`-prefixed multibase strings.

use serde::{Deserialize, Serialize};

use crate::algorithm::Algorithm;
use crate::error::Result;
use crate::multicodec::{self, KeyRole};
use crate::{bls12381, ed25519, p256, secp256k1};

/// A generated key pair with multibase-encoded public/private key material.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyPair {
    /// The algorithm the key material was generated for.
    pub algorithm: Algorithm,
    /// Multibase-encoded, multicodec-tagged public key.
    pub public_key_multibase: String,
    /// Multibase-encoded, multicodec-tagged private key.
    pub private_key_multibase: String,
}

impl KeyPair {
    /// Generate a new key pair for the given algorithm.
    #[must_use]
    pub fn generate(algorithm: Algorithm) -> Self {
        let (public_bytes, private_bytes) = match algorithm {
            Algorithm::Ed25519 => ed25519::generate(),
            Algorithm::Secp256k1 => secp256k1::generate(),
            Algorithm::P256 => p256::generate(),
            Algorithm::Bls12381G2 => bls12381::generate(),
        };
        Self {
            algorithm,
            public_key_multibase: multicodec::encode_key(
                algorithm,
                KeyRole::Public,
                &public_bytes,
            ),
            private_key_multibase: multicodec::encode_key(
                algorithm,
                KeyRole::Private,
                &private_bytes,
            ),
        }
    }

    /// Decode the public key's raw bytes, validating that the multicodec
    /// header identifies this key pair's declared algorithm.
    ///
    /// # Errors
    ///
    /// Returns an error if the multibase string is malformed or tagged with
    /// a different algorithm.
    pub fn public_key_bytes(&self) -> Result<Vec<u8>> {
        let decoded = multicodec::decode_key(&self.public_key_multibase)?;
        Ok(decoded.bytes)
    }
}
