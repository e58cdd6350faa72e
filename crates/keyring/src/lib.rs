//! # Originals Keyring
//!
//! Multibase/multicodec key encoding and a polymorphic
//! signer/verifier suite over Ed25519, secp256k1, P-256 and BLS12-381 G2
//!, plus an in-memory [`KeyStore`] that is the sole owner of
//! secret key material.
//!
//! This crate contains no DID- or credential-specific logic; it is
//! deliberately small and depended on by the `originals` root crate.

mod algorithm;
mod bls12381;
mod ed25519;
mod error;
mod keypair;
mod keystore;
mod multicodec;
mod p256;
mod secp256k1;
mod signer;

pub use algorithm::Algorithm;
pub use error::{Error, Result};
pub use keypair::KeyPair;
pub use keystore::KeyStore;
pub use multicodec::{decode_bare, decode_key, encode_bare, encode_key, DecodedKey, KeyRole};
pub use signer::{
    sign, signer_for, verify, Bls12381Signer, Ed25519Signer, P256Signer, Secp256k1Signer, Signer,
};
