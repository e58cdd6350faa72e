//! Deterministic Ed25519 key fixtures.
//!
//! Real key generation (`KeyPair::generate`) draws from `OsRng`, which is
//! correct for production but makes tests that assert on exact multibase
//! strings, or that need the same key across two independently-constructed
//! `KeyStore`s, impossible to write. These fixtures derive key pairs from
//! fixed 32-byte seeds instead, using the keyring crate's public multicodec
//! encoder so the resulting `KeyPair` is indistinguishable from a generated
//! one to any caller.

use ed25519_dalek::SigningKey;
use originals_keyring::{encode_key, Algorithm, KeyPair, KeyRole};

/// Derive a deterministic Ed25519 [`KeyPair`] from a single seed byte,
/// repeated to fill the 32-byte seed. Different `seed` values yield
/// different, but always reproducible, key pairs.
#[must_use]
pub fn deterministic_ed25519_keypair(seed: u8) -> KeyPair {
    let signing_key = SigningKey::from_bytes(&[seed; 32]);
    let verifying_key = signing_key.verifying_key();
    KeyPair {
        algorithm: Algorithm::Ed25519,
        public_key_multibase: encode_key(
            Algorithm::Ed25519,
            KeyRole::Public,
            verifying_key.as_bytes(),
        ),
        private_key_multibase: encode_key(
            Algorithm::Ed25519,
            KeyRole::Private,
            &signing_key.to_bytes(),
        ),
    }
}

/// The fixture key pair used across tests that don't care which key they
/// get, only that it's stable: seed `0x01`.
#[must_use]
pub fn fixture_keypair() -> KeyPair {
    deterministic_ed25519_keypair(0x01)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_yields_same_keypair() {
        let a = deterministic_ed25519_keypair(7);
        let b = deterministic_ed25519_keypair(7);
        assert_eq!(a.public_key_multibase, b.public_key_multibase);
        assert_eq!(a.private_key_multibase, b.private_key_multibase);
    }

    #[test]
    fn distinct_seeds_yield_distinct_keypairs() {
        let a = deterministic_ed25519_keypair(1);
        let b = deterministic_ed25519_keypair(2);
        assert_ne!(a.public_key_multibase, b.public_key_multibase);
    }
}
