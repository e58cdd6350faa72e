//! # `KeyStore`
//!
//! The sole owner of secret key material. A `KeyStore` hands
//! out signatures, never raw private keys; callers (e.g. `LifecycleManager`)
//! hold only a shared reference, never the keys themselves.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::algorithm::Algorithm;
use crate::error::{Error, Result};
use crate::keypair::KeyPair;
use crate::signer;

/// In-memory store of key pairs, keyed by verification method id.
/// Generation and signing never expose the stored private key to the
/// caller directly.
#[derive(Clone, Default)]
pub struct KeyStore {
    keys: Arc<Mutex<HashMap<String, KeyPair>>>,
}

impl KeyStore {
    /// Create an empty key store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a new key pair for `algorithm` and register it under
    /// `verification_method_id`, returning the public key multibase so the
    /// caller can place it in a DID document.
    pub fn register_generated(
        &self, verification_method_id: &str, algorithm: Algorithm,
    ) -> String {
        let key_pair = KeyPair::generate(algorithm);
        let public = key_pair.public_key_multibase.clone();
        self.keys.lock().expect("key store mutex poisoned").insert(
            verification_method_id.to_string(),
            key_pair,
        );
        public
    }

    /// Register a key pair that was generated elsewhere (e.g. by a DID
    /// method's `create` operation) under `verification_method_id`.
    pub fn register(&self, verification_method_id: &str, key_pair: KeyPair) {
        self.keys
            .lock()
            .expect("key store mutex poisoned")
            .insert(verification_method_id.to_string(), key_pair);
    }

    /// Whether a key is registered for the given verification method id.
    #[must_use]
    pub fn contains(&self, verification_method_id: &str) -> bool {
        self.keys.lock().expect("key store mutex poisoned").contains_key(verification_method_id)
    }

    /// The public key multibase for a registered verification method, if any.
    #[must_use]
    pub fn public_key(&self, verification_method_id: &str) -> Option<String> {
        self.keys
            .lock()
            .expect("key store mutex poisoned")
            .get(verification_method_id)
            .map(|kp| kp.public_key_multibase.clone())
    }

    /// Sign `message` with the key registered under `verification_method_id`.
    /// The private key is read for the duration of this call only.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SigningFailed`] if no key is registered for the id.
    pub fn sign(&self, verification_method_id: &str, message: &[u8]) -> Result<Vec<u8>> {
        let keys = self.keys.lock().expect("key store mutex poisoned");
        let key_pair = keys.get(verification_method_id).ok_or_else(|| {
            Error::SigningFailed(format!("no key registered for {verification_method_id}"))
        })?;
        signer::sign(message, &key_pair.private_key_multibase)
    }

    /// The ids of every verification method with a registered key.
    #[must_use]
    pub fn verification_method_ids(&self) -> Vec<String> {
        self.keys.lock().expect("key store mutex poisoned").keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_uses_registered_key() {
        let store = KeyStore::new();
        let public = store.register_generated("did:peer:abc#key-0", Algorithm::Ed25519);
        let sig = store.sign("did:peer:abc#key-0", b"payload").expect("should sign");
        assert!(signer::verify(b"payload", &sig, &public));
    }

    #[test]
    fn unregistered_key_fails() {
        let store = KeyStore::new();
        let err = store.sign("missing", b"payload").unwrap_err();
        assert!(matches!(err, Error::SigningFailed(_)));
    }
}
