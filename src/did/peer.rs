//! # `did:peer`
//!
//! A self-contained, ephemeral DID derived from an embedded public key; no
//! external publication. This implementation produces a long-form peer DID
//! that embeds a single `Multikey` verification method and resolves purely
//! by decoding the DID string itself.

use crate::core::Kind;
use crate::did::document::{DidDocument, VerificationMethod, DID_CONTEXT};
use crate::error::{Error, Result};
use originals_keyring::{Algorithm, KeyPair};

/// `did:peer` numalgo for a single embedded Ed25519/secp256k1/P-256/BLS
/// verification method, long form.
const PEER_PREFIX: &str = "did:peer:0";

/// Generate a new peer DID document and its key pair.
///
/// Returns `(document, key_pair)`; the caller is responsible for registering
/// the private key in a `KeyStore`.
#[must_use]
pub fn create(algorithm: Algorithm) -> (DidDocument, KeyPair) {
    let key_pair = KeyPair::generate(algorithm);
    let did = format!("{PEER_PREFIX}{}", key_pair.public_key_multibase);
    let vm_id = format!("{did}#key-0");

    let vm = VerificationMethod {
        id: vm_id.clone(),
        type_: "Multikey".to_string(),
        controller: did.clone(),
        public_key_multibase: Some(key_pair.public_key_multibase.clone()),
    };

    let document = DidDocument {
        context: vec![DID_CONTEXT.to_string()],
        id: did,
        verification_method: Some(vec![vm]),
        authentication: Some(vec![Kind::String(vm_id.clone())]),
        assertion_method: Some(vec![Kind::String(vm_id)]),
        key_agreement: None,
        capability_invocation: None,
        capability_delegation: None,
        service: None,
    };

    (document, key_pair)
}

/// Resolve a peer DID string back to its document, by decoding the embedded
/// public key.
///
/// # Errors
///
/// Returns [`Error::Input`] if `did` is not a well-formed `did:peer:0...`
/// string, or [`Error::Encoding`] if the embedded key cannot be decoded.
pub fn resolve(did: &str) -> Result<DidDocument> {
    let public_key_multibase = did
        .strip_prefix(PEER_PREFIX)
        .ok_or_else(|| Error::Input(format!("not a did:peer:0 DID: {did}")))?;
    if public_key_multibase.is_empty() {
        return Err(Error::Input(format!("missing embedded key in peer DID: {did}")));
    }
    // Validates that the embedded key decodes; the algorithm itself is not
    // needed to reconstruct the document.
    originals_keyring::decode_key(public_key_multibase)?;

    let vm_id = format!("{did}#key-0");
    let vm = VerificationMethod {
        id: vm_id.clone(),
        type_: "Multikey".to_string(),
        controller: did.to_string(),
        public_key_multibase: Some(public_key_multibase.to_string()),
    };

    Ok(DidDocument {
        context: vec![DID_CONTEXT.to_string()],
        id: did.to_string(),
        verification_method: Some(vec![vm]),
        authentication: Some(vec![Kind::String(vm_id.clone())]),
        assertion_method: Some(vec![Kind::String(vm_id)]),
        key_agreement: None,
        capability_invocation: None,
        capability_delegation: None,
        service: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_resolve_round_trips() {
        let (doc, _kp) = create(Algorithm::Ed25519);
        doc.validate().expect("created document should validate");
        let resolved = resolve(&doc.id).expect("should resolve");
        assert_eq!(resolved, doc);
    }

    #[test]
    fn resolve_rejects_non_peer_did() {
        let err = resolve("did:web:example.com").unwrap_err();
        assert!(matches!(err, Error::Input(_)));
    }
}
