//! `migrateToDIDBTCO` — a DID anchored to a specific satoshi via
//! a Bitcoin ordinal inscription.

use crate::config::Network;
use crate::did::document::DidDocument;
use crate::error::{Error, Result};

/// Maximum satoshi supply: 2,099,999,997,690,000.
pub const MAX_SATOSHI: u64 = 2_099_999_997_690_000;

/// Validate a satoshi identifier: a non-negative integer `<= MAX_SATOSHI`.
/// Represented as `u64`, so non-negativity is automatic; only the upper
/// bound is checked.
///
/// # Errors
///
/// Returns [`Error::Input`] if `satoshi` exceeds [`MAX_SATOSHI`].
pub fn validate_satoshi(satoshi: u64) -> Result<()> {
    if satoshi > MAX_SATOSHI {
        return Err(Error::Input(format!("satoshi {satoshi} exceeds maximum supply")));
    }
    Ok(())
}

/// Build the `did:btco[(:reg|:sig)]:<satoshi>` identifier for `satoshi` on
/// `network`.
#[must_use]
pub fn btco_did(network: Network, satoshi: u64) -> String {
    format!("{}{satoshi}", network.did_prefix())
}

/// Migrate a DID document (peer or webvh) to `btco`, anchored at `satoshi`.
///
/// Carries over the first declared verification method's key material when
/// it is decodable; otherwise emits a minimal document with only
/// `@context` and the prefixed DID. Service endpoints from the
/// source document are always preserved.
///
/// # Errors
///
/// Returns [`Error::Input`] if `satoshi` exceeds [`MAX_SATOSHI`].
pub fn migrate_to_btco(source: &DidDocument, network: Network, satoshi: u64) -> Result<DidDocument> {
    validate_satoshi(satoshi)?;
    let did = btco_did(network, satoshi);

    let Some(first_vm) = source.verification_method.as_ref().and_then(|vms| vms.first()) else {
        let mut doc = DidDocument::minimal(did);
        doc.service = source.service.clone();
        return Ok(doc);
    };

    let Some(public_key_multibase) = &first_vm.public_key_multibase else {
        let mut doc = DidDocument::minimal(did);
        doc.service = source.service.clone();
        return Ok(doc);
    };

    if originals_keyring::decode_key(public_key_multibase).is_err() {
        let mut doc = DidDocument::minimal(did);
        doc.service = source.service.clone();
        return Ok(doc);
    }

    let vm_id = format!("{did}#key-0");
    let vm = crate::did::document::VerificationMethod {
        id: vm_id.clone(),
        type_: "Multikey".to_string(),
        controller: did.clone(),
        public_key_multibase: Some(public_key_multibase.clone()),
    };

    Ok(DidDocument {
        context: vec![crate::did::document::DID_CONTEXT.to_string()],
        id: did,
        verification_method: Some(vec![vm]),
        authentication: Some(vec![crate::core::Kind::String(vm_id.clone())]),
        assertion_method: Some(vec![crate::core::Kind::String(vm_id)]),
        key_agreement: None,
        capability_invocation: None,
        capability_delegation: None,
        service: source.service.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::did::peer;
    use originals_keyring::Algorithm;

    #[test]
    fn prefixes_match_network() {
        assert_eq!(btco_did(Network::Mainnet, 42), "did:btco:42");
        assert_eq!(btco_did(Network::Regtest, 42), "did:btco:reg:42");
        assert_eq!(btco_did(Network::Signet, 42), "did:btco:sig:42");
    }

    #[test]
    fn rejects_satoshi_over_max_supply() {
        assert!(validate_satoshi(MAX_SATOSHI + 1).is_err());
        assert!(validate_satoshi(MAX_SATOSHI).is_ok());
    }

    #[test]
    fn carries_over_decodable_key_material() {
        let (peer_doc, _kp) = peer::create(Algorithm::Ed25519);
        let migrated = migrate_to_btco(&peer_doc, Network::Mainnet, 100).expect("should migrate");
        assert_eq!(migrated.id, "did:btco:100");
        assert!(migrated.verification_method.is_some());
    }

    #[test]
    fn minimal_document_when_no_verification_method() {
        let source = DidDocument::minimal("did:peer:abc");
        let migrated = migrate_to_btco(&source, Network::Mainnet, 100).expect("should migrate");
        assert!(migrated.verification_method.is_none());
    }
}
