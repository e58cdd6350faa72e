//! `createDIDWebVH`.

use std::sync::Arc;

use chrono::Utc;

use crate::core::Kind;
use crate::did::document::{DidDocument, VerificationMethod, DID_CONTEXT};
use crate::error::{Error, Result};
use crate::provider::{ExternalSigner, StorageAdapter};
use originals_keyring::{Algorithm, KeyPair};

use super::log::{save_did_log, DidLog, DidLogEntry, Parameters};
use super::path::{validate_domain, validate_path_segment};
use super::{METHOD_PREFIX, SCID_PLACEHOLDER};

/// Key material supplied to [`create_did_webvh`]: either an internally
/// generated/caller-supplied key pair, or an external signer plus the
/// verification methods and update keys it speaks for.
pub enum KeyMaterial {
    /// Use an internally-held key pair; a `#key-0` verification method is
    /// registered in both `authentication` and `assertionMethod`, and
    /// `updateKeys` is derived as `["did:key:<publicKeyMultibase>"]`.
    Internal {
        /// The key pair to embed. Defaults to a new Ed25519 key pair if
        /// `None`.
        key_pair: Option<KeyPair>,
    },
    /// Delegate signing to an external collaborator; `verification_methods`
    /// and `update_keys` must both be non-empty.
    External {
        /// The signer used to produce the initial log entry's proof.
        signer: Arc<dyn ExternalSigner>,
        /// Verification methods to embed in the document.
        verification_methods: Vec<VerificationMethod>,
        /// Keys authorized to sign subsequent log entries.
        update_keys: Vec<String>,
    },
}

/// Options accepted by [`create_did_webvh`].
pub struct CreateWebvhOptions {
    /// The HTTPS origin the DID is published under.
    pub domain: String,
    /// Key material: internal or external.
    pub key_material: KeyMaterial,
    /// Path segments under the domain, e.g. `["alice"]`.
    pub paths: Vec<String>,
    /// Whether the DID may later move domains.
    pub portable: bool,
    /// If set, the log is persisted via the storage adapter.
    pub storage: Option<Arc<dyn StorageAdapter>>,
}

/// The result of [`create_did_webvh`].
pub struct CreateWebvhResult {
    /// The resulting DID document.
    pub document: DidDocument,
    /// The initial (single-entry) log.
    pub log: DidLog,
    /// The generated key pair, if [`KeyMaterial::Internal`] was used.
    pub key_pair: Option<KeyPair>,
}

/// Create a `did:webvh` document and its initial log entry.
///
/// # Errors
///
/// Returns [`Error::Input`] if the domain or any path segment is invalid, or
/// if `KeyMaterial::External` is missing verification methods or update
/// keys.
pub async fn create_did_webvh(options: CreateWebvhOptions) -> Result<CreateWebvhResult> {
    validate_domain(&options.domain)?;
    for segment in &options.paths {
        validate_path_segment(segment)?;
    }

    let did = build_did(&options.domain, &options.paths);

    let (document, key_pair, update_keys, signer) = match options.key_material {
        KeyMaterial::Internal { key_pair } => {
            let key_pair = key_pair.unwrap_or_else(|| KeyPair::generate(Algorithm::Ed25519));
            let vm_id = format!("{did}#key-0");
            let vm = VerificationMethod {
                id: vm_id.clone(),
                type_: "Multikey".to_string(),
                controller: did.clone(),
                public_key_multibase: Some(key_pair.public_key_multibase.clone()),
            };
            let document = DidDocument {
                context: vec![DID_CONTEXT.to_string()],
                id: did.clone(),
                verification_method: Some(vec![vm]),
                authentication: Some(vec![Kind::String(vm_id.clone())]),
                assertion_method: Some(vec![Kind::String(vm_id)]),
                key_agreement: None,
                capability_invocation: None,
                capability_delegation: None,
                service: None,
            };
            let update_keys = vec![format!("did:key:{}", key_pair.public_key_multibase)];
            (document, Some(key_pair), update_keys, None)
        }
        KeyMaterial::External { signer, verification_methods, update_keys } => {
            if verification_methods.is_empty() {
                return Err(Error::Input(
                    "externalSigner requires non-empty verificationMethods".into(),
                ));
            }
            if update_keys.is_empty() {
                return Err(Error::Input("externalSigner requires non-empty updateKeys".into()));
            }
            let vm_ids: Vec<Kind<VerificationMethod>> =
                verification_methods.iter().map(|vm| Kind::String(vm.id.clone())).collect();
            let document = DidDocument {
                context: vec![DID_CONTEXT.to_string()],
                id: did.clone(),
                verification_method: Some(verification_methods),
                authentication: Some(vm_ids.clone()),
                assertion_method: Some(vm_ids),
                key_agreement: None,
                capability_invocation: None,
                capability_delegation: None,
                service: None,
            };
            (document, None, update_keys, Some(signer))
        }
    };

    document.validate()?;

    let mut entry = DidLogEntry {
        version_id: "1".to_string(),
        version_time: Utc::now(),
        parameters: Parameters {
            method: "did:webvh:0.5".to_string(),
            update_keys: update_keys.clone(),
            portable: Some(options.portable),
            deactivated: None,
        },
        state: document.clone(),
        proof: None,
    };

    if let Some(signer) = signer {
        let entry_bytes = serde_json_canonicalizer::to_vec(&entry)
            .map_err(|e| Error::Cryptographic(format!("canonicalization failed: {e}")))?;
        let signature = signer.sign(&entry_bytes).await?;
        entry.proof = Some(vec![crate::proof::DataIntegrityProof {
            type_: "DataIntegrityProof".to_string(),
            cryptosuite: crate::proof::DEFAULT_CRYPTOSUITE.to_string(),
            proof_purpose: "assertionMethod".to_string(),
            verification_method: signer.verification_method_id().await?,
            created: Utc::now(),
            proof_value: signature.proof_value,
            challenge: None,
            domain: None,
        }]);
    } else if let Some(key_pair) = &key_pair {
        let entry_bytes = serde_json_canonicalizer::to_vec(&entry)
            .map_err(|e| Error::Cryptographic(format!("canonicalization failed: {e}")))?;
        let signature = originals_keyring::sign(&entry_bytes, &key_pair.private_key_multibase)
            .map_err(|e| Error::Cryptographic(e.to_string()))?;
        entry.proof = Some(vec![crate::proof::DataIntegrityProof {
            type_: "DataIntegrityProof".to_string(),
            cryptosuite: crate::proof::DEFAULT_CRYPTOSUITE.to_string(),
            proof_purpose: "assertionMethod".to_string(),
            verification_method: format!("{did}#key-0"),
            created: Utc::now(),
            proof_value: originals_keyring::encode_bare(&signature),
            challenge: None,
            domain: None,
        }]);
    }

    let log = vec![entry];

    if let Some(storage) = &options.storage {
        save_did_log(storage.as_ref(), &options.domain, &options.paths, &log).await?;
    }

    Ok(CreateWebvhResult { document, log, key_pair })
}

fn build_did(domain: &str, paths: &[String]) -> String {
    let mut did = format!("{METHOD_PREFIX}{SCID_PLACEHOLDER}:{domain}");
    for segment in paths {
        did.push(':');
        did.push_str(segment);
    }
    did
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn internal_key_material_produces_valid_document() {
        let result = create_did_webvh(CreateWebvhOptions {
            domain: "example.com".to_string(),
            key_material: KeyMaterial::Internal { key_pair: None },
            paths: vec![],
            portable: false,
            storage: None,
        })
        .await
        .expect("should create");
        result.document.validate().expect("document should validate");
        assert_eq!(result.log.len(), 1);
        assert!(result.log[0].proof.is_some());
        assert!(result.key_pair.is_some());
    }

    #[tokio::test]
    async fn rejects_invalid_domain() {
        let err = create_did_webvh(CreateWebvhOptions {
            domain: "not a domain".to_string(),
            key_material: KeyMaterial::Internal { key_pair: None },
            paths: vec![],
            portable: false,
            storage: None,
        })
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Input(_)));
    }

    #[tokio::test]
    async fn rejects_traversal_path_segment() {
        let err = create_did_webvh(CreateWebvhOptions {
            domain: "example.com".to_string(),
            key_material: KeyMaterial::Internal { key_pair: None },
            paths: vec!["..".to_string()],
            portable: false,
            storage: None,
        })
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Input(_)));
    }
}
