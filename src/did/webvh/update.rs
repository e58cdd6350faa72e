//! `updateDIDWebVH`.

use std::sync::Arc;

use chrono::Utc;

use crate::did::document::DidDocument;
use crate::error::{Error, Result};
use crate::provider::{ExternalSigner, StorageAdapter};
use originals_keyring::KeyPair;

use super::log::{save_did_log, DidLog, DidLogEntry};

/// The signer used to authorize a webvh update: either an internally-held
/// key pair or an external collaborator.
pub enum UpdateSigner {
    /// Sign with an internally-held key pair.
    Internal(KeyPair),
    /// Delegate signing to an external collaborator.
    External(Arc<dyn ExternalSigner>),
}

/// Merge `updates` into the latest log entry's state (preserving `id`),
/// append a new signed entry, validate, and optionally persist.
///
/// # Errors
///
/// Returns [`Error::Input`] if `log` is empty, or propagates validation,
/// signing, or storage failures.
pub async fn update_did_webvh(
    log: &mut DidLog, updates: DidDocument, signer: UpdateSigner,
    storage: Option<(&dyn StorageAdapter, &str, &[String])>,
) -> Result<DidDocument> {
    let latest = log.last().ok_or_else(|| Error::Input("did log is empty".into()))?;
    let mut merged = updates;
    merged.id = latest.state.id.clone();
    merged.validate()?;

    let mut entry = DidLogEntry {
        version_id: (log.len() + 1).to_string(),
        version_time: Utc::now(),
        parameters: latest.parameters.clone(),
        state: merged.clone(),
        proof: None,
    };

    let entry_bytes = serde_json_canonicalizer::to_vec(&entry)
        .map_err(|e| Error::Cryptographic(format!("canonicalization failed: {e}")))?;

    let proof = match signer {
        UpdateSigner::Internal(key_pair) => {
            let signature = originals_keyring::sign(&entry_bytes, &key_pair.private_key_multibase)
                .map_err(|e| Error::Cryptographic(e.to_string()))?;
            let vm = merged
                .verification_method
                .as_ref()
                .and_then(|vms| vms.first())
                .map_or_else(|| format!("{}#key-0", merged.id), |vm| vm.id.clone());
            crate::proof::DataIntegrityProof {
                type_: "DataIntegrityProof".to_string(),
                cryptosuite: crate::proof::DEFAULT_CRYPTOSUITE.to_string(),
                proof_purpose: "assertionMethod".to_string(),
                verification_method: vm,
                created: Utc::now(),
                proof_value: originals_keyring::encode_bare(&signature),
                challenge: None,
                domain: None,
            }
        }
        UpdateSigner::External(signer) => {
            let signature = signer.sign(&entry_bytes).await?;
            crate::proof::DataIntegrityProof {
                type_: "DataIntegrityProof".to_string(),
                cryptosuite: crate::proof::DEFAULT_CRYPTOSUITE.to_string(),
                proof_purpose: "assertionMethod".to_string(),
                verification_method: signer.verification_method_id().await?,
                created: Utc::now(),
                proof_value: signature.proof_value,
                challenge: None,
                domain: None,
            }
        }
    };

    entry.proof = Some(vec![proof]);
    log.push(entry);

    if let Some((storage, domain, paths)) = storage {
        save_did_log(storage, domain, paths, log).await?;
    }

    Ok(merged)
}
