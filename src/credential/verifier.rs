//! Credential/presentation verification.

use crate::core::OneMany;
use crate::did::DidManager;
use crate::loader::DocumentLoader;
use crate::proof::{verify_proof, VerifyProofOptions};

use super::{CredentialVerificationResult, VerifiableCredential, VerifiablePresentation};

/// Verify a single credential.
///
/// Rejects missing `@context`, `type`, or `proof`; pre-loads every context
/// IRI through `loader`; resolves the proof's verification method (which may
/// belong to a different DID than `issuer`, per the issuer/signer split
/// tested for `ResourceMigrated` credentials) and verifies the proof.
pub async fn verify_credential(
    credential: &VerifiableCredential, loader: &mut DocumentLoader, dids: &DidManager,
) -> CredentialVerificationResult {
    let mut errors = Vec::new();

    if credential.context.is_empty() {
        errors.push("missing @context".to_string());
    }
    if credential.type_.is_empty() {
        errors.push("missing type".to_string());
    }
    let Some(proof) = credential.proof.as_ref() else {
        errors.push("missing proof".to_string());
        return CredentialVerificationResult { verified: false, errors };
    };
    if !errors.is_empty() {
        return CredentialVerificationResult { verified: false, errors };
    }

    for context in &credential.context {
        if context.starts_with("http") {
            if let Err(e) = loader.load(context, dids).await {
                errors.push(format!("failed to load context {context}: {e}"));
            }
        }
    }

    let proof = match proof {
        OneMany::One(p) => p.clone(),
        OneMany::Many(ps) => match ps.first() {
            Some(p) => p.clone(),
            None => {
                errors.push("empty proof array".to_string());
                return CredentialVerificationResult { verified: false, errors };
            }
        },
    };

    let vm_owner = proof.verification_method.split('#').next().unwrap_or(&proof.verification_method);
    let Some(vm_doc) = dids.resolve(vm_owner).await else {
        errors.push(format!("could not resolve verification method owner {vm_owner}"));
        return CredentialVerificationResult { verified: false, errors };
    };
    let Some(vm) = vm_doc.verification_method(&proof.verification_method) else {
        errors.push(format!("verification method {} not declared", proof.verification_method));
        return CredentialVerificationResult { verified: false, errors };
    };
    let Some(public_key) = &vm.public_key_multibase else {
        errors.push("verification method has no publicKeyMultibase".to_string());
        return CredentialVerificationResult { verified: false, errors };
    };

    let mut unsigned = credential.clone();
    unsigned.proof = None;
    let Ok(document_value) = serde_json::to_value(&unsigned) else {
        errors.push("failed to serialize credential".to_string());
        return CredentialVerificationResult { verified: false, errors };
    };

    let result =
        verify_proof(&document_value, &proof, &VerifyProofOptions { public_key: public_key.clone() });
    if !result.verified {
        errors.extend(result.errors);
        return CredentialVerificationResult { verified: false, errors };
    }

    CredentialVerificationResult { verified: true, errors: vec![] }
}

/// Verify a presentation and every embedded credential.
pub async fn verify_presentation(
    presentation: &VerifiablePresentation, loader: &mut DocumentLoader, dids: &DidManager,
) -> CredentialVerificationResult {
    let mut errors = Vec::new();

    if presentation.context.is_empty() {
        errors.push("missing @context".to_string());
    }
    let Some(proof) = presentation.proof.as_ref() else {
        errors.push("missing proof".to_string());
        return CredentialVerificationResult { verified: false, errors };
    };
    if !errors.is_empty() {
        return CredentialVerificationResult { verified: false, errors };
    }

    let proof = match proof {
        OneMany::One(p) => p.clone(),
        OneMany::Many(ps) => match ps.first() {
            Some(p) => p.clone(),
            None => {
                errors.push("empty proof array".to_string());
                return CredentialVerificationResult { verified: false, errors };
            }
        },
    };

    let vm_owner = proof.verification_method.split('#').next().unwrap_or(&proof.verification_method);
    let Some(vm_doc) = dids.resolve(vm_owner).await else {
        errors.push(format!("could not resolve verification method owner {vm_owner}"));
        return CredentialVerificationResult { verified: false, errors };
    };
    let Some(vm) = vm_doc.verification_method(&proof.verification_method) else {
        errors.push(format!("verification method {} not declared", proof.verification_method));
        return CredentialVerificationResult { verified: false, errors };
    };
    let Some(public_key) = vm.public_key_multibase.clone() else {
        errors.push("verification method has no publicKeyMultibase".to_string());
        return CredentialVerificationResult { verified: false, errors };
    };

    let mut unsigned = presentation.clone();
    unsigned.proof = None;
    let Ok(document_value) = serde_json::to_value(&unsigned) else {
        errors.push("failed to serialize presentation".to_string());
        return CredentialVerificationResult { verified: false, errors };
    };

    let result = verify_proof(&document_value, &proof, &VerifyProofOptions { public_key });
    if !result.verified {
        errors.extend(result.errors);
    }

    for credential in &presentation.verifiable_credential {
        let inner = Box::pin(verify_credential(credential, loader, dids)).await;
        if !inner.verified {
            errors.extend(inner.errors.into_iter().map(|e| format!("embedded credential: {e}")));
        }
    }

    CredentialVerificationResult { verified: errors.is_empty(), errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::credential::{issue_credential, IssueOptions};
    use crate::provider::{FetchResponse, HttpFetch};
    use async_trait::async_trait;
    use originals_keyring::{Algorithm, KeyPair};
    use std::sync::Arc;
    use std::time::Duration;

    struct NoopFetch;
    #[async_trait]
    impl HttpFetch for NoopFetch {
        async fn fetch(&self, _url: &str, _timeout: Duration) -> crate::error::Result<FetchResponse> {
            Ok(FetchResponse { body: b"{}".to_vec(), content_type: None })
        }
    }

    #[tokio::test]
    async fn verifies_credential_signed_by_peer_key() {
        let dids = DidManager::new(Config::default());
        let (doc, kp) = dids.create_peer_did_with(Algorithm::Ed25519);
        let vm_id = doc.verification_method.as_ref().unwrap()[0].id.clone();

        let vc = issue_credential(
            &doc.id,
            &["ResourceCreated"],
            serde_json::json!({"resourceId": "res1"}),
            IssueOptions {
                proof_purpose: "assertionMethod".to_string(),
                verification_method: vm_id,
                private_key: kp.private_key_multibase,
                challenge: None,
                domain: None,
                created: None,
            },
        )
        .expect("should issue");

        let mut loader = DocumentLoader::new(Arc::new(NoopFetch));
        let result = verify_credential(&vc, &mut loader, &dids).await;
        assert!(result.verified, "{:?}", result.errors);
    }

    #[tokio::test]
    async fn missing_proof_fails() {
        let dids = DidManager::new(Config::default());
        let mut loader = DocumentLoader::new(Arc::new(NoopFetch));
        let vc = VerifiableCredential {
            context: vec![super::super::CREDENTIALS_V2_CONTEXT.to_string()],
            type_: vec!["VerifiableCredential".to_string()],
            issuer: "did:peer:abc".to_string(),
            issuance_date: chrono::Utc::now(),
            credential_subject: serde_json::json!({}),
            proof: None,
        };
        let result = verify_credential(&vc, &mut loader, &dids).await;
        assert!(!result.verified);
    }
}
