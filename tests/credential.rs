//! Integration tests for credential issuance and verification,
//! including the issuer/signer split `ResourceMigrated` credentials rely on.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use originals::config::Config;
use originals::credential::{issue_credential, issue_presentation, verify_credential, verify_presentation, IssueOptions};
use originals::did::DidManager;
use originals::loader::DocumentLoader;
use originals::provider::{FetchResponse, HttpFetch};
use originals_keyring::Algorithm;

struct NoopFetch;

#[async_trait]
impl HttpFetch for NoopFetch {
    async fn fetch(&self, _url: &str, _timeout: Duration) -> originals::Result<FetchResponse> {
        Ok(FetchResponse { body: b"{}".to_vec(), content_type: None })
    }
}

fn loader() -> DocumentLoader {
    DocumentLoader::new(Arc::new(NoopFetch))
}

#[tokio::test]
async fn a_freshly_issued_credential_verifies() {
    let dids = DidManager::new(Config::default());
    let (doc, kp) = dids.create_peer_did_with(Algorithm::Ed25519);
    let vm_id = doc.verification_method.as_ref().unwrap()[0].id.clone();

    let vc = issue_credential(
        &doc.id,
        &["ResourceCreated"],
        serde_json::json!({"resourceId": "res-1", "contentHash": "deadbeef"}),
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

    assert_eq!(vc.type_, vec!["VerifiableCredential".to_string(), "ResourceCreated".to_string()]);
    assert_eq!(vc.issuer, doc.id);

    let mut ld = loader();
    let result = verify_credential(&vc, &mut ld, &dids).await;
    assert!(result.verified, "errors: {:?}", result.errors);
}

#[tokio::test]
async fn tampering_with_the_subject_breaks_verification() {
    let dids = DidManager::new(Config::default());
    let (doc, kp) = dids.create_peer_did_with(Algorithm::Ed25519);
    let vm_id = doc.verification_method.as_ref().unwrap()[0].id.clone();

    let mut vc = issue_credential(
        &doc.id,
        &["ResourceCreated"],
        serde_json::json!({"resourceId": "res-1"}),
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

    vc.credential_subject = serde_json::json!({"resourceId": "res-2-tampered"});

    let mut ld = loader();
    let result = verify_credential(&vc, &mut ld, &dids).await;
    assert!(!result.verified, "a tampered subject must not verify");
}

#[tokio::test]
async fn resource_migrated_issuer_and_signer_may_differ() {
    // A `ResourceMigrated` credential's issuer stays the original peer DID
    // while the signature is attributed to the currently active publisher
    // key — a different DID entirely.
    let dids = DidManager::new(Config::default());
    let (peer_doc, _peer_kp) = dids.create_peer_did_with(Algorithm::Ed25519);
    let (webvh_doc, webvh_kp) = dids.create_peer_did_with(Algorithm::Ed25519);
    let webvh_vm_id = webvh_doc.verification_method.as_ref().unwrap()[0].id.clone();

    let vc = issue_credential(
        &peer_doc.id,
        &["ResourceMigrated"],
        serde_json::json!({
            "id": peer_doc.id,
            "fromLayer": "peer",
            "toLayer": "webvh",
        }),
        IssueOptions {
            proof_purpose: "assertionMethod".to_string(),
            verification_method: webvh_vm_id,
            private_key: webvh_kp.private_key_multibase,
            challenge: None,
            domain: None,
            created: None,
        },
    )
    .expect("should issue");

    assert_eq!(vc.issuer, peer_doc.id, "issuer must remain the original peer DID");
    let proof_vm = match vc.proof.as_ref().unwrap() {
        originals::core::OneMany::One(p) => p.verification_method.clone(),
        originals::core::OneMany::Many(ps) => ps[0].verification_method.clone(),
    };
    assert!(proof_vm.starts_with(&webvh_doc.id), "signature must be attributed to the publisher key");
    assert_ne!(proof_vm.split('#').next().unwrap(), peer_doc.id);

    let mut ld = loader();
    let result = verify_credential(&vc, &mut ld, &dids).await;
    assert!(result.verified, "errors: {:?}", result.errors);
}

#[tokio::test]
async fn issuing_with_a_non_ed25519_key_is_rejected() {
    use originals_keyring::KeyPair;

    let kp = KeyPair::generate(Algorithm::Secp256k1);
    let err = issue_credential(
        "did:peer:abc",
        &[],
        serde_json::json!({}),
        IssueOptions {
            proof_purpose: "assertionMethod".to_string(),
            verification_method: "did:peer:abc#key-0".to_string(),
            private_key: kp.private_key_multibase,
            challenge: None,
            domain: None,
            created: None,
        },
    )
    .unwrap_err();
    assert!(matches!(err, originals::Error::Cryptographic(_)));
}

#[tokio::test]
async fn a_presentation_verifies_every_embedded_credential() {
    let dids = DidManager::new(Config::default());
    let (doc, kp) = dids.create_peer_did_with(Algorithm::Ed25519);
    let vm_id = doc.verification_method.as_ref().unwrap()[0].id.clone();

    let vc_a = issue_credential(
        &doc.id,
        &["ResourceCreated"],
        serde_json::json!({"resourceId": "a"}),
        IssueOptions {
            proof_purpose: "assertionMethod".to_string(),
            verification_method: vm_id.clone(),
            private_key: kp.private_key_multibase.clone(),
            challenge: None,
            domain: None,
            created: None,
        },
    )
    .expect("should issue a");
    let vc_b = issue_credential(
        &doc.id,
        &["ResourceCreated"],
        serde_json::json!({"resourceId": "b"}),
        IssueOptions {
            proof_purpose: "assertionMethod".to_string(),
            verification_method: vm_id.clone(),
            private_key: kp.private_key_multibase.clone(),
            challenge: None,
            domain: None,
            created: None,
        },
    )
    .expect("should issue b");

    let vp = issue_presentation(
        vec![vc_a, vc_b],
        IssueOptions {
            proof_purpose: "authentication".to_string(),
            verification_method: vm_id,
            private_key: kp.private_key_multibase,
            challenge: Some("challenge-123".to_string()),
            domain: None,
            created: None,
        },
    )
    .expect("should issue presentation");

    let mut ld = loader();
    let result = verify_presentation(&vp, &mut ld, &dids).await;
    assert!(result.verified, "errors: {:?}", result.errors);
}
