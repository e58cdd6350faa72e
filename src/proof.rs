//! # `DataIntegrityProof` engine
//!
//! Creates and verifies `DataIntegrityProof` envelopes using cryptosuite
//! `eddsa-rdfc-2022` by default. Signing bytes are the concatenation of the
//! SHA-256 digest of the canonicalized document (minus `proof`) and the
//! SHA-256 digest of the canonicalized proof options, canonicalized with
//! `serde_json_canonicalizer` rather than a bespoke canonicalizer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use originals_keyring::{sign, verify as keyring_verify};

/// The default, and currently only supported, cryptosuite.
pub const DEFAULT_CRYPTOSUITE: &str = "eddsa-rdfc-2022";

/// The verification method type the proof engine emits.
pub const VERIFICATION_METHOD_TYPE: &str = "Multikey";

/// A `DataIntegrityProof` envelope.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DataIntegrityProof {
    /// Always `"DataIntegrityProof"`.
    #[serde(rename = "type")]
    pub type_: String,
    /// The cryptosuite used to produce `proof_value`.
    pub cryptosuite: String,
    /// The reason for the proof (e.g. `assertionMethod`).
    pub proof_purpose: String,
    /// The verification method id used to produce the signature.
    pub verification_method: String,
    /// Proof creation timestamp.
    pub created: DateTime<Utc>,
    /// Multibase-encoded signature over the document + proof options.
    pub proof_value: String,
    /// Optional replay-attack challenge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,
    /// Optional security domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

/// Options accepted by [`create_proof`].
#[derive(Clone, Debug)]
pub struct CreateProofOptions {
    /// Cryptosuite to use; defaults to [`DEFAULT_CRYPTOSUITE`].
    pub cryptosuite: Option<String>,
    /// The reason for the proof (e.g. `assertionMethod`).
    pub proof_purpose: String,
    /// Proof creation timestamp; defaults to now.
    pub created: Option<DateTime<Utc>>,
    /// The verification method id attributed to the signature.
    pub verification_method: String,
    /// The multibase private key used to sign.
    pub private_key: String,
    /// Optional replay-attack challenge.
    pub challenge: Option<String>,
    /// Optional security domain.
    pub domain: Option<String>,
}

/// Options accepted by [`verify_proof`]. The source's `documentLoader` is
/// not consulted here: this proof suite verifies directly against the
/// embedded `verificationMethod`'s key material, which the caller resolves
/// (typically via [`crate::loader::DocumentLoader`]) and passes in.
#[derive(Clone, Debug)]
pub struct VerifyProofOptions {
    /// The public key multibase to verify against.
    pub public_key: String,
}

/// The result of [`verify_proof`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VerificationResult {
    /// Whether the proof verified.
    pub verified: bool,
    /// Human-readable errors, if verification failed.
    pub errors: Vec<String>,
}

fn canonicalize_digest(value: &Value) -> Result<[u8; 32]> {
    let canonical = serde_json_canonicalizer::to_vec(value)
        .map_err(|e| Error::Cryptographic(format!("canonicalization failed: {e}")))?;
    Ok(Sha256::digest(canonical).into())
}

/// Compute the bytes a `DataIntegrityProof` signs: the concatenation of the
/// SHA-256 digest of `document` (with `proof` removed) and the SHA-256
/// digest of the proof options object (everything but `proofValue`).
fn signing_bytes(document: &Value, proof_options: &Value) -> Result<Vec<u8>> {
    let mut doc_without_proof = document.clone();
    if let Some(obj) = doc_without_proof.as_object_mut() {
        obj.remove("proof");
    }
    let doc_digest = canonicalize_digest(&doc_without_proof)?;
    let options_digest = canonicalize_digest(proof_options)?;
    let mut bytes = Vec::with_capacity(64);
    bytes.extend_from_slice(&doc_digest);
    bytes.extend_from_slice(&options_digest);
    Ok(bytes)
}

fn proof_options_value(proof: &DataIntegrityProof) -> Value {
    serde_json::json!({
        "type": proof.type_,
        "cryptosuite": proof.cryptosuite,
        "proofPurpose": proof.proof_purpose,
        "verificationMethod": proof.verification_method,
        "created": proof.created,
        "challenge": proof.challenge,
        "domain": proof.domain,
    })
}

/// Create a `DataIntegrityProof` over `document`.
///
/// # Errors
///
/// Returns [`Error::Cryptographic`] if canonicalization or signing fails.
pub fn create_proof(
    document: &Value, options: CreateProofOptions,
) -> Result<DataIntegrityProof> {
    let private_key = options.private_key.clone();
    create_proof_with_signer(
        document,
        ProofMetadata {
            cryptosuite: options.cryptosuite,
            proof_purpose: options.proof_purpose,
            created: options.created,
            verification_method: options.verification_method,
            challenge: options.challenge,
            domain: options.domain,
        },
        |bytes| sign(bytes, &private_key).map_err(|e| Error::Cryptographic(e.to_string())),
    )
}

/// The fields a `DataIntegrityProof` carries besides its signature, shared
/// between [`create_proof`] and [`create_proof_with_signer`].
#[derive(Clone, Debug)]
pub struct ProofMetadata {
    /// Cryptosuite to use; defaults to [`DEFAULT_CRYPTOSUITE`].
    pub cryptosuite: Option<String>,
    /// The reason for the proof (e.g. `assertionMethod`).
    pub proof_purpose: String,
    /// Proof creation timestamp; defaults to now.
    pub created: Option<DateTime<Utc>>,
    /// The verification method id attributed to the signature.
    pub verification_method: String,
    /// Optional replay-attack challenge.
    pub challenge: Option<String>,
    /// Optional security domain.
    pub domain: Option<String>,
}

/// Create a `DataIntegrityProof` over `document`, signing with `sign_fn`
/// rather than a raw private key. Used where the signing key is held by a
/// [`originals_keyring::KeyStore`] or an [`crate::provider::ExternalSigner`]
/// rather than passed directly.
///
/// # Errors
///
/// Returns [`Error::Cryptographic`] if canonicalization fails, or whatever
/// `sign_fn` returns on a signing failure.
pub fn create_proof_with_signer(
    document: &Value, meta: ProofMetadata, sign_fn: impl FnOnce(&[u8]) -> Result<Vec<u8>>,
) -> Result<DataIntegrityProof> {
    let mut proof = DataIntegrityProof {
        type_: "DataIntegrityProof".to_string(),
        cryptosuite: meta.cryptosuite.unwrap_or_else(|| DEFAULT_CRYPTOSUITE.to_string()),
        proof_purpose: meta.proof_purpose,
        verification_method: meta.verification_method,
        created: meta.created.unwrap_or_else(Utc::now),
        proof_value: String::new(),
        challenge: meta.challenge,
        domain: meta.domain,
    };

    let proof_options = proof_options_value(&proof);
    let bytes = signing_bytes(document, &proof_options)?;
    let signature = sign_fn(&bytes)?;
    proof.proof_value = originals_keyring::encode_bare(&signature);
    Ok(proof)
}

/// Create a `DataIntegrityProof` over `document`, delegating the signature
/// itself to `sign_fn`, which returns the final multibase `proof_value`
/// string rather than raw signature bytes.
///
/// This covers both of the lifecycle manager's signing paths uniformly: a
/// [`originals_keyring::KeyStore`] signs and the caller encodes with
/// [`originals_keyring::encode_bare`], while a
/// [`crate::provider::ExternalSigner`] returns an already-encoded
/// `proof_value` directly — encoding it a second time would corrupt it.
///
/// # Errors
///
/// Returns [`Error::Cryptographic`] if canonicalization fails, or whatever
/// `sign_fn` returns on a signing failure.
pub async fn create_proof_with_proof_value<F, Fut>(
    document: &Value, meta: ProofMetadata, sign_fn: F,
) -> Result<DataIntegrityProof>
where
    F: FnOnce(Vec<u8>) -> Fut,
    Fut: std::future::Future<Output = Result<String>>,
{
    let mut proof = DataIntegrityProof {
        type_: "DataIntegrityProof".to_string(),
        cryptosuite: meta.cryptosuite.unwrap_or_else(|| DEFAULT_CRYPTOSUITE.to_string()),
        proof_purpose: meta.proof_purpose,
        verification_method: meta.verification_method,
        created: meta.created.unwrap_or_else(Utc::now),
        proof_value: String::new(),
        challenge: meta.challenge,
        domain: meta.domain,
    };

    let proof_options = proof_options_value(&proof);
    let bytes = signing_bytes(document, &proof_options)?;
    proof.proof_value = sign_fn(bytes).await?;
    Ok(proof)
}

/// Verify a `DataIntegrityProof` over `document`.
///
/// Never propagates an underlying error; any failure (bad canonicalization,
/// bad key, bad signature) is reported through
/// [`VerificationResult::verified`] being `false` with an explanatory
/// message in [`VerificationResult::errors`].
#[must_use]
pub fn verify_proof(
    document: &Value, proof: &DataIntegrityProof, options: &VerifyProofOptions,
) -> VerificationResult {
    let proof_options = proof_options_value(proof);
    let Ok(bytes) = signing_bytes(document, &proof_options) else {
        return VerificationResult {
            verified: false,
            errors: vec!["failed to canonicalize document or proof options".to_string()],
        };
    };
    let Ok(signature) = originals_keyring::decode_bare(&proof.proof_value) else {
        return VerificationResult {
            verified: false,
            errors: vec!["proofValue is not valid multibase".to_string()],
        };
    };
    if keyring_verify(&bytes, &signature, &options.public_key) {
        VerificationResult { verified: true, errors: vec![] }
    } else {
        VerificationResult { verified: false, errors: vec!["signature did not verify".to_string()] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use originals_keyring::{Algorithm, KeyPair};

    #[test]
    fn create_then_verify_round_trips() {
        let kp = KeyPair::generate(Algorithm::Ed25519);
        let document = serde_json::json!({"hello": "world"});
        let proof = create_proof(
            &document,
            CreateProofOptions {
                cryptosuite: None,
                proof_purpose: "assertionMethod".to_string(),
                created: None,
                verification_method: "did:peer:abc#key-0".to_string(),
                private_key: kp.private_key_multibase.clone(),
                challenge: None,
                domain: None,
            },
        )
        .expect("should create proof");

        let mut signed_document = document.clone();
        signed_document["proof"] = serde_json::to_value(&proof).expect("proof must serialize");

        let result = verify_proof(
            &signed_document,
            &proof,
            &VerifyProofOptions { public_key: kp.public_key_multibase },
        );
        assert!(result.verified, "{:?}", result.errors);
    }

    #[test]
    fn tampered_document_fails_verification() {
        let kp = KeyPair::generate(Algorithm::Ed25519);
        let document = serde_json::json!({"hello": "world"});
        let proof = create_proof(
            &document,
            CreateProofOptions {
                cryptosuite: None,
                proof_purpose: "assertionMethod".to_string(),
                created: None,
                verification_method: "did:peer:abc#key-0".to_string(),
                private_key: kp.private_key_multibase,
                challenge: None,
                domain: None,
            },
        )
        .expect("should create proof");

        let tampered = serde_json::json!({"hello": "world!"});
        let result = verify_proof(
            &tampered,
            &proof,
            &VerifyProofOptions {
                public_key: KeyPair::generate(Algorithm::Ed25519).public_key_multibase,
            },
        );
        assert!(!result.verified);
    }
}
