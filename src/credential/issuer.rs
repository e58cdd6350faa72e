//! Credential/presentation issuance.

use chrono::Utc;
use serde_json::Value;

use crate::core::OneMany;
use crate::error::{Error, Result};
use crate::proof::{create_proof, CreateProofOptions, DEFAULT_CRYPTOSUITE};
use originals_keyring::{decode_key, Algorithm};

use super::{VerifiableCredential, VerifiablePresentation, CREDENTIALS_V2_CONTEXT};

/// Options accepted by [`issue_credential`] / [`issue_presentation`].
#[derive(Clone, Debug)]
pub struct IssueOptions {
    /// The reason for the proof (e.g. `assertionMethod`).
    pub proof_purpose: String,
    /// The verification method id attributed to the signature.
    pub verification_method: String,
    /// The multibase private key to sign with (the source's
    /// `secretKeyMultibase`).
    pub private_key: String,
    /// Optional replay-attack challenge.
    pub challenge: Option<String>,
    /// Optional security domain.
    pub domain: Option<String>,
    /// Proof creation timestamp; defaults to now.
    pub created: Option<chrono::DateTime<Utc>>,
}

/// The only key algorithm the default `eddsa-rdfc-2022` cryptosuite
/// supports.
fn assert_cryptosuite_supports_key(private_key: &str) -> Result<()> {
    let decoded = decode_key(private_key)?;
    if decoded.algorithm != Algorithm::Ed25519 {
        return Err(Error::Cryptographic(format!(
            "cryptosuite {DEFAULT_CRYPTOSUITE} does not support key algorithm {}",
            decoded.algorithm
        )));
    }
    Ok(())
}

/// Issue a credential over `credential_subject`, tagged with `extra_types`
/// in addition to `VerifiableCredential`.
///
/// # Errors
///
/// Returns [`Error::Cryptographic`] if the verification method's key type
/// is unsupported by the current cryptosuite, or if signing fails.
pub fn issue_credential(
    issuer: &str, extra_types: &[&str], credential_subject: Value, options: IssueOptions,
) -> Result<VerifiableCredential> {
    assert_cryptosuite_supports_key(&options.private_key)?;

    let mut type_ = vec!["VerifiableCredential".to_string()];
    type_.extend(extra_types.iter().map(ToString::to_string));

    let mut credential = VerifiableCredential {
        context: vec![CREDENTIALS_V2_CONTEXT.to_string()],
        type_,
        issuer: issuer.to_string(),
        issuance_date: options.created.unwrap_or_else(Utc::now),
        credential_subject,
        proof: None,
    };

    let unsigned_value = serde_json::to_value(&credential)?;
    let proof = create_proof(
        &unsigned_value,
        CreateProofOptions {
            cryptosuite: None,
            proof_purpose: options.proof_purpose,
            created: options.created,
            verification_method: options.verification_method,
            private_key: options.private_key,
            challenge: options.challenge,
            domain: options.domain,
        },
    )?;
    credential.proof = Some(OneMany::One(proof));
    Ok(credential)
}

/// Issue a presentation wrapping `credentials`.
///
/// # Errors
///
/// Returns the same errors as [`issue_credential`].
pub fn issue_presentation(
    credentials: Vec<VerifiableCredential>, options: IssueOptions,
) -> Result<VerifiablePresentation> {
    assert_cryptosuite_supports_key(&options.private_key)?;

    let mut presentation = VerifiablePresentation {
        context: vec![CREDENTIALS_V2_CONTEXT.to_string()],
        type_: vec!["VerifiablePresentation".to_string()],
        verifiable_credential: credentials,
        proof: None,
    };

    let unsigned_value = serde_json::to_value(&presentation)?;
    let proof = create_proof(
        &unsigned_value,
        CreateProofOptions {
            cryptosuite: None,
            proof_purpose: options.proof_purpose,
            created: options.created,
            verification_method: options.verification_method,
            private_key: options.private_key,
            challenge: options.challenge,
            domain: options.domain,
        },
    )?;
    presentation.proof = Some(OneMany::One(proof));
    Ok(presentation)
}
