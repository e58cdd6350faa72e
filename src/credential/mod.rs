//! # `CredentialManager`
//!
//! Issues and verifies W3C-shaped Verifiable Credentials and Presentations
//! carrying a single embedded [`crate::proof::DataIntegrityProof`], split
//! into separate [`issuer`] and [`verifier`] modules.

mod issuer;
mod verifier;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use issuer::{issue_credential, issue_presentation, IssueOptions};
pub use verifier::{verify_credential, verify_presentation};

/// The base context every credential/presentation carries first.
pub const CREDENTIALS_V2_CONTEXT: &str = "https://www.w3.org/ns/credentials/v2";

/// A W3C-shaped Verifiable Credential.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableCredential {
    /// Ordered context IRIs, beginning with [`CREDENTIALS_V2_CONTEXT`].
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    /// Credential type tags, e.g. `["VerifiableCredential", "ResourceCreated"]`.
    #[serde(rename = "type")]
    pub type_: Vec<String>,
    /// The issuing DID.
    pub issuer: String,
    /// Issuance timestamp.
    pub issuance_date: DateTime<Utc>,
    /// The claims this credential makes.
    pub credential_subject: Value,
    /// The embedded data integrity proof(s), once issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<crate::core::OneMany<crate::proof::DataIntegrityProof>>,
}

/// A W3C-shaped Verifiable Presentation.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerifiablePresentation {
    /// Ordered context IRIs, beginning with [`CREDENTIALS_V2_CONTEXT`].
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    /// Presentation type tags, e.g. `["VerifiablePresentation"]`.
    #[serde(rename = "type")]
    pub type_: Vec<String>,
    /// Embedded credentials.
    pub verifiable_credential: Vec<VerifiableCredential>,
    /// The embedded data integrity proof(s), once issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<crate::core::OneMany<crate::proof::DataIntegrityProof>>,
}

/// The result of verifying a credential or presentation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CredentialVerificationResult {
    /// Whether every embedded proof verified.
    pub verified: bool,
    /// Human-readable errors accumulated across every check.
    pub errors: Vec<String>,
}

/// Claims carried by a `ResourceCreated` credential.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCreatedSubject {
    /// The asset DID the resource belongs to.
    pub id: String,
    /// The resource's logical id.
    pub resource_id: String,
    /// The resource's categorical type.
    #[serde(rename = "type")]
    pub type_: String,
    /// The resource's MIME type.
    pub content_type: String,
    /// The resource's content hash.
    pub content_hash: String,
    /// The asset's creator DID.
    pub creator: String,
    /// ISO-8601 creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Claims carried by a `ResourceMigrated` credential.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMigratedSubject {
    /// The asset DID.
    pub id: String,
    /// The layer migrated from.
    pub from_layer: String,
    /// The layer migrated to.
    pub to_layer: String,
    /// ISO-8601 migration timestamp.
    pub migrated_at: DateTime<Utc>,
}
