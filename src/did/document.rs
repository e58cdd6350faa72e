//! # DID Document model

use serde::{Deserialize, Serialize};

use crate::core::Kind;
use crate::error::{Error, Result};

/// The default `@context` entry every DID document carries.
pub const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";

/// A verification method: a public key declared in a DID document and
/// referenced by a verification relationship.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// The verification method's id, e.g. `did:peer:abc#key-0`.
    pub id: String,
    /// The verification method type. The default proof engine
    /// emits `Multikey`.
    #[serde(rename = "type")]
    pub type_: String,
    /// The DID this verification method belongs to.
    pub controller: String,
    /// Multibase-encoded, multicodec-tagged public key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_multibase: Option<String>,
}

/// A service endpoint declared in a DID document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// The service's id.
    pub id: String,
    /// The service type.
    #[serde(rename = "type")]
    pub type_: String,
    /// The service endpoint URL.
    pub service_endpoint: String,
}

/// A DID document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    /// Ordered list of context IRIs; must include [`DID_CONTEXT`].
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    /// The layer-prefixed DID this document describes.
    pub id: String,
    /// Declared verification methods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<Vec<VerificationMethod>>,
    /// `authentication` verification relationship.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Vec<Kind<VerificationMethod>>>,
    /// `assertionMethod` verification relationship.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertion_method: Option<Vec<Kind<VerificationMethod>>>,
    /// `keyAgreement` verification relationship.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_agreement: Option<Vec<Kind<VerificationMethod>>>,
    /// `capabilityInvocation` verification relationship.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability_invocation: Option<Vec<Kind<VerificationMethod>>>,
    /// `capabilityDelegation` verification relationship.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability_delegation: Option<Vec<Kind<VerificationMethod>>>,
    /// Service endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Vec<Service>>,
}

impl DidDocument {
    /// A minimal document: just `@context` and `id`, no verification
    /// methods. Used for resolver skeletons and the btco migration fallback
    /// when source key material can't be decoded.
    #[must_use]
    pub fn minimal(id: impl Into<String>) -> Self {
        Self { context: vec![DID_CONTEXT.to_string()], id: id.into(), ..Self::default() }
    }

    /// Look up a declared verification method by id.
    #[must_use]
    pub fn verification_method(&self, id: &str) -> Option<&VerificationMethod> {
        self.verification_method.as_ref()?.iter().find(|vm| vm.id == id)
    }

    /// The ids referenced by a verification relationship, resolving inline
    /// verification methods to their id.
    #[must_use]
    pub fn relationship_ids(relationship: &[Kind<VerificationMethod>]) -> Vec<String> {
        relationship
            .iter()
            .map(|k| match k {
                Kind::String(id) => id.clone(),
                Kind::Object(vm) => vm.id.clone(),
            })
            .collect()
    }

    /// Validate this document's invariants: non-empty `@context` including
    /// [`DID_CONTEXT`], and every verification relationship reference
    /// resolving to a declared verification method.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Integrity`] if a relationship reference is dangling,
    /// or [`Error::Input`] if `@context` is empty or missing the DID core
    /// context.
    pub fn validate(&self) -> Result<()> {
        if self.context.is_empty() {
            return Err(Error::Input("DID document @context must not be empty".into()));
        }
        if !self.context.iter().any(|c| c == DID_CONTEXT) {
            return Err(Error::Input(format!("DID document @context must include {DID_CONTEXT}")));
        }

        let declared: Vec<&str> = self
            .verification_method
            .as_ref()
            .map(|vms| vms.iter().map(|vm| vm.id.as_str()).collect())
            .unwrap_or_default();

        for relationship in [
            &self.authentication,
            &self.assertion_method,
            &self.key_agreement,
            &self.capability_invocation,
            &self.capability_delegation,
        ] {
            let Some(entries) = relationship else { continue };
            for entry in entries {
                let id = match entry {
                    Kind::String(id) => id.as_str(),
                    Kind::Object(vm) => vm.id.as_str(),
                };
                if !declared.contains(&id) {
                    return Err(Error::Integrity(format!(
                        "verification relationship references undeclared method {id}"
                    )));
                }
            }
        }
        Ok(())
    }
}
