//! # `OriginalsAsset` aggregate

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::credential::VerifiableCredential;
use crate::error::{Error, Result};
use crate::resource::Resource;

/// The layer an asset's current DID is anchored at.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Self-contained `did:peer`.
    Peer,
    /// Published to an HTTPS origin via `did:webvh`.
    Webvh,
    /// Anchored to a Bitcoin ordinal via `did:btco`. Terminal.
    Btco,
}

impl Layer {
    /// Whether transitioning from `self` to `target` is permitted:
    /// `peer -> webvh`, `peer -> btco`, `webvh -> btco`.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!((self, target), (Self::Peer, Self::Webvh) | (Self::Peer, Self::Btco) | (Self::Webvh, Self::Btco))
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Peer => "peer",
            Self::Webvh => "webvh",
            Self::Btco => "btco",
        };
        write!(f, "{s}")
    }
}

/// A single recorded layer migration.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Migration {
    /// The layer migrated from.
    pub from: Option<Layer>,
    /// The layer migrated to.
    pub to: Option<Layer>,
    /// When the migration completed.
    pub timestamp: Option<DateTime<Utc>>,
    /// Opaque transaction identifier, if applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// Bitcoin inscription id, once inscribed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inscription_id: Option<String>,
    /// The satoshi the inscription anchored to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub satoshi: Option<u64>,
    /// The commit transaction id, for commit/reveal inscriptions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_tx_id: Option<String>,
    /// The reveal transaction id, for commit/reveal inscriptions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reveal_tx_id: Option<String>,
    /// The fee rate actually used, in sat/vB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_rate: Option<f64>,
    /// The batch this migration was part of, if inscribed in a single
    /// combined transaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    /// This asset's index within its batch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_index: Option<usize>,
    /// This asset's proportional share of the batch's fee, in satoshis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_paid: Option<u64>,
}

/// A recorded ownership transfer.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    /// The prior owner's address.
    pub from: String,
    /// The new owner's address.
    pub to: String,
    /// When the transfer completed.
    pub timestamp: DateTime<Utc>,
    /// The Bitcoin transaction id.
    pub transaction_id: String,
}

/// An asset's full history.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    /// When the asset was created.
    pub created_at: DateTime<Utc>,
    /// The creator's peer DID.
    pub creator: String,
    /// Recorded layer migrations, oldest first.
    pub migrations: Vec<Migration>,
    /// Recorded ownership transfers, oldest first.
    pub transfers: Vec<Transfer>,
}

/// The aggregate root tying a DID's identity, resources, credentials and
/// history together across layers.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginalsAsset {
    /// The current DID; its prefix must match `current_layer`.
    pub id: String,
    /// The layer `id` is currently anchored at.
    pub current_layer: Layer,
    /// The asset's resources, at their current versions.
    pub resources: Vec<Resource>,
    /// Every credential issued over this asset's lifetime.
    pub credentials: Vec<VerifiableCredential>,
    /// The concrete DID visited at each layer, in encounter order.
    pub bindings: HashMap<Layer, String>,
    /// The asset's full history.
    pub provenance: Provenance,
}

impl OriginalsAsset {
    /// Construct a freshly-created asset at the `peer` layer.
    #[must_use]
    pub fn new_at_peer(did: String, resources: Vec<Resource>, creator: String) -> Self {
        let mut bindings = HashMap::new();
        bindings.insert(Layer::Peer, did.clone());
        Self {
            id: did,
            current_layer: Layer::Peer,
            resources,
            credentials: Vec::new(),
            bindings,
            provenance: Provenance {
                created_at: Utc::now(),
                creator,
                migrations: Vec::new(),
                transfers: Vec::new(),
            },
        }
    }

    /// Validate this asset's cross-field invariants: `current_layer`
    /// matches `id`'s DID prefix, `btco` is a dead end, and every layer ever
    /// visited has a binding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Integrity`] on any invariant violation.
    pub fn validate(&self) -> Result<()> {
        let expected_prefix = match self.current_layer {
            Layer::Peer => "did:peer:",
            Layer::Webvh => "did:webvh:",
            Layer::Btco => "did:btco",
        };
        if !self.id.starts_with(expected_prefix) {
            return Err(Error::Integrity(format!(
                "asset id {} does not match current layer {}",
                self.id, self.current_layer
            )));
        }
        if !self.bindings.contains_key(&self.current_layer) {
            return Err(Error::Integrity(format!(
                "asset has no binding recorded for its current layer {}",
                self.current_layer
            )));
        }
        for migration in &self.provenance.migrations {
            if let (Some(from), Some(to)) = (migration.from, migration.to) {
                if from == Layer::Btco {
                    return Err(Error::Integrity(
                        "asset recorded a forward migration out of btco, which is terminal".into(),
                    ));
                }
                if !from.can_transition_to(to) {
                    return Err(Error::Integrity(format!(
                        "recorded migration {from} -> {to} is not a permitted transition"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Apply a validated migration to `target_layer`, updating `id`,
    /// `current_layer`, `bindings` and appending to `provenance.migrations`.
    pub(super) fn apply_migration(&mut self, target_layer: Layer, new_did: String, migration: Migration) {
        self.bindings.insert(target_layer, new_did.clone());
        self.id = new_did;
        self.current_layer = target_layer;
        self.provenance.migrations.push(migration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table_is_forward_only() {
        assert!(Layer::Peer.can_transition_to(Layer::Webvh));
        assert!(Layer::Peer.can_transition_to(Layer::Btco));
        assert!(Layer::Webvh.can_transition_to(Layer::Btco));
        assert!(!Layer::Webvh.can_transition_to(Layer::Peer));
        assert!(!Layer::Btco.can_transition_to(Layer::Webvh));
        assert!(!Layer::Btco.can_transition_to(Layer::Peer));
    }

    #[test]
    fn new_asset_validates() {
        let asset = OriginalsAsset::new_at_peer("did:peer:0abc".into(), vec![], "did:peer:0abc".into());
        asset.validate().expect("freshly created asset should validate");
    }

    #[test]
    fn mismatched_layer_fails_validation() {
        let mut asset =
            OriginalsAsset::new_at_peer("did:peer:0abc".into(), vec![], "did:peer:0abc".into());
        asset.current_layer = Layer::Webvh;
        assert!(asset.validate().is_err());
    }
}
