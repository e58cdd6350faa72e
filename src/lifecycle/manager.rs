//! # `LifecycleManager`
//!
//! Drives an [`OriginalsAsset`] through `peer -> webvh -> btco`, issuing a
//! credential at every transition and emitting events a caller can observe.
//! Separates "operation" from "resolution" the way a DID registrar
//! separates validation from execution, with `tracing` spans at every
//! suspension point.

use std::sync::Arc;
use std::time::Instant;

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;

use crate::config::{Config, Network};
use crate::core::OneMany;
use crate::credential::{
    CredentialVerificationResult, ResourceCreatedSubject, ResourceMigratedSubject,
    VerifiableCredential, CREDENTIALS_V2_CONTEXT,
};
use crate::did::webvh::{CreateWebvhOptions, KeyMaterial};
use crate::did::DidManager;
use crate::error::{Error, Result};
use crate::proof::{create_proof_with_proof_value, ProofMetadata};
use crate::provider::ExternalSigner;
use crate::resource::{Content, Resource, ResourceManager};
use originals_keyring::KeyStore;

use super::asset::{Layer, Migration, OriginalsAsset, Transfer};
use super::batch::{run_batch, BatchOptions, BatchOutcome};
use super::cost::{Confidence, CostBreakdown, CostEstimate, DEFAULT_FEE_RATE, DUST_VALUE};
use super::events::{EventEmitter, Listener, ListenerId};

/// How to publish an asset's resources to the web.
#[derive(Clone)]
pub enum Publisher {
    /// A bare domain (a fresh `did:webvh` is minted, with an internally
    /// generated key registered in the `KeyStore`) or an already-published
    /// `did:webvh:*` string, used as-is.
    Domain(String),
    /// An externally-held signer; its verification method id's DID prefix
    /// is used as the publisher DID.
    External(Arc<dyn ExternalSigner>),
}

enum ActiveSigner {
    KeyStore(KeyStore),
    External(Arc<dyn ExternalSigner>),
}

/// The result of [`LifecycleManager::validate_migration`].
#[derive(Clone, Debug, Default)]
pub struct MigrationValidation {
    /// Whether the migration may proceed.
    pub valid: bool,
    /// Blocking errors; non-empty iff `!valid`.
    pub errors: Vec<String>,
    /// Non-blocking warnings (e.g. an oversized manifest).
    pub warnings: Vec<String>,
    /// The target's estimated cost, computed only when `errors` is empty.
    pub cost_estimate: Option<CostEstimate>,
}

/// Drives asset creation, publication, inscription, transfer, cost
/// estimation and batch variants of each.
///
/// Cloning a `LifecycleManager` is cheap: every field is `Arc`-backed or
/// itself cheaply `Clone`.
#[derive(Clone)]
pub struct LifecycleManager {
    config: Config,
    dids: DidManager,
    keystore: KeyStore,
    events: EventEmitter,
}

impl LifecycleManager {
    /// Construct a manager bound to `config`'s collaborators and `keystore`.
    /// The manager holds only a shared reference to `keystore`; it is never
    /// the sole owner of secret key material.
    #[must_use]
    pub fn new(config: Config, keystore: KeyStore) -> Self {
        let dids = DidManager::new(config.clone());
        Self { config, dids, keystore, events: EventEmitter::new() }
    }

    /// The injected DID manager, for callers that need to resolve a DID
    /// outside the lifecycle of any one asset.
    #[must_use]
    pub const fn dids(&self) -> &DidManager {
        &self.dids
    }

    /// The key store backing this manager's signing operations.
    #[must_use]
    pub const fn keystore(&self) -> &KeyStore {
        &self.keystore
    }

    /// Register a listener that fires on every emission of `event`.
    pub fn on(&self, event: &str, listener: Listener) -> ListenerId {
        self.events.on(event, listener)
    }

    /// Register a listener that fires at most once, then is removed.
    pub fn once(&self, event: &str, listener: Listener) -> ListenerId {
        self.events.once(event, listener)
    }

    /// Remove a previously registered listener.
    pub fn off(&self, event: &str, id: ListenerId) {
        self.events.off(event, id);
    }

    fn defer_emit(&self, event: &'static str, payload: Value) {
        let events = self.events.clone();
        tokio::spawn(async move {
            events.emit(event, payload).await;
        });
    }

    async fn emit_now(&self, event: &'static str, payload: Value) {
        self.events.emit(event, payload).await;
    }

    /// Create a new asset at the `peer` layer from `resources`.
    ///
    /// Validates every resource structurally, mints a peer DID via
    /// [`DidManager`], registers the generated key in the `KeyStore`, and
    /// best-effort issues a `ResourceCreated` credential per resource.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Input`] if `resources` is empty or any resource
    /// fails structural validation.
    pub async fn create_asset(&self, resources: Vec<Resource>) -> Result<OriginalsAsset> {
        if resources.is_empty() {
            return Err(Error::Input("createAsset requires at least one resource".into()));
        }
        let resource_manager = ResourceManager::new();
        for resource in &resources {
            resource_manager.validate_resource(resource)?;
        }

        let (document, key_pair) = self.dids.create_peer_did_with(self.config.default_key_type);
        let vm_id = document
            .verification_method
            .as_ref()
            .and_then(|vms| vms.first())
            .map_or_else(|| format!("{}#key-0", document.id), |vm| vm.id.clone());
        self.keystore.register(&vm_id, key_pair);

        let mut asset =
            OriginalsAsset::new_at_peer(document.id.clone(), resources, document.id.clone());

        for resource in asset.resources.clone() {
            let subject = ResourceCreatedSubject {
                id: asset.id.clone(),
                resource_id: resource.id.clone(),
                type_: resource.type_.to_string(),
                content_type: resource.content_type.clone(),
                content_hash: resource.hash.clone(),
                creator: asset.provenance.creator.clone(),
                created_at: asset.provenance.created_at,
            };
            match serde_json::to_value(&subject) {
                Ok(subject_value) => {
                    match self
                        .issue_credential_with(
                            &asset.id,
                            &["ResourceCreated"],
                            subject_value,
                            "assertionMethod",
                            vm_id.clone(),
                            ActiveSigner::KeyStore(self.keystore.clone()),
                        )
                        .await
                    {
                        Ok(vc) => {
                            asset.credentials.push(vc);
                            self.defer_emit(
                                "credential:issued",
                                json!({ "type": "ResourceCreated", "resourceId": resource.id }),
                            );
                        }
                        Err(e) => {
                            warn!(error = %e, resource = %resource.id, "failed to issue ResourceCreated credential");
                        }
                    }
                }
                Err(e) => warn!(error = %e, "failed to serialize ResourceCreated subject"),
            }
        }

        self.defer_emit("asset:created", json!({ "id": asset.id, "currentLayer": "peer" }));
        Ok(asset)
    }

    /// Publish every resource of `asset` to `publisher` and migrate it to
    /// `webvh`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if `asset.current_layer !=
    /// Layer::Peer`, or [`Error::External`] if no storage adapter is
    /// configured.
    pub async fn publish_to_web(&self, asset: &mut OriginalsAsset, publisher: Publisher) -> Result<()> {
        if asset.current_layer != Layer::Peer {
            return Err(Error::InvalidTransition("publishToWeb requires the peer layer".into()));
        }
        let Some(storage) = self.config.storage_adapter.clone() else {
            return Err(Error::External("no storage adapter configured".into()));
        };

        let (publisher_did, external_signer) = self.resolve_publisher(&publisher).await?;
        let peer_did = asset.id.clone();

        for resource in &mut asset.resources {
            let key = resource_storage_key(&publisher_did, &resource.hash)?;
            let bytes = resource.content.as_ref().map_or_else(Vec::new, Content::as_bytes);
            storage.put(&key, &bytes, &resource.content_type).await?;
            resource.url = Some(key.clone());
            self.emit_now("resource:published", json!({ "resourceId": resource.id, "url": key })).await;
        }

        let from_layer = asset.current_layer;
        let migration = Migration {
            from: Some(from_layer),
            to: Some(Layer::Webvh),
            timestamp: Some(Utc::now()),
            ..Migration::default()
        };
        asset.apply_migration(Layer::Webvh, publisher_did.clone(), migration);

        let signer = match external_signer {
            Some(ext) => ActiveSigner::External(ext),
            None => ActiveSigner::KeyStore(self.keystore.clone()),
        };
        let Some(vm_id) = self.resolve_signer_vm(&publisher_did, &signer).await else {
            warn!(asset = %asset.id, "no signing key available, skipping ResourceMigrated credential");
            return Ok(());
        };

        match self
            .issue_credential_with(
                &peer_did,
                &["ResourceMigrated"],
                serde_json::to_value(&ResourceMigratedSubject {
                    id: peer_did.clone(),
                    from_layer: from_layer.to_string(),
                    to_layer: Layer::Webvh.to_string(),
                    migrated_at: Utc::now(),
                })?,
                "assertionMethod",
                vm_id,
                signer,
            )
            .await
        {
            Ok(vc) => {
                asset.credentials.push(vc);
                self.defer_emit(
                    "credential:issued",
                    json!({ "type": "ResourceMigrated", "assetId": asset.id }),
                );
            }
            Err(e) => warn!(error = %e, asset = %asset.id, "failed to issue ResourceMigrated credential"),
        }

        Ok(())
    }

    async fn resolve_publisher(
        &self, publisher: &Publisher,
    ) -> Result<(String, Option<Arc<dyn ExternalSigner>>)> {
        match publisher {
            Publisher::Domain(value) => {
                if value.starts_with("did:webvh:") {
                    Ok((value.clone(), None))
                } else {
                    let result = self
                        .dids
                        .create_webvh_did(CreateWebvhOptions {
                            domain: value.clone(),
                            key_material: KeyMaterial::Internal { key_pair: None },
                            paths: vec![],
                            portable: false,
                            storage: None,
                        })
                        .await?;
                    if let Some(key_pair) = &result.key_pair {
                        let vm_id = format!("{}#key-0", result.document.id);
                        self.keystore.register(&vm_id, key_pair.clone());
                    }
                    Ok((result.document.id, None))
                }
            }
            Publisher::External(signer) => {
                let vm_id = signer.verification_method_id().await?;
                let did = vm_id.split('#').next().unwrap_or(&vm_id).to_string();
                Ok((did, Some(signer.clone())))
            }
        }
    }

    /// Resolve the verification method id a signature over `did` should be
    /// attributed to: for an external signer, its own declared id; for an
    /// internal key, the common VM id patterns `#key-0`, `#keys-1`,
    /// `#authentication`, then any registered VM id under `did`, then the
    /// first VM id in the resolved document.
    async fn resolve_signer_vm(&self, did: &str, signer: &ActiveSigner) -> Option<String> {
        match signer {
            ActiveSigner::External(ext) => ext.verification_method_id().await.ok(),
            ActiveSigner::KeyStore(_) => self.resolve_keystore_vm(did).await,
        }
    }

    async fn resolve_keystore_vm(&self, did: &str) -> Option<String> {
        for suffix in ["#key-0", "#keys-1", "#authentication"] {
            let candidate = format!("{did}{suffix}");
            if self.keystore.contains(&candidate) {
                return Some(candidate);
            }
        }
        if let Some(id) =
            self.keystore.verification_method_ids().into_iter().find(|id| id.starts_with(did))
        {
            return Some(id);
        }
        let document = self.dids.resolve(did).await?;
        document.verification_method.as_ref()?.first().map(|vm| vm.id.clone())
    }

    async fn active_signer_vm(&self, asset: &OriginalsAsset) -> Option<(ActiveSigner, String)> {
        for layer in [Layer::Btco, Layer::Webvh, Layer::Peer] {
            if let Some(did) = asset.bindings.get(&layer) {
                if let Some(vm_id) = self.resolve_keystore_vm(did).await {
                    return Some((ActiveSigner::KeyStore(self.keystore.clone()), vm_id));
                }
            }
        }
        None
    }

    /// Inscribe `asset` onto Bitcoin and migrate it to `btco`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if `asset.current_layer` is not
    /// `peer` or `webvh`, [`Error::External`] if no ordinals provider is
    /// configured, or [`Error::Input`] if `fee_rate` is out of range.
    pub async fn inscribe_on_bitcoin(
        &self, asset: &mut OriginalsAsset, fee_rate: Option<f64>,
    ) -> Result<()> {
        if !matches!(asset.current_layer, Layer::Peer | Layer::Webvh) {
            return Err(Error::InvalidTransition(
                "inscribeOnBitcoin requires the peer or webvh layer".into(),
            ));
        }
        if let Some(rate) = fee_rate {
            if !(1.0..=1_000_000.0).contains(&rate) {
                return Err(Error::Input(format!("feeRate {rate} out of range [1, 1000000] sat/vB")));
            }
        }
        let Some(ordinals) = self.config.ordinals_provider.clone() else {
            return Err(Error::External("no ordinals provider configured".into()));
        };

        let (manifest, _size) = build_inscription_manifest(asset);
        let payload = serde_json::to_vec(&manifest)?;
        let result = ordinals.inscribe_data(&payload, "application/json", fee_rate).await?;

        let from_layer = asset.current_layer;
        let peer_did = asset.bindings.get(&Layer::Peer).cloned().unwrap_or_else(|| asset.id.clone());
        let satoshi = result.satoshi;
        let new_did = match satoshi {
            Some(sat) => crate::did::btco::btco_did(self.config.bitcoin_network(), sat),
            None => format!("did:btco:{}", result.inscription_id),
        };

        let migration = Migration {
            from: Some(from_layer),
            to: Some(Layer::Btco),
            timestamp: Some(Utc::now()),
            transaction_id: Some(result.reveal_tx_id.clone()),
            inscription_id: Some(result.inscription_id.clone()),
            satoshi,
            commit_tx_id: result.commit_tx_id.clone(),
            reveal_tx_id: Some(result.reveal_tx_id.clone()),
            fee_rate: result.fee_rate.or(fee_rate),
            batch_id: None,
            batch_index: None,
            fee_paid: None,
        };
        asset.apply_migration(Layer::Btco, new_did, migration);

        if let Some((signer, vm_id)) = self.active_signer_vm(asset).await {
            match self
                .issue_credential_with(
                    &peer_did,
                    &["ResourceMigrated"],
                    serde_json::to_value(&ResourceMigratedSubject {
                        id: peer_did.clone(),
                        from_layer: from_layer.to_string(),
                        to_layer: Layer::Btco.to_string(),
                        migrated_at: Utc::now(),
                    })?,
                    "assertionMethod",
                    vm_id,
                    signer,
                )
                .await
            {
                Ok(vc) => {
                    asset.credentials.push(vc);
                    self.defer_emit(
                        "credential:issued",
                        json!({ "type": "ResourceMigrated", "assetId": asset.id }),
                    );
                }
                Err(e) => warn!(error = %e, asset = %asset.id, "failed to issue ResourceMigrated credential"),
            }
        } else {
            warn!(asset = %asset.id, "no signing key available, skipping ResourceMigrated credential");
        }

        Ok(())
    }

    /// Transfer ownership of an inscribed `asset`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if `asset.current_layer !=
    /// Layer::Btco`, or [`Error::Input`] if `new_owner` is not a
    /// plausible address for the configured network.
    pub async fn transfer_ownership(&self, asset: &mut OriginalsAsset, new_owner: &str) -> Result<()> {
        if asset.current_layer != Layer::Btco {
            return Err(Error::InvalidTransition("transferOwnership requires the btco layer".into()));
        }
        validate_bitcoin_address(new_owner, self.config.bitcoin_network())?;
        let Some(ordinals) = self.config.ordinals_provider.clone() else {
            return Err(Error::External("no ordinals provider configured".into()));
        };

        let inscription_id = asset
            .provenance
            .migrations
            .iter()
            .rev()
            .find_map(|m| m.inscription_id.clone())
            .ok_or_else(|| Error::Integrity("asset has no recorded inscription to transfer".into()))?;
        let current_owner =
            asset.provenance.transfers.last().map(|t| t.to.clone()).unwrap_or_else(|| asset.id.clone());

        let result = ordinals.transfer_inscription(&inscription_id, new_owner).await?;
        asset.provenance.transfers.push(Transfer {
            from: current_owner,
            to: new_owner.to_string(),
            timestamp: Utc::now(),
            transaction_id: result.txid,
        });
        Ok(())
    }

    async fn resolve_fee_rate(&self, explicit: Option<f64>) -> (f64, Confidence) {
        if let Some(rate) = explicit {
            return (rate, Confidence::Medium);
        }
        if let Some(oracle) = &self.config.fee_oracle {
            if let Ok(rate) = oracle.fee_rate().await {
                return (rate, Confidence::High);
            }
        }
        if let Some(ordinals) = &self.config.ordinals_provider {
            if let Ok(rate) = ordinals.estimate_fee(1).await {
                return (rate, Confidence::Medium);
            }
        }
        (DEFAULT_FEE_RATE, Confidence::Low)
    }

    /// Estimate the cost of migrating `asset` to `target_layer`: zero for `peer`/`webvh`, a commit+reveal vbyte
    /// estimate plus dust for `btco`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Input`] if `asset`'s manifest cannot be serialized.
    pub async fn estimate_cost(
        &self, asset: &OriginalsAsset, target_layer: Layer, fee_rate: Option<f64>,
    ) -> Result<CostEstimate> {
        if matches!(target_layer, Layer::Webvh | Layer::Peer) {
            return Ok(CostEstimate {
                total_sats: 0,
                fee_rate: 0.0,
                breakdown: CostBreakdown::default(),
                confidence: Confidence::High,
            });
        }

        let (_, manifest_size) = build_inscription_manifest(asset);
        let (rate, confidence) = self.resolve_fee_rate(fee_rate).await;
        let commit_vbytes = 200u64;
        let reveal_vbytes = 200 + 122 + manifest_size as u64;
        let total_sats = ((commit_vbytes + reveal_vbytes) as f64 * rate).round() as u64 + DUST_VALUE;

        Ok(CostEstimate {
            total_sats,
            fee_rate: rate,
            breakdown: CostBreakdown { commit_vbytes, reveal_vbytes, fee_rate: rate, dust_value: DUST_VALUE },
            confidence,
        })
    }

    /// Validate whether `asset` may migrate to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Input`] if `asset`'s manifest cannot be serialized.
    pub async fn validate_migration(
        &self, asset: &OriginalsAsset, target: Layer,
    ) -> Result<MigrationValidation> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if !asset.current_layer.can_transition_to(target) {
            errors.push(format!("{} -> {target} is not a permitted transition", asset.current_layer));
        }

        let resource_manager = ResourceManager::new();
        for resource in &asset.resources {
            if let Err(e) = resource_manager.validate_resource(resource) {
                errors.push(e.to_string());
            }
        }

        if target == Layer::Btco && self.config.ordinals_provider.is_none() {
            errors.push("btco migration requires a configured ordinals provider".to_string());
        }

        for credential in &asset.credentials {
            if credential.issuer.is_empty() || credential.proof.is_none() {
                errors.push(format!("credential {:?} missing issuer or proof", credential.type_));
            }
        }

        let cost_estimate = if errors.is_empty() {
            let (_, manifest_size) = build_inscription_manifest(asset);
            if manifest_size > 100_000 {
                warnings.push(format!(
                    "inscription manifest is {manifest_size} bytes, exceeding the 100kB guideline"
                ));
            }
            self.estimate_cost(asset, target, None).await.ok()
        } else {
            None
        };

        Ok(MigrationValidation { valid: errors.is_empty(), errors, warnings, cost_estimate })
    }

    async fn issue_credential_with(
        &self, issuer: &str, extra_types: &[&str], subject: Value, proof_purpose: &str,
        vm_id: String, signer: ActiveSigner,
    ) -> Result<VerifiableCredential> {
        let mut type_ = vec!["VerifiableCredential".to_string()];
        type_.extend(extra_types.iter().map(ToString::to_string));

        let mut credential = VerifiableCredential {
            context: vec![CREDENTIALS_V2_CONTEXT.to_string()],
            type_,
            issuer: issuer.to_string(),
            issuance_date: Utc::now(),
            credential_subject: subject,
            proof: None,
        };
        let unsigned_value = serde_json::to_value(&credential)?;

        let proof = create_proof_with_proof_value(
            &unsigned_value,
            ProofMetadata {
                cryptosuite: None,
                proof_purpose: proof_purpose.to_string(),
                created: None,
                verification_method: vm_id.clone(),
                challenge: None,
                domain: None,
            },
            move |bytes| async move {
                match signer {
                    ActiveSigner::KeyStore(store) => {
                        let signature = store.sign(&vm_id, &bytes)?;
                        Ok(originals_keyring::encode_bare(&signature))
                    }
                    ActiveSigner::External(ext) => Ok(ext.sign(&bytes).await?.proof_value),
                }
            },
        )
        .await?;

        credential.proof = Some(OneMany::One(proof));
        Ok(credential)
    }

    /// Verify every embedded proof on `credential` (a thin convenience over
    /// [`crate::credential::verify_credential`] using this manager's
    /// collaborators).
    pub async fn verify_credential(
        &self, credential: &VerifiableCredential, loader: &mut crate::loader::DocumentLoader,
    ) -> CredentialVerificationResult {
        crate::credential::verify_credential(credential, loader, &self.dids).await
    }

    /// Create `count` assets concurrently, one per entry of `resource_sets`
    ///.
    pub async fn batch_create_assets(
        &self, resource_sets: Vec<Vec<Resource>>, opts: BatchOptions,
    ) -> Result<BatchOutcome<OriginalsAsset>> {
        self.defer_emit(
            "batch:started",
            json!({ "operation": "createAssets", "count": resource_sets.len() }),
        );
        let resource_sets = Arc::new(resource_sets);
        let manager = self.clone();
        let outcome = run_batch(resource_sets.len(), opts, move |index| {
            let manager = manager.clone();
            let resource_sets = resource_sets.clone();
            Box::pin(async move { manager.create_asset(resource_sets[index].clone()).await })
        })
        .await;
        self.emit_batch_outcome(&outcome);
        outcome
    }

    /// Publish `assets` to `publisher` concurrently.
    pub async fn batch_publish_to_web(
        &self, assets: Vec<OriginalsAsset>, publisher: Publisher, opts: BatchOptions,
    ) -> Result<BatchOutcome<OriginalsAsset>> {
        self.defer_emit("batch:started", json!({ "operation": "publishToWeb", "count": assets.len() }));
        let assets = Arc::new(assets);
        let publisher = Arc::new(publisher);
        let manager = self.clone();
        let outcome = run_batch(assets.len(), opts, move |index| {
            let manager = manager.clone();
            let assets = assets.clone();
            let publisher = (*publisher.clone()).clone();
            Box::pin(async move {
                let mut asset = assets[index].clone();
                manager.publish_to_web(&mut asset, publisher).await?;
                Ok(asset)
            })
        })
        .await;
        self.emit_batch_outcome(&outcome);
        outcome
    }

    /// Inscribe `assets` onto Bitcoin.
    /// When `single_transaction` is set, every asset is inscribed in a
    /// single combined transaction with proportionally split fees instead
    /// of one inscription per asset.
    pub async fn batch_inscribe_on_bitcoin(
        &self, assets: Vec<OriginalsAsset>, fee_rate: Option<f64>, opts: BatchOptions,
        single_transaction: bool,
    ) -> Result<BatchOutcome<OriginalsAsset>> {
        self.defer_emit(
            "batch:started",
            json!({
                "operation": "inscribeOnBitcoin",
                "count": assets.len(),
                "singleTransaction": single_transaction,
            }),
        );

        if single_transaction {
            return self.inscribe_batch_single_transaction(assets, fee_rate, opts).await;
        }

        let assets = Arc::new(assets);
        let manager = self.clone();
        let outcome = run_batch(assets.len(), opts, move |index| {
            let manager = manager.clone();
            let assets = assets.clone();
            Box::pin(async move {
                let mut asset = assets[index].clone();
                manager.inscribe_on_bitcoin(&mut asset, fee_rate).await?;
                Ok(asset)
            })
        })
        .await;
        self.emit_batch_outcome(&outcome);
        outcome
    }

    async fn inscribe_batch_single_transaction(
        &self, mut assets: Vec<OriginalsAsset>, fee_rate: Option<f64>, opts: BatchOptions,
    ) -> Result<BatchOutcome<OriginalsAsset>> {
        let batch_id = uuid::Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let overall_start = Instant::now();

        if opts.validate_first {
            for asset in &assets {
                if !matches!(asset.current_layer, Layer::Peer | Layer::Webvh) {
                    return Err(Error::InvalidTransition(format!(
                        "asset {} is not eligible for btco inscription from layer {}",
                        asset.id, asset.current_layer
                    )));
                }
            }
        }

        let Some(ordinals) = self.config.ordinals_provider.clone() else {
            return Err(Error::External("no ordinals provider configured".into()));
        };

        let sizes: Vec<usize> = assets.iter().map(|a| build_inscription_manifest(a).1).collect();
        let total_size: usize = sizes.iter().sum();

        let combined_manifest = json!({
            "batchId": batch_id,
            "assets": assets.iter().map(asset_manifest_entry).collect::<Vec<_>>(),
            "timestamp": Utc::now(),
        });
        let payload = serde_json::to_vec(&combined_manifest)?;

        let (fallback_rate, _) = self.resolve_fee_rate(fee_rate).await;
        let result = ordinals.inscribe_data(&payload, "application/json", fee_rate).await?;
        let actual_rate = result.fee_rate.or(fee_rate).unwrap_or(fallback_rate);

        let commit_vbytes = 200u64;
        let reveal_base = 200u64 + 122u64;
        let total_reveal_vbytes = reveal_base + total_size as u64;
        let total_fee = ((commit_vbytes + total_reveal_vbytes) as f64 * actual_rate).round() as u64;

        let mut successful = Vec::with_capacity(assets.len());
        let mut baseline_total = 0u64;

        for (index, (asset, size)) in assets.iter_mut().zip(sizes.iter()).enumerate() {
            let item_start = Instant::now();
            let share = if total_size == 0 { 0.0 } else { *size as f64 / total_size as f64 };
            let fee_paid = (total_fee as f64 * share).round() as u64;
            baseline_total += ((200 + 122 + *size) as f64 * actual_rate).round() as u64;

            let from_layer = asset.current_layer;
            let peer_did = asset.bindings.get(&Layer::Peer).cloned().unwrap_or_else(|| asset.id.clone());
            let satoshi = result.satoshi;
            let new_did = match satoshi {
                Some(sat) => crate::did::btco::btco_did(self.config.bitcoin_network(), sat),
                None => format!("did:btco:{}-{index}", result.inscription_id),
            };

            let migration = Migration {
                from: Some(from_layer),
                to: Some(Layer::Btco),
                timestamp: Some(Utc::now()),
                transaction_id: Some(result.reveal_tx_id.clone()),
                inscription_id: Some(result.inscription_id.clone()),
                satoshi,
                commit_tx_id: result.commit_tx_id.clone(),
                reveal_tx_id: Some(result.reveal_tx_id.clone()),
                fee_rate: Some(actual_rate),
                batch_id: Some(batch_id.clone()),
                batch_index: Some(index),
                fee_paid: Some(fee_paid),
            };
            asset.apply_migration(Layer::Btco, new_did, migration);

            if let Some((signer, vm_id)) = self.active_signer_vm(asset).await {
                if let Ok(vc) = self
                    .issue_credential_with(
                        &peer_did,
                        &["ResourceMigrated"],
                        serde_json::to_value(&ResourceMigratedSubject {
                            id: peer_did.clone(),
                            from_layer: from_layer.to_string(),
                            to_layer: Layer::Btco.to_string(),
                            migrated_at: Utc::now(),
                        })
                        .unwrap_or(Value::Null),
                        "assertionMethod",
                        vm_id,
                        signer,
                    )
                    .await
                {
                    asset.credentials.push(vc);
                }
            }

            successful.push(super::batch::BatchSuccess {
                index,
                result: asset.clone(),
                duration_ms: item_start.elapsed().as_millis() as u64,
            });
        }

        let cost_savings = baseline_total.saturating_sub(total_fee);
        self.defer_emit(
            "batch:completed",
            json!({
                "batchId": batch_id,
                "batchInscription": true,
                "totalFee": total_fee,
                "baselineFee": baseline_total,
                "costSavings": cost_savings,
            }),
        );

        Ok(BatchOutcome {
            total_processed: successful.len(),
            total_duration_ms: overall_start.elapsed().as_millis() as u64,
            batch_id,
            started_at,
            completed_at: Utc::now(),
            successful,
            failed: Vec::new(),
        })
    }

    /// Transfer ownership of `transfers` concurrently: `(asset, new_owner)`
    /// pairs.
    pub async fn batch_transfer_ownership(
        &self, transfers: Vec<(OriginalsAsset, String)>, opts: BatchOptions,
    ) -> Result<BatchOutcome<OriginalsAsset>> {
        self.defer_emit(
            "batch:started",
            json!({ "operation": "transferOwnership", "count": transfers.len() }),
        );
        let transfers = Arc::new(transfers);
        let manager = self.clone();
        let outcome = run_batch(transfers.len(), opts, move |index| {
            let manager = manager.clone();
            let transfers = transfers.clone();
            Box::pin(async move {
                let (mut asset, new_owner) = transfers[index].clone();
                manager.transfer_ownership(&mut asset, &new_owner).await?;
                Ok(asset)
            })
        })
        .await;
        self.emit_batch_outcome(&outcome);
        outcome
    }

    fn emit_batch_outcome<T>(&self, outcome: &Result<BatchOutcome<T>>) {
        match outcome {
            Ok(o) => self.defer_emit(
                "batch:completed",
                json!({
                    "batchId": o.batch_id,
                    "successful": o.successful.len(),
                    "failed": o.failed.len(),
                }),
            ),
            Err(e) => self.defer_emit("batch:failed", json!({ "error": e.to_string() })),
        }
    }
}

fn resource_storage_key(publisher_did: &str, hash: &str) -> Result<String> {
    let bytes = hex::decode(hash).map_err(|e| Error::Input(format!("invalid resource hash: {e}")))?;
    let encoded = Base64UrlUnpadded::encode_string(&bytes);
    Ok(format!("{publisher_did}/resources/{encoded}"))
}

fn asset_manifest_entry(asset: &OriginalsAsset) -> Value {
    json!({
        "assetId": asset.id,
        "resources": asset.resources.iter().map(resource_manifest_entry).collect::<Vec<_>>(),
    })
}

fn resource_manifest_entry(resource: &Resource) -> Value {
    json!({
        "id": resource.id,
        "hash": resource.hash,
        "contentType": resource.content_type,
        "url": resource.url,
    })
}

fn build_inscription_manifest(asset: &OriginalsAsset) -> (Value, usize) {
    let manifest = json!({
        "assetId": asset.id,
        "resources": asset.resources.iter().map(resource_manifest_entry).collect::<Vec<_>>(),
        "timestamp": Utc::now(),
    });
    let size = serde_json::to_vec(&manifest).map(|bytes| bytes.len()).unwrap_or(0);
    (manifest, size)
}

/// A deliberately approximate Bitcoin address check: prefix and length
/// bounds per network, not full base58check/bech32 validation.
fn validate_bitcoin_address(address: &str, network: Network) -> Result<()> {
    if address.is_empty() || address.len() > 90 {
        return Err(Error::Input(format!("invalid bitcoin address: {address}")));
    }
    let valid_prefix = match network {
        Network::Mainnet => {
            address.starts_with("bc1") || address.starts_with('1') || address.starts_with('3')
        }
        Network::Regtest => {
            address.starts_with("bcrt1")
                || address.starts_with('2')
                || address.starts_with('m')
                || address.starts_with('n')
        }
        Network::Signet => {
            address.starts_with("tb1")
                || address.starts_with('2')
                || address.starts_with('m')
                || address.starts_with('n')
        }
    };
    if !valid_prefix {
        return Err(Error::Input(format!("address {address} does not match network {network:?}")));
    }
    Ok(())
}
