//! # `MigrationManager` orchestrator
//!
//! Drives a single asset through the transactional pipeline validate ->
//! checkpoint -> execute -> complete/rollback, delegating the actual layer
//! transition to [`LifecycleManager`]. Separates the *operation* (what the
//! caller asked for) from its *execution* (what the DID method actually
//! does), with an explicit state machine plus checkpoint and audit side
//! channels around it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::config::Config;
use crate::did::DidManager;
use crate::error::{Error, Result};
use crate::lifecycle::{EventEmitter, Layer, LifecycleManager, Listener, ListenerId, OriginalsAsset, Publisher};

use super::audit::{AuditLogger, AuditRecord};
use super::checkpoint::CheckpointStore;
use super::pipeline;
use super::state_machine::{MigrationStateKind, StateMachine};

/// A migration's full tracked state.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationState {
    /// This migration's unique id.
    pub migration_id: String,
    /// Current position in the pipeline.
    pub state: MigrationStateKind,
    /// The DID being migrated, as of migration start.
    pub source_did: String,
    /// The layer migrated from.
    pub source_layer: Layer,
    /// The layer migration was attempted to.
    pub target_layer: Layer,
    /// Coarse progress indicator, `0..=100`.
    pub progress: u8,
    /// A short human-readable description of the current step.
    pub current_operation: String,
    /// When this migration was created.
    pub start_time: DateTime<Utc>,
    /// When this migration reached a terminal state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// The checkpoint id taken before execution, once checkpointed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkpoint_id: Option<String>,
    /// The asset's new DID, once the migration completes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_did: Option<String>,
    /// Failure detail, present iff `state` is `Failed`, `RolledBack` or
    /// `Quarantined`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MigrationState {
    fn new(source_did: String, source_layer: Layer, target_layer: Layer) -> Self {
        Self {
            migration_id: uuid::Uuid::new_v4().to_string(),
            state: MigrationStateKind::Pending,
            source_did,
            source_layer,
            target_layer,
            progress: 0,
            current_operation: "created".to_string(),
            start_time: Utc::now(),
            end_time: None,
            checkpoint_id: None,
            target_did: None,
            error: None,
        }
    }
}

/// Transactional orchestration of an asset's layer migration: validation
/// pipeline, checkpoint/rollback, explicit state machine, and a deduped
/// audit log.
///
/// Cloning a `MigrationManager` is cheap: every field is `Arc`-backed or
/// itself cheaply `Clone`.
#[derive(Clone)]
pub struct MigrationManager {
    lifecycle: LifecycleManager,
    dids: DidManager,
    state_machine: StateMachine,
    checkpoints: CheckpointStore,
    audit: AuditLogger,
    states: Arc<Mutex<HashMap<String, MigrationState>>>,
    events: EventEmitter,
}

impl MigrationManager {
    /// Construct an orchestrator bound to `lifecycle`'s collaborators. The
    /// audit log persists through `config`'s storage adapter when one is
    /// configured, otherwise it is kept in memory only.
    #[must_use]
    pub fn new(config: Config, lifecycle: LifecycleManager) -> Self {
        let dids = lifecycle.dids().clone();
        let audit = config
            .storage_adapter
            .clone()
            .map_or_else(AuditLogger::new, AuditLogger::with_storage);
        Self {
            lifecycle,
            dids,
            state_machine: StateMachine::new(),
            checkpoints: CheckpointStore::new(),
            audit,
            states: Arc::default(),
            events: EventEmitter::new(),
        }
    }

    /// Register a listener that fires on every emission of `event`
    /// (`migration:started`, `migration:completed`, `migration:failed`).
    pub fn on(&self, event: &str, listener: Listener) -> ListenerId {
        self.events.on(event, listener)
    }

    /// Remove a previously registered listener.
    pub fn off(&self, event: &str, id: ListenerId) {
        self.events.off(event, id);
    }

    /// Look up a tracked migration's current state by id.
    #[must_use]
    pub fn get_migration_state(&self, migration_id: &str) -> Option<MigrationState> {
        self.states.lock().expect("migration state mutex poisoned").get(migration_id).cloned()
    }

    /// Every audit record written for `did`, oldest first.
    #[must_use]
    pub fn audit_log_for(&self, did: &str) -> Vec<AuditRecord> {
        self.audit.records_for(did)
    }

    fn put_state(&self, state: MigrationState) -> MigrationState {
        self.states
            .lock()
            .expect("migration state mutex poisoned")
            .insert(state.migration_id.clone(), state.clone());
        state
    }

    fn transition(&self, state: &mut MigrationState, to: MigrationStateKind, operation: &str) -> Result<()> {
        self.state_machine.transition(state.state, to)?;
        state.state = to;
        state.current_operation = operation.to_string();
        self.put_state(state.clone());
        Ok(())
    }

    /// Migrate `asset` to `target_layer`.
    ///
    /// On success, `asset` is mutated in place to reflect the new layer and
    /// the returned [`MigrationState`] is `Completed`. On failure, `asset`
    /// is restored from its pre-migration checkpoint where possible and the
    /// returned state is `RolledBack` (restore succeeded) or `Quarantined`
    /// (restore could not be attempted or failed) — this method itself
    /// only returns `Err` for a validation/orchestration bug, such as a
    /// missing `publisher` for a `peer -> webvh` migration.
    pub async fn migrate(
        &self, asset: &mut OriginalsAsset, target_layer: Layer, publisher: Option<Publisher>,
        fee_rate: Option<f64>,
    ) -> Result<MigrationState> {
        let mut state = MigrationState::new(asset.id.clone(), asset.current_layer, target_layer);
        self.put_state(state.clone());
        self.events
            .emit(
                "migration:started",
                json!({ "migrationId": state.migration_id, "sourceDid": state.source_did }),
            )
            .await;

        self.transition(&mut state, MigrationStateKind::Validating, "validating")?;
        let validation = pipeline::validate(&self.lifecycle, &self.dids, asset, target_layer).await;
        if !validation.valid {
            return Ok(self.fail(state, asset, validation.errors.join("; ")).await);
        }

        self.transition(&mut state, MigrationStateKind::Checkpointed, "checkpointing")?;
        let checkpoint_id = self.checkpoints.create(asset);
        state.checkpoint_id = Some(checkpoint_id);
        self.put_state(state.clone());

        self.transition(&mut state, MigrationStateKind::InProgress, "executing")?;
        let from_layer = asset.current_layer;
        let outcome = self.execute(asset, from_layer, target_layer, publisher, fee_rate, &mut state).await;
        if let Err(e) = outcome {
            return Ok(self.fail(state, asset, e.to_string()).await);
        }

        self.transition(&mut state, MigrationStateKind::Completed, "completed")?;
        state.progress = 100;
        state.target_did = Some(asset.id.clone());
        state.end_time = Some(Utc::now());
        self.put_state(state.clone());

        self.write_audit(&state, None).await;
        if let Some(checkpoint_id) = state.checkpoint_id.clone() {
            self.checkpoints.schedule_deletion(checkpoint_id);
        }
        self.events
            .emit(
                "migration:completed",
                json!({ "migrationId": state.migration_id, "targetDid": state.target_did }),
            )
            .await;
        Ok(state)
    }

    async fn execute(
        &self, asset: &mut OriginalsAsset, from: Layer, to: Layer, publisher: Option<Publisher>,
        fee_rate: Option<f64>, state: &mut MigrationState,
    ) -> Result<()> {
        match (from, to) {
            (Layer::Peer, Layer::Webvh) => {
                let publisher = publisher
                    .ok_or_else(|| Error::Input("peer -> webvh migration requires a publisher".into()))?;
                self.lifecycle.publish_to_web(asset, publisher).await
            }
            (Layer::Peer | Layer::Webvh, Layer::Btco) => {
                self.transition(state, MigrationStateKind::Anchoring, "anchoring")?;
                self.lifecycle.inscribe_on_bitcoin(asset, fee_rate).await
            }
            _ => Err(Error::InvalidTransition(format!("{from} -> {to} is not a permitted migration"))),
        }
    }

    /// Best-effort rollback on failure: transition to `Failed`, restore the
    /// checkpointed asset if one was taken, then transition to
    /// `RolledBack` (restore succeeded, including the trivial case of no
    /// checkpoint yet existing) or `Quarantined`.
    async fn fail(&self, mut state: MigrationState, asset: &mut OriginalsAsset, error: String) -> MigrationState {
        warn!(migration_id = %state.migration_id, %error, "migration failed");
        state.error = Some(error.clone());
        if self.transition(&mut state, MigrationStateKind::Failed, "failed").is_err() {
            // Already in a terminal state; nothing further to record.
            return state;
        }

        let rolled_back = match &state.checkpoint_id {
            None => true,
            Some(id) => match self.checkpoints.get(id) {
                Some(checkpoint) => {
                    *asset = checkpoint.asset;
                    true
                }
                None => false,
            },
        };

        let target = if rolled_back { MigrationStateKind::RolledBack } else { MigrationStateKind::Quarantined };
        let _ = self.transition(&mut state, target, if rolled_back { "rolled back" } else { "quarantined" });
        state.end_time = Some(Utc::now());
        self.put_state(state.clone());

        self.write_audit(&state, Some(error)).await;
        self.events
            .emit(
                "migration:failed",
                json!({ "migrationId": state.migration_id, "finalState": state.state.to_string() }),
            )
            .await;
        state
    }

    async fn write_audit(&self, state: &MigrationState, error: Option<String>) {
        self.audit
            .append(AuditRecord {
                migration_id: state.migration_id.clone(),
                did: state.source_did.clone(),
                from_layer: state.source_layer,
                to_layer: state.target_layer,
                final_state: state.state,
                timestamp: state.end_time.unwrap_or_else(Utc::now),
                error,
                signature: None,
            })
            .await;
        if state.state.is_terminal() {
            info!(migration_id = %state.migration_id, final_state = %state.state, "migration reached terminal state");
        }
    }

    /// Migrate every `(asset, target_layer, publisher, fee_rate)` tuple in
    /// order, sequentially. When `continue_on_error` is `false`, the
    /// batch stops — without attempting remaining items — as soon as one
    /// migration does not reach `Completed`.
    pub async fn batch_migrate(
        &self,
        items: Vec<(OriginalsAsset, Layer, Option<Publisher>, Option<f64>)>,
        continue_on_error: bool,
    ) -> Result<Vec<MigrationState>> {
        let mut results = Vec::with_capacity(items.len());
        for (mut asset, target, publisher, fee_rate) in items {
            let state = self.migrate(&mut asset, target, publisher, fee_rate).await?;
            let completed = matches!(state.state, MigrationStateKind::Completed);
            results.push(state);
            if !completed && !continue_on_error {
                break;
            }
        }
        Ok(results)
    }
}
