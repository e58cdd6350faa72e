//! # Checkpoint store
//!
//! A persisted snapshot of an asset's pre-migration state, taken before the
//! layer-specific handler runs, so a failed migration can be restored.
//! Checkpoints live in memory for the lifetime of the process and are
//! scheduled for deletion 24h after a successful completion; an in-memory
//! store is sufficient since a checkpoint is a rollback aid for the current
//! process, not durable storage (unlike the audit log, which is written
//! through the `StorageAdapter`).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::lifecycle::OriginalsAsset;

/// The checkpoint retention window after a migration completes successfully.
pub const CHECKPOINT_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

/// A persisted pre-migration snapshot.
#[derive(Clone, Debug)]
pub struct Checkpoint {
    /// This checkpoint's id, recorded on the owning `MigrationState`.
    pub id: String,
    /// The DID the checkpoint was taken for.
    pub did: String,
    /// The full asset (resources, credentials, provenance) as of the
    /// moment before the migration's handler ran.
    pub asset: OriginalsAsset,
    /// When the checkpoint was taken.
    pub created_at: DateTime<Utc>,
}

/// In-memory checkpoint storage, keyed by checkpoint id.
#[derive(Clone, Default)]
pub struct CheckpointStore {
    checkpoints: Arc<Mutex<HashMap<String, Checkpoint>>>,
}

impl CheckpointStore {
    /// Construct an empty checkpoint store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist a snapshot of `asset`, returning the fresh checkpoint id.
    pub fn create(&self, asset: &OriginalsAsset) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let checkpoint = Checkpoint {
            id: id.clone(),
            did: asset.id.clone(),
            asset: asset.clone(),
            created_at: Utc::now(),
        };
        self.checkpoints.lock().expect("checkpoint store mutex poisoned").insert(id.clone(), checkpoint);
        id
    }

    /// Fetch a checkpoint's snapshot by id, without removing it.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Checkpoint> {
        self.checkpoints.lock().expect("checkpoint store mutex poisoned").get(id).cloned()
    }

    /// Remove a checkpoint immediately.
    pub fn delete(&self, id: &str) {
        self.checkpoints.lock().expect("checkpoint store mutex poisoned").remove(id);
    }

    /// Remove a checkpoint after [`CHECKPOINT_RETENTION`] has elapsed,
    /// without blocking the caller.
    pub fn schedule_deletion(&self, id: String) {
        let store = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(CHECKPOINT_RETENTION).await;
            store.delete(&id);
        });
    }
}
