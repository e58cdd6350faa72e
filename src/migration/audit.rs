//! # Audit log
//!
//! An append-only, per-DID audit trail of migration outcomes, deduplicated
//! by a signed canonical hash of each record so that two
//! temporally distinct records with identical logical content never
//! collapse, while genuinely duplicate writes (e.g. a retried persist) do
//! not pile up.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::lifecycle::Layer;
use crate::provider::StorageAdapter;

use super::state_machine::MigrationStateKind;

/// One audit entry for a single migration attempt.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// The migration this record belongs to.
    pub migration_id: String,
    /// The DID migrated.
    pub did: String,
    /// The layer migrated from.
    pub from_layer: Layer,
    /// The layer migration was attempted to.
    pub to_layer: Layer,
    /// The migration's terminal state.
    pub final_state: MigrationStateKind,
    /// When this record was written.
    pub timestamp: DateTime<Utc>,
    /// Failure detail, present iff `final_state` is `Failed`, `RolledBack`
    /// or `Quarantined`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// SHA-256 placeholder for a future Ed25519 signature over the
    /// record's other fields; also this record's dedup key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl AuditRecord {
    fn dedup_key(&self) -> String {
        match &self.signature {
            Some(sig) => sig.clone(),
            None => format!("{}-{}-{}", self.migration_id, self.timestamp.to_rfc3339(), self.final_state),
        }
    }

    fn storage_path(&self) -> String {
        format!(
            "audit/migrations/{}/{}-{}.json",
            self.migration_id,
            self.timestamp.timestamp_millis(),
            self.final_state
        )
    }
}

/// Compute the SHA-256 placeholder signature over a record's content
/// (everything but the signature field itself).
#[must_use]
pub fn placeholder_signature(record: &AuditRecord) -> String {
    let mut unsigned = record.clone();
    unsigned.signature = None;
    let bytes = serde_json::to_vec(&unsigned).unwrap_or_default();
    hex::encode(Sha256::digest(bytes))
}

/// Append-only audit trail, keyed by DID, with per-DID dedup by
/// [`AuditRecord::dedup_key`] and best-effort persistence through a
/// [`StorageAdapter`].
#[derive(Clone, Default)]
pub struct AuditLogger {
    records: Arc<Mutex<HashMap<String, Vec<AuditRecord>>>>,
    storage: Option<Arc<dyn StorageAdapter>>,
}

impl AuditLogger {
    /// Construct a logger with no persistence backend; records are kept
    /// in memory only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a logger that best-effort persists every record through
    /// `storage`.
    #[must_use]
    pub fn with_storage(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { records: Arc::default(), storage: Some(storage) }
    }

    /// Append `record` (signing it first if unsigned), skipping it if its
    /// dedup key already exists for `record.did`. Persistence failures are
    /// logged and otherwise ignored — an audit write failing must never
    /// undo the in-memory migration state.
    pub async fn append(&self, mut record: AuditRecord) {
        let key = record.dedup_key();
        let already_present = {
            let mut records = self.records.lock().expect("audit log mutex poisoned");
            let entries = records.entry(record.did.clone()).or_default();
            let present = entries.iter().any(|r| r.dedup_key() == key);
            if !present {
                if record.signature.is_none() {
                    record.signature = Some(placeholder_signature(&record));
                }
                entries.push(record.clone());
            }
            present
        };
        if already_present {
            return;
        }

        if let Some(storage) = &self.storage {
            let path = record.storage_path();
            match serde_json::to_vec_pretty(&record) {
                Ok(bytes) => {
                    if let Err(e) = storage.put(&path, &bytes, "application/json").await {
                        warn!(error = %e, path = %path, "failed to persist audit record");
                    }
                }
                Err(e) => warn!(error = %e, "failed to serialize audit record"),
            }
        }
    }

    /// Every record recorded for `did`, oldest first.
    #[must_use]
    pub fn records_for(&self, did: &str) -> Vec<AuditRecord> {
        self.records.lock().expect("audit log mutex poisoned").get(did).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(did: &str, ts: DateTime<Utc>, final_state: MigrationStateKind) -> AuditRecord {
        AuditRecord {
            migration_id: "mig-1".into(),
            did: did.into(),
            from_layer: Layer::Peer,
            to_layer: Layer::Webvh,
            final_state,
            timestamp: ts,
            error: None,
            signature: None,
        }
    }

    #[tokio::test]
    async fn distinct_timestamps_both_persist() {
        let logger = AuditLogger::new();
        let t1 = Utc::now();
        let t2 = t1 + chrono::Duration::seconds(1);
        logger.append(record("did:peer:abc", t1, MigrationStateKind::Completed)).await;
        logger.append(record("did:peer:abc", t2, MigrationStateKind::Completed)).await;
        assert_eq!(logger.records_for("did:peer:abc").len(), 2);
    }

    #[tokio::test]
    async fn identical_record_is_deduped() {
        let logger = AuditLogger::new();
        let ts = Utc::now();
        logger.append(record("did:peer:abc", ts, MigrationStateKind::Completed)).await;
        logger.append(record("did:peer:abc", ts, MigrationStateKind::Completed)).await;
        assert_eq!(logger.records_for("did:peer:abc").len(), 1);
    }
}
