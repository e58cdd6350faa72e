//! # Transactional migration orchestrator
//!
//! Wraps [`crate::lifecycle::LifecycleManager`]'s single-shot layer
//! transitions ([`crate::lifecycle::LifecycleManager::publish_to_web`],
//! [`crate::lifecycle::LifecycleManager::inscribe_on_bitcoin`]) in a
//! validate -> checkpoint -> execute -> complete/rollback pipeline with an
//! explicit [`state_machine::StateMachine`], a [`checkpoint::CheckpointStore`]
//! for best-effort rollback, and a deduped [`audit::AuditLogger`].

mod audit;
mod checkpoint;
mod manager;
mod pipeline;
mod state_machine;

pub use audit::{placeholder_signature, AuditLogger, AuditRecord};
pub use checkpoint::{Checkpoint, CheckpointStore, CHECKPOINT_RETENTION};
pub use manager::{MigrationManager, MigrationState};
pub use state_machine::{MigrationStateKind, StateMachine};
