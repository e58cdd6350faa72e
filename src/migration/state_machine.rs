//! # Migration state machine
//!
//! The explicit adjacency `Pending -> Validating -> Checkpointed ->
//! InProgress -> (Anchoring ->)? Completed | Failed; Failed -> RolledBack |
//! Quarantined`, checked against an adjacency map rather than hardcoded
//! `match` arms so a rejected transition carries the attempted edge.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A migration's position in the transactional pipeline.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum MigrationStateKind {
    /// Freshly created, not yet validated.
    Pending,
    /// Running the validation pipeline.
    Validating,
    /// A checkpoint of the pre-migration asset has been persisted.
    Checkpointed,
    /// The layer-specific handler is executing.
    InProgress,
    /// Waiting on chain anchoring (btco targets only).
    Anchoring,
    /// Terminal: migration succeeded.
    Completed,
    /// The handler failed; rollback is about to be attempted.
    Failed,
    /// Terminal: rollback restored the pre-migration asset.
    RolledBack,
    /// Terminal: rollback could not restore the pre-migration asset.
    Quarantined,
}

impl MigrationStateKind {
    /// Whether this state is terminal — no further transition is valid.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::RolledBack | Self::Quarantined)
    }
}

impl std::fmt::Display for MigrationStateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Validating => "validating",
            Self::Checkpointed => "checkpointed",
            Self::InProgress => "in_progress",
            Self::Anchoring => "anchoring",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::RolledBack => "rolled_back",
            Self::Quarantined => "quarantined",
        };
        write!(f, "{s}")
    }
}

/// Rejects any transition not in its adjacency map.
#[derive(Clone)]
pub struct StateMachine {
    adjacency: HashMap<MigrationStateKind, Vec<MigrationStateKind>>,
}

impl Default for StateMachine {
    fn default() -> Self {
        use MigrationStateKind::{
            Anchoring, Checkpointed, Completed, Failed, InProgress, Pending, Quarantined,
            RolledBack, Validating,
        };
        let adjacency = HashMap::from([
            (Pending, vec![Validating]),
            (Validating, vec![Checkpointed, Failed]),
            (Checkpointed, vec![InProgress, Failed]),
            (InProgress, vec![Anchoring, Completed, Failed]),
            (Anchoring, vec![Completed, Failed]),
            (Failed, vec![RolledBack, Quarantined]),
            (Completed, vec![]),
            (RolledBack, vec![]),
            (Quarantined, vec![]),
        ]);
        Self { adjacency }
    }
}

impl StateMachine {
    /// Construct the default migration state machine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate that `from -> to` is a permitted transition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if `to` is not reachable from
    /// `from`.
    pub fn transition(&self, from: MigrationStateKind, to: MigrationStateKind) -> Result<()> {
        let allowed = self.adjacency.get(&from).map(Vec::as_slice).unwrap_or(&[]);
        if allowed.contains(&to) {
            Ok(())
        } else {
            Err(Error::InvalidTransition(format!("migration state {from} -> {to} is not permitted")))
        }
    }

    /// The states reachable from `from`, a fresh copy so callers cannot
    /// mutate the machine's adjacency map.
    #[must_use]
    pub fn valid_transitions(&self, from: MigrationStateKind) -> Vec<MigrationStateKind> {
        self.adjacency.get(&from).cloned().unwrap_or_default()
    }
}
