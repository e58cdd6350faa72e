//! # `LifecycleManager`
//!
//! The asset lifecycle state machine: layer transitions, provenance, batch
//! inscription with fee accounting, cost estimation, and pre-flight
//! validation. Split into the aggregate root ([`asset`]), cost estimation
//! ([`cost`]), batched execution ([`batch`]), event emission ([`events`])
//! and the manager itself ([`manager`]), one file per concern rather than
//! one large module.

pub mod asset;
pub mod batch;
pub mod cost;
pub mod events;
mod manager;

pub use asset::{Layer, Migration, OriginalsAsset, Provenance, Transfer};
pub use batch::{BatchFailure, BatchOptions, BatchOutcome, BatchSuccess};
pub use cost::{Confidence, CostBreakdown, CostEstimate};
pub use events::{EventEmitter, Listener, ListenerId};
pub use manager::{LifecycleManager, MigrationValidation, Publisher};
