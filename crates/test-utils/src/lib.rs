//! Shared fixtures for testing the Originals SDK: an in-memory
//! `StorageAdapter`, a scripted `OrdinalsClient`, and deterministic Ed25519
//! key material, used from both `originals`'s and `originals-keyring`'s
//! `dev-dependencies`.

mod keys;
mod ordinals;
mod storage;

pub use crate::keys::{deterministic_ed25519_keypair, fixture_keypair};
pub use crate::ordinals::ScriptedOrdinals;
pub use crate::storage::{FailingStorage, MemoryStorage};
