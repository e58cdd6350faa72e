//! # `did:webvh`
//!
//! A DID whose canonical document and history are published to an HTTPS
//! origin as an append-only JSON-Lines log (`DidLogEntry`, `Parameters`)
//! signed by rotating update keys, using the same `DataIntegrityProof`
//! suite as credentials rather than a JSON-LD-canonicalization-heavy proof
//! suite.

mod create;
mod log;
mod path;
mod update;

pub use create::{create_did_webvh, CreateWebvhOptions, CreateWebvhResult, KeyMaterial};
pub use log::{load_did_log, save_did_log, DidLog, DidLogEntry, Parameters};
pub use path::safe_domain;
pub use update::update_did_webvh;

/// Placeholder for the self-certifying identifier (SCID) in a DID URL,
/// before the real SCID is derived from the first log entry's hash.
pub const SCID_PLACEHOLDER: &str = "{SCID}";

pub(crate) const METHOD_PREFIX: &str = "did:webvh:";
