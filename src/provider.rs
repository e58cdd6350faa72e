//! # External collaborator traits
//!
//! Each external collaborator is expressed as a narrow `async_trait`
//! injected via [`crate::config::Config`] rather than accepted structurally;
//! concrete adapters (HTTP clients, Bitcoin RPC, storage SDKs) are out of
//! scope for the core.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Default HTTP fetch timeout: 10 seconds.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default per-batch-item timeout: 30 seconds.
pub const DEFAULT_BATCH_ITEM_TIMEOUT: Duration = Duration::from_millis(30_000);

/// A fetched HTTP response, as consumed by the `DocumentLoader` and
/// `BtcoDidResolver`.
#[derive(Clone, Debug, Default)]
pub struct FetchResponse {
    /// Response body bytes.
    pub body: Vec<u8>,
    /// `Content-Type` response header, if present.
    pub content_type: Option<String>,
}

/// A pluggable HTTP fetch function.
///
/// The default production adapter wraps `reqwest`; tests substitute a
/// scripted in-memory implementation (`originals-test-utils`).
#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// Fetch `url`, sending `Accept: application/did+json, application/json,
    /// */*` and applying [`DEFAULT_FETCH_TIMEOUT`] unless overridden by the
    /// caller.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::External`] on a timeout or transport
    /// failure.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchResponse>;
}

/// Result of `getSatInfo`: the inscription ids anchored to a
/// satoshi, oldest first.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SatInfo {
    /// Inscription ids anchored to the satoshi, in inscription order.
    pub inscription_ids: Vec<String>,
}

/// Result of `resolveInscription`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InscriptionInfo {
    /// The inscription id.
    pub id: String,
    /// The satoshi the inscription is anchored to.
    pub sat: u64,
    /// The inscription's content MIME type.
    pub content_type: String,
    /// URL at which the inscription's raw content can be fetched.
    pub content_url: String,
}

/// Result of `inscribeData`: the outcome of a Bitcoin inscription.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct InscriptionResult {
    /// The new inscription's id.
    pub inscription_id: String,
    /// The satoshi the inscription was anchored to, if known immediately.
    pub satoshi: Option<u64>,
    /// The reveal transaction id (`txid` or `revealTxId` in the source).
    pub reveal_tx_id: String,
    /// The commit transaction id, if the inscription used a commit/reveal
    /// pair.
    pub commit_tx_id: Option<String>,
    /// The fee rate actually used, in sat/vB.
    pub fee_rate: Option<f64>,
}

/// Result of `transferInscription`.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TransferResult {
    /// The transfer transaction id.
    pub txid: String,
}

/// The Bitcoin ordinals collaborator, consumed by
/// [`crate::btco_resolver::BtcoDidResolver`] and
/// [`crate::lifecycle::LifecycleManager`].
#[async_trait]
pub trait OrdinalsClient: Send + Sync {
    /// Fetch the inscription ids anchored to `satoshi`.
    async fn get_sat_info(&self, satoshi: u64) -> Result<SatInfo>;

    /// Resolve inscription metadata (not its content) by id.
    async fn resolve_inscription(&self, id: &str) -> Result<InscriptionInfo>;

    /// Fetch and CBOR-decode an inscription's metadata object, if any.
    async fn get_metadata(&self, id: &str) -> Result<Option<Value>>;

    /// Estimate a fee rate (sat/vB) for confirmation within `blocks` blocks.
    async fn estimate_fee(&self, blocks: u32) -> Result<f64>;

    /// Inscribe `payload` with `content_type`, optionally at `fee_rate`
    /// sat/vB.
    async fn inscribe_data(
        &self, payload: &[u8], content_type: &str, fee_rate: Option<f64>,
    ) -> Result<InscriptionResult>;

    /// Transfer `inscription` to `to_address`.
    async fn transfer_inscription(
        &self, inscription: &str, to_address: &str,
    ) -> Result<TransferResult>;
}

/// The object storage collaborator, consumed by
/// `LifecycleManager::publish_to_web`.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Store `bytes` under `key` with the given content type.
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()>;

    /// Store `bytes` at `domain`/`rel_path`, used by the webvh log writer.
    async fn put_object(&self, domain: &str, rel_path: &str, bytes: &[u8]) -> Result<()>;

    /// Fetch the bytes stored at `domain`/`rel_path`, or `None` if absent.
    async fn get_object(&self, domain: &str, rel_path: &str) -> Result<Option<Vec<u8>>>;
}

/// A fee-rate oracle, consulted ahead of the ordinals
/// provider's own estimate during cost estimation.
#[async_trait]
pub trait FeeOracle: Send + Sync {
    /// Current recommended fee rate, in sat/vB.
    async fn fee_rate(&self) -> Result<f64>;
}

/// Result of `ExternalSigner::sign`: the produced `proofValue`.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ExternalSignature {
    /// Multibase-encoded signature, ready to place in a `DataIntegrityProof`.
    pub proof_value: String,
}

/// An externally-held signer, used when the SDK
/// does not hold the private key itself (e.g. a browser extension or an
/// HSM-backed publisher key).
#[async_trait]
pub trait ExternalSigner: Send + Sync {
    /// Sign `input` bytes, returning a multibase `proofValue`.
    async fn sign(&self, input: &[u8]) -> Result<ExternalSignature>;

    /// The verification method id the signature should be attributed to.
    async fn verification_method_id(&self) -> Result<String>;
}
