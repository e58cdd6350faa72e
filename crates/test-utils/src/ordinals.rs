//! Scripted [`OrdinalsClient`] fixture.
//!
//! Stands in for the real ordinals/indexer RPC client in tests: inscriptions
//! are assigned deterministic, incrementing ids and satoshi numbers rather
//! than talking to a node, so a test can inscribe an asset and immediately
//! assert on the resulting `did:btco` identifier.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use originals::provider::{
    InscriptionInfo, InscriptionResult, OrdinalsClient, SatInfo, TransferResult,
};
use originals::{Error, Result};
use serde_json::Value;

/// An in-memory, scripted `OrdinalsClient`.
///
/// `fee_rate` is fixed at construction; every
/// inscription gets the next satoshi number and an id of the form
/// `insc-{n}`, starting at `next_satoshi`.
pub struct ScriptedOrdinals {
    fee_rate: f64,
    next_satoshi: AtomicU64,
    next_inscription: AtomicU64,
    inscriptions: DashMap<String, InscriptionInfo>,
    sat_index: DashMap<u64, Vec<String>>,
    metadata: DashMap<String, Value>,
}

impl ScriptedOrdinals {
    /// Construct a fixture with `fee_rate` sat/vB and satoshi numbering
    /// starting at `first_satoshi`.
    #[must_use]
    pub fn new(fee_rate: f64, first_satoshi: u64) -> Self {
        Self {
            fee_rate,
            next_satoshi: AtomicU64::new(first_satoshi),
            next_inscription: AtomicU64::new(0),
            inscriptions: DashMap::new(),
            sat_index: DashMap::new(),
            metadata: DashMap::new(),
        }
    }

    /// Pre-seed an inscription as if it had already been written on-chain,
    /// with optional CBOR-decodable metadata.
    pub fn seed_inscription(&self, info: InscriptionInfo, metadata: Option<Value>) {
        self.sat_index.entry(info.sat).or_default().push(info.id.clone());
        if let Some(metadata) = metadata {
            self.metadata.insert(info.id.clone(), metadata);
        }
        self.inscriptions.insert(info.id.clone(), info);
    }

    /// The number of inscriptions written through [`Self::inscribe_data`] or
    /// seeded directly.
    #[must_use]
    pub fn inscription_count(&self) -> usize {
        self.inscriptions.len()
    }
}

impl Default for ScriptedOrdinals {
    fn default() -> Self {
        Self::new(10.0, 1_000_000)
    }
}

#[async_trait::async_trait]
impl OrdinalsClient for ScriptedOrdinals {
    async fn get_sat_info(&self, satoshi: u64) -> Result<SatInfo> {
        Ok(SatInfo { inscription_ids: self.sat_index.get(&satoshi).map(|v| v.clone()).unwrap_or_default() })
    }

    async fn resolve_inscription(&self, id: &str) -> Result<InscriptionInfo> {
        self.inscriptions
            .get(id)
            .map(|entry| entry.clone())
            .ok_or_else(|| Error::NotFound(format!("no such inscription: {id}")))
    }

    async fn get_metadata(&self, id: &str) -> Result<Option<Value>> {
        Ok(self.metadata.get(id).map(|entry| entry.clone()))
    }

    async fn estimate_fee(&self, _blocks: u32) -> Result<f64> {
        Ok(self.fee_rate)
    }

    async fn inscribe_data(
        &self, payload: &[u8], content_type: &str, fee_rate: Option<f64>,
    ) -> Result<InscriptionResult> {
        let n = self.next_inscription.fetch_add(1, Ordering::SeqCst);
        let sat = self.next_satoshi.fetch_add(1, Ordering::SeqCst);
        let id = format!("insc-{n}i0");
        let info = InscriptionInfo {
            id: id.clone(),
            sat,
            content_type: content_type.to_string(),
            content_url: format!("https://ordinals.test/content/{id}"),
        };
        self.seed_inscription(info, None);
        let _ = payload;
        Ok(InscriptionResult {
            inscription_id: id,
            satoshi: Some(sat),
            reveal_tx_id: format!("reveal-{n}"),
            commit_tx_id: Some(format!("commit-{n}")),
            fee_rate: Some(fee_rate.unwrap_or(self.fee_rate)),
        })
    }

    async fn transfer_inscription(&self, inscription: &str, to_address: &str) -> Result<TransferResult> {
        if !self.inscriptions.contains_key(inscription) {
            return Err(Error::NotFound(format!("no such inscription: {inscription}")));
        }
        let _ = to_address;
        Ok(TransferResult { txid: format!("transfer-{inscription}") })
    }
}
