//! # `DocumentLoader`
//!
//! Resolves `did:*` IRIs by delegating to the [`crate::did::DidManager`];
//! everything else is fetched over HTTP under a pluggable [`HttpFetch`].
//! Results are memoized per call chain (a fresh [`DocumentLoader`] per
//! top-level `verifyCredential`/`verifyPresentation` invocation) to keep
//! JSON-LD processing deterministic.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::did::DidManager;
use crate::error::{Error, Result};
use crate::provider::{HttpFetch, DEFAULT_FETCH_TIMEOUT};

/// The result of loading an IRI: the document itself plus the URLs JSON-LD
/// processing needs to track.
#[derive(Clone, Debug)]
pub struct LoadedDocument {
    /// The context URL, if the loader resolved one distinct from
    /// `document_url`.
    pub context_url: Option<String>,
    /// The URL actually dereferenced.
    pub document_url: String,
    /// The loaded document.
    pub document: Value,
}

/// Loads DID documents and plain JSON-LD contexts by IRI, memoizing results
/// within a single call chain.
pub struct DocumentLoader {
    fetcher: Arc<dyn HttpFetch>,
    cache: HashMap<String, LoadedDocument>,
}

impl DocumentLoader {
    /// Create a loader backed by `fetcher` for non-DID IRIs.
    #[must_use]
    pub fn new(fetcher: Arc<dyn HttpFetch>) -> Self {
        Self { fetcher, cache: HashMap::new() }
    }

    /// Load `iri`, resolving `did:*` IRIs via `dids` and fetching everything
    /// else over HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if a `did:*` IRI fails to resolve, or
    /// [`Error::External`] if the HTTP fetch fails or times out.
    pub async fn load(&mut self, iri: &str, dids: &DidManager) -> Result<LoadedDocument> {
        if let Some(cached) = self.cache.get(iri) {
            return Ok(cached.clone());
        }

        let loaded = if iri.starts_with("did:") {
            let base_did = iri.split('#').next().unwrap_or(iri);
            let doc = dids
                .resolve(base_did)
                .await
                .ok_or_else(|| Error::NotFound(format!("could not resolve {base_did}")))?;
            LoadedDocument {
                context_url: None,
                document_url: iri.to_string(),
                document: serde_json::to_value(&doc)?,
            }
        } else {
            let response = self.fetcher.fetch(iri, DEFAULT_FETCH_TIMEOUT).await?;
            let document: Value = serde_json::from_slice(&response.body)?;
            LoadedDocument { context_url: None, document_url: iri.to_string(), document }
        };

        self.cache.insert(iri.to_string(), loaded.clone());
        Ok(loaded)
    }

    /// Clear the memoization cache, starting a new call chain.
    pub fn reset(&mut self) {
        self.cache.clear();
    }
}
