//! # `DIDManager`
//!
//! Create, resolve, and migrate DID documents across `peer`, `webvh` and
//! `btco`, dispatching on the DID's method prefix. A single manager owns
//! no state itself beyond its [`Config`] — webvh logs are read through the
//! injected [`StorageAdapter`], and `btco` resolution is delegated to
//! [`crate::btco_resolver::BtcoDidResolver`].

pub mod btco;
pub mod document;
pub mod peer;
pub mod webvh;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::btco_resolver::BtcoDidResolver;
use crate::config::Config;
use crate::provider::StorageAdapter;
pub use document::{DidDocument, Service, VerificationMethod};
use originals_keyring::{Algorithm, KeyPair};
pub use webvh::{
    create_did_webvh, safe_domain, update_did_webvh, CreateWebvhOptions, CreateWebvhResult,
    DidLog, KeyMaterial,
};

/// Create/resolve/migrate DID documents across the three layers.
#[derive(Clone)]
pub struct DidManager {
    config: Config,
}

impl DidManager {
    /// Construct a manager bound to `config`'s collaborators.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Generate a peer DID document using the configured default algorithm.
    #[must_use]
    pub fn create_peer_did(&self) -> (DidDocument, KeyPair) {
        self.create_peer_did_with(self.config.default_key_type)
    }

    /// Generate a peer DID document with an explicit algorithm.
    #[must_use]
    pub fn create_peer_did_with(&self, algorithm: Algorithm) -> (DidDocument, KeyPair) {
        peer::create(algorithm)
    }

    /// Create a `did:webvh` document and initial log entry, optionally
    /// persisting it via the configured storage adapter.
    ///
    /// # Errors
    ///
    /// Propagates [`webvh::create_did_webvh`]'s errors.
    pub async fn create_webvh_did(
        &self, mut options: CreateWebvhOptions,
    ) -> crate::error::Result<CreateWebvhResult> {
        if options.storage.is_none() {
            options.storage = self.config.storage_adapter.clone().map(|s| s as Arc<dyn StorageAdapter>);
        }
        if self.config.enable_logging {
            debug!(domain = %options.domain, "creating did:webvh");
        }
        webvh::create_did_webvh(options).await
    }

    /// Migrate a source DID document to `btco`, anchored at `satoshi`.
    ///
    /// # Errors
    ///
    /// Propagates [`btco::migrate_to_btco`]'s errors.
    pub fn migrate_to_btco(
        &self, source: &DidDocument, satoshi: u64,
    ) -> crate::error::Result<DidDocument> {
        btco::migrate_to_btco(source, self.config.bitcoin_network(), satoshi)
    }

    /// Resolve a DID of any layer to its document. Dispatches on prefix:
    /// `did:peer:` to the peer resolver, `did:btco:*` to the configured
    /// `BtcoDidResolver`, `did:webvh:` to the webvh resolver, otherwise a
    /// minimal skeleton. Returns `None` on any resolution failure.
    pub async fn resolve(&self, did: &str) -> Option<DidDocument> {
        if let Some(rest) = did.strip_prefix("did:peer:") {
            return peer::resolve(&format!("did:peer:{rest}")).ok();
        }

        if did.starts_with("did:btco") {
            let Some(ordinals) = self.config.ordinals_provider.clone() else {
                warn!("btco resolution requested with no ordinals provider configured");
                return None;
            };
            let resolver = match self.config.http_fetcher.clone() {
                Some(fetcher) => BtcoDidResolver::with_fetcher(ordinals, fetcher),
                None => BtcoDidResolver::new(ordinals),
            };
            return resolver.resolve(did, "application/did+json").await.ok().and_then(|r| r.document);
        }

        if did.starts_with("did:webvh:") {
            return self.resolve_webvh(did).await;
        }

        Some(DidDocument::minimal(did))
    }

    async fn resolve_webvh(&self, did: &str) -> Option<DidDocument> {
        let storage = self.config.storage_adapter.clone()?;
        let (domain, path_segments) = parse_webvh_did(did)?;
        let log = webvh::load_did_log(storage.as_ref(), &domain, &path_segments).await.ok()?;
        log.last().map(|entry| entry.state.clone())
    }
}

/// Parse a `did:webvh:{scid}:domain[:pathSegment...]` DID into
/// `(domain, path_segments)`.
fn parse_webvh_did(did: &str) -> Option<(String, Vec<String>)> {
    let rest = did.strip_prefix("did:webvh:")?;
    let mut parts = rest.split(':');
    let _scid = parts.next()?;
    let domain = parts.next()?.to_string();
    let path_segments: Vec<String> = parts.map(ToString::to_string).collect();
    Some((domain, path_segments))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_peer_did() {
        let manager = DidManager::new(Config::default());
        let (doc, _kp) = manager.create_peer_did();
        let resolved = manager.resolve(&doc.id).await.expect("should resolve");
        assert_eq!(resolved, doc);
    }

    #[tokio::test]
    async fn unknown_prefix_returns_skeleton() {
        let manager = DidManager::new(Config::default());
        let resolved = manager.resolve("did:example:123").await.expect("should resolve skeleton");
        assert_eq!(resolved.id, "did:example:123");
    }

    #[tokio::test]
    async fn btco_without_provider_returns_none() {
        let manager = DidManager::new(Config::default());
        assert!(manager.resolve("did:btco:100").await.is_none());
    }

    #[test]
    fn parses_webvh_did_with_path() {
        let (domain, paths) = parse_webvh_did("did:webvh:abc123:example.com:alice").unwrap();
        assert_eq!(domain, "example.com");
        assert_eq!(paths, vec!["alice".to_string()]);
    }
}
