//! # `BtcoDidResolver`
//!
//! Resolves a `did:btco` DID to the latest-valid DID document embedded in
//! one of the satoshi's inscriptions: fetch inscription ids, fetch
//! per-id content/metadata, fold to a resolution result.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::Network;
use crate::did::document::DidDocument;
use crate::error::{Error, Result};
use crate::provider::{HttpFetch, OrdinalsClient, DEFAULT_FETCH_TIMEOUT};

const DEACTIVATION_MARKER: &str = "\u{1F525}";

fn btco_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^did:btco(?::(reg|sig))?:([0-9]+)(?:/(.+))?$")
            .expect("static BTCO DID regex must compile")
    })
}

/// The parsed components of a `did:btco` identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedBtcoDid {
    /// The Bitcoin network implied by the DID's optional `reg`/`sig`
    /// segment.
    pub network: Network,
    /// The satoshi the DID is anchored to.
    pub satoshi: u64,
    /// A trailing path, if any — always rejected by [`BtcoDidResolver`]
    /// (URL dereferencing is out of scope).
    pub path: Option<String>,
}

/// Parse a `did:btco[(:reg|:sig)]:<satoshi>[/<path>]` string.
///
/// # Errors
///
/// Returns [`Error::Input`] if `did` does not match the BTCO DID shape.
pub fn parse_btco_did(did: &str) -> Result<ParsedBtcoDid> {
    let captures =
        btco_regex().captures(did).ok_or_else(|| Error::Input(format!("not a btco DID: {did}")))?;
    let network = match captures.get(1).map(|m| m.as_str()) {
        Some("reg") => Network::Regtest,
        Some("sig") => Network::Signet,
        _ => Network::Mainnet,
    };
    let satoshi: u64 = captures[2]
        .parse()
        .map_err(|_| Error::Input(format!("invalid satoshi in btco DID: {did}")))?;
    let path = captures.get(3).map(|m| m.as_str().to_string());
    Ok(ParsedBtcoDid { network, satoshi, path })
}

/// Per-inscription detail surfaced for auditing alongside the resolved
/// document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InscriptionDetail {
    /// The inscription's id.
    pub inscription_id: String,
    /// Whether this inscription's content/metadata yielded a valid DID
    /// document for the expected DID.
    pub is_valid_did_document: bool,
    /// Whether this inscription carries the deactivation marker.
    pub is_deactivated: bool,
    /// Any error encountered while evaluating this inscription.
    pub error: Option<String>,
}

/// Resolution metadata.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResolutionMetadata {
    /// The inscription id the resolved document came from, if any.
    pub inscription_id: Option<String>,
    /// The satoshi resolved.
    pub satoshi: u64,
    /// The Bitcoin network resolved against.
    pub network: Network,
    /// Total inscriptions considered.
    pub total_inscriptions: usize,
    /// Error encountered during resolution, if any.
    pub error: Option<String>,
}

/// DID document metadata.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DidDocumentMetadata {
    /// Whether the DID has been deactivated by a `🔥` inscription.
    pub deactivated: bool,
}

/// The result of resolving a `did:btco` DID.
#[derive(Clone, Debug, Default)]
pub struct BtcoResolutionResult {
    /// The resolved document, or `None` if nothing valid was found or the
    /// DID is deactivated.
    pub document: Option<DidDocument>,
    /// Per-inscription details, for auditing.
    pub details: Vec<InscriptionDetail>,
    /// Resolution metadata.
    pub resolution_metadata: ResolutionMetadata,
    /// Document metadata.
    pub did_document_metadata: DidDocumentMetadata,
}

/// Resolves `did:btco` DIDs to the latest-valid embedded DID document.
pub struct BtcoDidResolver {
    ordinals: Arc<dyn OrdinalsClient>,
    fetcher: Option<Arc<dyn HttpFetch>>,
}

impl BtcoDidResolver {
    /// Construct a resolver backed by `ordinals`, with no content fetcher —
    /// every inscription's content fetch will fail, which is useful for
    /// metadata-only tests but not production use. Prefer
    /// [`BtcoDidResolver::with_fetcher`].
    #[must_use]
    pub fn new(ordinals: Arc<dyn OrdinalsClient>) -> Self {
        Self { ordinals, fetcher: None }
    }

    /// Construct a resolver backed by `ordinals`, fetching each
    /// inscription's raw content through `fetcher`.
    #[must_use]
    pub fn with_fetcher(ordinals: Arc<dyn OrdinalsClient>, fetcher: Arc<dyn HttpFetch>) -> Self {
        Self { ordinals, fetcher: Some(fetcher) }
    }

    /// Resolve `did` for the given `accept` media type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Representation`] if `did` carries a trailing path or
    /// `accept` is not `application/did+json`, `application/json`, or
    /// `*/*`. Returns [`Error::Input`] if `did` is not BTCO-shaped.
    /// Returns [`Error::NotFound`] if the satoshi has no inscriptions.
    pub async fn resolve(&self, did: &str, accept: &str) -> Result<BtcoResolutionResult> {
        let parsed = parse_btco_did(did)?;
        if parsed.path.is_some() {
            return Err(Error::Representation(format!(
                "did:btco URL dereferencing is not supported: {did}"
            )));
        }
        if !matches!(accept, "application/did+json" | "application/json" | "*/*") {
            return Err(Error::Representation(format!("unsupported accept media type: {accept}")));
        }

        let sat_info = self.ordinals.get_sat_info(parsed.satoshi).await?;
        if sat_info.inscription_ids.is_empty() {
            return Err(Error::NotFound(format!("no inscriptions for satoshi {}", parsed.satoshi)));
        }

        let expected_did = did.to_string();
        let mut details = Vec::with_capacity(sat_info.inscription_ids.len());
        let mut candidates: Vec<(usize, DidDocument)> = Vec::new();

        for (idx, inscription_id) in sat_info.inscription_ids.iter().enumerate() {
            let mut detail = InscriptionDetail {
                inscription_id: inscription_id.clone(),
                is_valid_did_document: false,
                is_deactivated: false,
                error: None,
            };

            let content = match self.ordinals.resolve_inscription(inscription_id).await {
                Ok(info) => self.fetch_content(&info).await,
                Err(e) => Err(e),
            };

            let content_text = match content {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    detail.error = Some(e.to_string());
                    details.push(detail);
                    continue;
                }
            };

            if content_text.contains(DEACTIVATION_MARKER) {
                detail.is_deactivated = true;
                detail.error = Some("DID deactivated by 🔥 inscription".to_string());
                details.push(detail);
                continue;
            }

            let body_matches = {
                let normalized = content_text.trim();
                let stripped = normalized
                    .strip_prefix("BTCO DID: ")
                    .or_else(|| normalized.strip_prefix("btco did: "))
                    .unwrap_or(normalized);
                stripped.eq_ignore_ascii_case(&expected_did)
            };

            let metadata = self.ordinals.get_metadata(inscription_id).await.ok().flatten();
            let document = metadata.and_then(|m| parse_did_document(&m, &expected_did));

            if body_matches {
                if let Some(doc) = document {
                    if doc.validate().is_ok() {
                        detail.is_valid_did_document = true;
                        candidates.push((idx, doc));
                    } else {
                        detail.error = Some("embedded document failed validation".to_string());
                    }
                } else {
                    detail.error = Some("inscription metadata is not a valid DID document".to_string());
                }
            } else {
                detail.error = Some("inscription content does not match expected DID".to_string());
            }

            details.push(detail);
        }

        let deactivated = details.iter().any(|d| d.is_deactivated);
        let winner = candidates.into_iter().rev().find(|(idx, _)| !details[*idx].is_deactivated);

        if self.config_logging_enabled() {
            debug!(did, winner_found = winner.is_some(), "resolved btco DID");
        }

        let document = if deactivated { None } else { winner.map(|(_, doc)| doc) };
        let inscription_id =
            if deactivated { None } else { winner_inscription_id(&details, document.as_ref()) };

        Ok(BtcoResolutionResult {
            document,
            resolution_metadata: ResolutionMetadata {
                inscription_id: inscription_id.clone(),
                satoshi: parsed.satoshi,
                network: parsed.network,
                total_inscriptions: sat_info.inscription_ids.len(),
                error: None,
            },
            did_document_metadata: DidDocumentMetadata { deactivated },
            details,
        })
    }

    fn config_logging_enabled(&self) -> bool {
        true
    }

    async fn fetch_content(
        &self, info: &crate::provider::InscriptionInfo,
    ) -> Result<Vec<u8>> {
        let Some(fetcher) = &self.fetcher else {
            return Err(Error::External(
                "no HttpFetch configured to retrieve inscription content".into(),
            ));
        };
        let response = fetcher.fetch(&info.content_url, DEFAULT_FETCH_TIMEOUT).await?;
        Ok(response.body)
    }
}

fn winner_inscription_id(details: &[InscriptionDetail], document: Option<&DidDocument>) -> Option<String> {
    document?;
    details.iter().rev().find(|d| d.is_valid_did_document).map(|d| d.inscription_id.clone())
}

fn parse_did_document(metadata: &Value, expected_did: &str) -> Option<DidDocument> {
    let doc: DidDocument = serde_json::from_value(metadata.clone()).ok()?;
    if doc.id != expected_did {
        return None;
    }
    if doc.context.is_empty() {
        return None;
    }
    Some(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mainnet_did() {
        let parsed = parse_btco_did("did:btco:100").expect("should parse");
        assert_eq!(parsed.network, Network::Mainnet);
        assert_eq!(parsed.satoshi, 100);
        assert!(parsed.path.is_none());
    }

    #[test]
    fn parses_regtest_and_signet() {
        assert_eq!(parse_btco_did("did:btco:reg:5").unwrap().network, Network::Regtest);
        assert_eq!(parse_btco_did("did:btco:sig:5").unwrap().network, Network::Signet);
    }

    #[test]
    fn parses_trailing_path() {
        let parsed = parse_btco_did("did:btco:100/info").expect("should parse");
        assert_eq!(parsed.path, Some("info".to_string()));
    }

    #[test]
    fn rejects_malformed_did() {
        assert!(parse_btco_did("did:example:100").is_err());
    }

    #[tokio::test]
    async fn path_component_is_representation_not_supported() {
        struct EmptyOrdinals;
        #[async_trait::async_trait]
        impl OrdinalsClient for EmptyOrdinals {
            async fn get_sat_info(&self, _: u64) -> Result<crate::provider::SatInfo> {
                unreachable!("resolve should fail before reaching the provider")
            }
            async fn resolve_inscription(
                &self, _: &str,
            ) -> Result<crate::provider::InscriptionInfo> {
                unreachable!()
            }
            async fn get_metadata(&self, _: &str) -> Result<Option<Value>> {
                unreachable!()
            }
            async fn estimate_fee(&self, _: u32) -> Result<f64> {
                unreachable!()
            }
            async fn inscribe_data(
                &self, _: &[u8], _: &str, _: Option<f64>,
            ) -> Result<crate::provider::InscriptionResult> {
                unreachable!()
            }
            async fn transfer_inscription(
                &self, _: &str, _: &str,
            ) -> Result<crate::provider::TransferResult> {
                unreachable!()
            }
        }

        let resolver = BtcoDidResolver::new(Arc::new(EmptyOrdinals));
        let err = resolver
            .resolve("did:btco:100/info", "application/did+json")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Representation(_)));
    }

    #[tokio::test]
    async fn empty_inscriptions_is_not_found() {
        struct Empty;
        #[async_trait::async_trait]
        impl OrdinalsClient for Empty {
            async fn get_sat_info(&self, _: u64) -> Result<crate::provider::SatInfo> {
                Ok(crate::provider::SatInfo { inscription_ids: vec![] })
            }
            async fn resolve_inscription(
                &self, _: &str,
            ) -> Result<crate::provider::InscriptionInfo> {
                unreachable!()
            }
            async fn get_metadata(&self, _: &str) -> Result<Option<Value>> {
                unreachable!()
            }
            async fn estimate_fee(&self, _: u32) -> Result<f64> {
                unreachable!()
            }
            async fn inscribe_data(
                &self, _: &[u8], _: &str, _: Option<f64>,
            ) -> Result<crate::provider::InscriptionResult> {
                unreachable!()
            }
            async fn transfer_inscription(
                &self, _: &str, _: &str,
            ) -> Result<crate::provider::TransferResult> {
                unreachable!()
            }
        }

        let resolver = BtcoDidResolver::new(Arc::new(Empty));
        let err = resolver.resolve("did:btco:100", "application/did+json").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
