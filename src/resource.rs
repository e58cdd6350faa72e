//! # `ResourceManager`
//!
//! Owns a map from logical resource id to its ordered version chain, with
//! `regex`-based format validation and `Result<T, Error>` throughout.

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Default maximum resource size: 10 MiB.
pub const DEFAULT_MAX_SIZE: usize = 10 * 1024 * 1024;

/// The categorical type tag a resource is inferred into from its MIME type.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Image content.
    Image,
    /// Plain text content.
    Text,
    /// Source code content.
    Code,
    /// Structured data content (JSON, CSV, etc).
    Data,
    /// Audio content.
    Audio,
    /// Video content.
    Video,
    /// Document content (PDF, Word, etc).
    Document,
    /// Binary content with no more specific tag.
    Binary,
    /// Anything else.
    Other,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Image => "image",
            Self::Text => "text",
            Self::Code => "code",
            Self::Data => "data",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Document => "document",
            Self::Binary => "binary",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

/// Infer a [`ResourceKind`] from a MIME type.
#[must_use]
pub fn infer_resource_type(mime: &str) -> ResourceKind {
    match mime {
        "application/json" | "text/csv" | "application/xml" => ResourceKind::Data,
        "application/pdf" | "application/msword" => ResourceKind::Document,
        "text/javascript" | "application/javascript" | "text/x-python" | "text/x-rust" => {
            ResourceKind::Code
        }
        _ => {
            if let Some(prefix) = mime.split('/').next() {
                match prefix {
                    "image" => return ResourceKind::Image,
                    "audio" => return ResourceKind::Audio,
                    "video" => return ResourceKind::Video,
                    "text" => return ResourceKind::Text,
                    _ => {}
                }
            }
            if mime == "application/octet-stream" {
                ResourceKind::Binary
            } else {
                ResourceKind::Other
            }
        }
    }
}

fn mime_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9!#$&^_.+-]*/[A-Za-z0-9][A-Za-z0-9!#$&^_.+-]*$")
            .expect("static MIME regex must compile")
    })
}

fn hex64_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9a-f]{64}$").expect("static hex64 regex must compile"))
}

/// Validate a MIME type string against RFC 6838's `type/subtype` shape.
#[must_use]
pub fn is_valid_mime(mime: &str) -> bool {
    mime_regex().is_match(mime)
}

/// Content attached to a resource in memory.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase", tag = "encoding", content = "data")]
pub enum Content {
    /// UTF-8 text content.
    Text(String),
    /// Base64-encoded bytes.
    Base64(String),
}

impl Content {
    /// Decode this content to raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> Vec<u8> {
        match self {
            Self::Text(s) => s.as_bytes().to_vec(),
            Self::Base64(s) => {
                use base64ct::{Base64, Encoding};
                Base64::decode_vec(s).unwrap_or_default()
            }
        }
    }
}

/// A single immutable, content-addressed resource version.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Stable logical id shared by every version in the chain.
    pub id: String,
    /// Categorical type tag.
    #[serde(rename = "type")]
    pub type_: ResourceKind,
    /// RFC 6838 MIME type.
    pub content_type: String,
    /// Lower-case hex SHA-256 of the content bytes, exactly 64 hex chars.
    pub hash: String,
    /// Size in bytes.
    pub size: u64,
    /// 1-indexed version number.
    pub version: u32,
    /// The prior version's hash; present iff `version > 1`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_version_hash: Option<String>,
    /// ISO-8601 creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Optional external URL (set once published).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Optional human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional in-memory content, not persisted once published.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
}

/// Options accepted by [`ResourceManager::create_resource`].
#[derive(Clone, Debug, Default)]
pub struct CreateOptions {
    /// Caller-supplied logical id; generated if absent.
    pub id: Option<String>,
    /// Categorical type tag; inferred from `content_type` if absent.
    pub type_: Option<ResourceKind>,
    /// RFC 6838 MIME type. Required.
    pub content_type: String,
    /// Optional external URL.
    pub url: Option<String>,
    /// Optional description.
    pub description: Option<String>,
}

/// Options accepted by [`ResourceManager::update_resource`].
#[derive(Clone, Debug, Default)]
pub struct UpdateOptions {
    /// Override description for the new version.
    pub description: Option<String>,
}

/// SHA-256 hash of `bytes`, as lower-case hex.
#[must_use]
pub fn hash_content(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(digest)
}

/// Owns every resource's version chain.
///
/// The version map is mutated only inside `create_resource`,
/// `update_resource`, `import_resource`, `delete_resource` and `clear`;
/// every read-only accessor returns a copy.
#[derive(Clone, Default)]
pub struct ResourceManager {
    versions: HashMap<String, Vec<Resource>>,
    allowed_mime_types: Option<Vec<String>>,
    max_size: usize,
}

impl ResourceManager {
    /// Create an empty resource manager with the default 10 MiB size limit
    /// and no MIME allow-list (every RFC-6838-shaped MIME is accepted).
    #[must_use]
    pub fn new() -> Self {
        Self { versions: HashMap::new(), allowed_mime_types: None, max_size: DEFAULT_MAX_SIZE }
    }

    /// Restrict accepted content types to `allowed`.
    #[must_use]
    pub fn with_allowed_mime_types(mut self, allowed: Vec<String>) -> Self {
        self.allowed_mime_types = Some(allowed);
        self
    }

    /// Override the maximum resource size in bytes.
    #[must_use]
    pub const fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    fn validate_mime(&self, content_type: &str) -> Result<()> {
        if !is_valid_mime(content_type) {
            return Err(Error::Input(format!("invalid MIME type: {content_type}")));
        }
        if let Some(allowed) = &self.allowed_mime_types {
            if !allowed.iter().any(|a| a == content_type) {
                return Err(Error::Input(format!("MIME type not allowed: {content_type}")));
            }
        }
        Ok(())
    }

    /// Create a new resource at version 1.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Input`] if `bytes` is empty, `opts.content_type` is
    /// missing or malformed, the MIME type is not on the allow-list (if
    /// configured), or the content exceeds the configured max size.
    pub fn create_resource(&mut self, bytes: &[u8], opts: CreateOptions) -> Result<Resource> {
        if bytes.is_empty() {
            return Err(Error::Input("resource content must not be empty".into()));
        }
        if opts.content_type.is_empty() {
            return Err(Error::Input("contentType is required".into()));
        }
        self.validate_mime(&opts.content_type)?;
        if bytes.len() > self.max_size {
            return Err(Error::Input(format!(
                "resource size {} exceeds max {}",
                bytes.len(),
                self.max_size
            )));
        }

        let id = opts.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        if self.versions.contains_key(&id) {
            return Err(Error::Input(format!("resource id already exists: {id}")));
        }

        let resource = Resource {
            id: id.clone(),
            type_: opts.type_.unwrap_or_else(|| infer_resource_type(&opts.content_type)),
            content_type: opts.content_type,
            hash: hash_content(bytes),
            size: bytes.len() as u64,
            version: 1,
            previous_version_hash: None,
            created_at: Utc::now(),
            url: opts.url,
            description: opts.description,
            content: None,
        };
        self.versions.insert(id, vec![resource.clone()]);
        Ok(resource)
    }

    /// Create a new version for an existing resource chain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `id` has no chain, or
    /// [`Error::Integrity`] if `bytes` hashes to the same value as the
    /// current head.
    pub fn update_resource(
        &mut self, id: &str, bytes: &[u8], opts: UpdateOptions,
    ) -> Result<Resource> {
        if bytes.is_empty() {
            return Err(Error::Input("resource content must not be empty".into()));
        }
        let chain = self.versions.get_mut(id).ok_or_else(|| Error::NotFound(id.to_string()))?;
        let head = chain.last().expect("a resource chain is never empty").clone();
        let new_hash = hash_content(bytes);
        if new_hash == head.hash {
            return Err(Error::Integrity(format!("content unchanged for resource {id}")));
        }
        let resource = Resource {
            id: head.id,
            type_: head.type_,
            content_type: head.content_type,
            hash: new_hash,
            size: bytes.len() as u64,
            version: head.version + 1,
            previous_version_hash: Some(head.hash),
            created_at: Utc::now(),
            url: head.url,
            description: opts.description.or(head.description),
            content: None,
        };
        chain.push(resource.clone());
        Ok(resource)
    }

    /// Fetch a specific version of a resource.
    #[must_use]
    pub fn get_resource_version(&self, id: &str, version: u32) -> Option<Resource> {
        self.versions.get(id)?.iter().find(|r| r.version == version).cloned()
    }

    /// Fetch the current (latest) version of a resource.
    #[must_use]
    pub fn get_current_version(&self, id: &str) -> Option<Resource> {
        self.versions.get(id)?.last().cloned()
    }

    /// Find a resource version by its content hash, across every chain.
    #[must_use]
    pub fn get_resource_by_hash(&self, hash: &str) -> Option<Resource> {
        self.versions.values().flatten().find(|r| r.hash == hash).cloned()
    }

    /// The full version history of a resource, oldest first.
    #[must_use]
    pub fn get_resource_history(&self, id: &str) -> Vec<Resource> {
        self.versions.get(id).cloned().unwrap_or_default()
    }

    /// Alias of [`ResourceManager::get_resource_history`] kept for parity
    /// with the source API's `getResourceVersionHistory`.
    #[must_use]
    pub fn get_resource_version_history(&self, id: &str) -> Vec<Resource> {
        self.get_resource_history(id)
    }

    /// Validate a resource's structural invariants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Input`] for malformed fields, or [`Error::Integrity`]
    /// if embedded content doesn't hash to the declared `hash`.
    pub fn validate_resource(&self, resource: &Resource) -> Result<()> {
        if resource.id.is_empty() {
            return Err(Error::Input("resource id is required".into()));
        }
        if !is_valid_mime(&resource.content_type) {
            return Err(Error::Input(format!("invalid MIME type: {}", resource.content_type)));
        }
        if !hex64_regex().is_match(&resource.hash) {
            return Err(Error::Input(format!("hash must be 64 lowercase hex chars: {}", resource.hash)));
        }
        if resource.version == 0 {
            return Err(Error::Input("version must be >= 1".into()));
        }
        if resource.version == 1 && resource.previous_version_hash.is_some() {
            return Err(Error::Input("version 1 must not carry previousVersionHash".into()));
        }
        if resource.version > 1 && resource.previous_version_hash.is_none() {
            return Err(Error::Input(format!(
                "version {} must carry previousVersionHash",
                resource.version
            )));
        }
        if let Some(content) = &resource.content {
            let recomputed = hash_content(&content.as_bytes());
            if recomputed != resource.hash {
                return Err(Error::Integrity(format!(
                    "content hash mismatch for resource {}: declared {}, recomputed {recomputed}",
                    resource.id, resource.hash
                )));
            }
        }
        Ok(())
    }

    /// Verify that a resource's full version chain is internally consistent
    ///.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `id` has no chain, or
    /// [`Error::Integrity`] if version numbers are not sequential or a
    /// back-pointer is wrong.
    pub fn verify_version_chain(&self, id: &str) -> Result<()> {
        let chain = self.versions.get(id).ok_or_else(|| Error::NotFound(id.to_string()))?;
        for (idx, version) in chain.iter().enumerate() {
            let expected_version = (idx + 1) as u32;
            if version.version != expected_version {
                return Err(Error::Integrity(format!(
                    "resource {id} version chain out of order at index {idx}"
                )));
            }
            if idx == 0 {
                if version.previous_version_hash.is_some() {
                    return Err(Error::Integrity(format!(
                        "resource {id} v1 must not carry previousVersionHash"
                    )));
                }
            } else {
                let prev_hash = &chain[idx - 1].hash;
                if version.previous_version_hash.as_deref() != Some(prev_hash.as_str()) {
                    return Err(Error::Integrity(format!(
                        "resource {id} v{expected_version} previousVersionHash does not match v{} hash",
                        expected_version - 1
                    )));
                }
            }
        }
        Ok(())
    }

    /// Import a fully-formed resource (e.g. from a backup) directly into the
    /// store, appending it to its chain after validating it.
    ///
    /// # Errors
    ///
    /// Returns an error from [`ResourceManager::validate_resource`], or
    /// [`Error::Integrity`] if importing would break the chain's ordering.
    pub fn import_resource(&mut self, resource: Resource) -> Result<()> {
        self.validate_resource(&resource)?;
        let chain = self.versions.entry(resource.id.clone()).or_default();
        let expected_version = chain.len() as u32 + 1;
        if resource.version != expected_version {
            return Err(Error::Integrity(format!(
                "expected version {expected_version} when importing resource {}, got {}",
                resource.id, resource.version
            )));
        }
        chain.push(resource);
        Ok(())
    }

    /// Export every resource version across every chain.
    #[must_use]
    pub fn export_resources(&self) -> Vec<Resource> {
        self.versions.values().flatten().cloned().collect()
    }

    /// Delete an entire resource chain.
    pub fn delete_resource(&mut self, id: &str) -> bool {
        self.versions.remove(id).is_some()
    }

    /// Drop every resource chain.
    pub fn clear(&mut self) {
        self.versions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> ResourceManager {
        ResourceManager::new()
    }

    #[test]
    fn create_resource_assigns_version_one() {
        let mut rm = manager();
        let r = rm
            .create_resource(
                b"Hello",
                CreateOptions { content_type: "text/plain".into(), ..Default::default() },
            )
            .expect("should create");
        assert_eq!(r.version, 1);
        assert!(r.previous_version_hash.is_none());
        assert_eq!(r.type_, ResourceKind::Text);
    }

    #[test]
    fn update_with_unchanged_content_fails() {
        let mut rm = manager();
        let r = rm
            .create_resource(
                b"Hello",
                CreateOptions { content_type: "text/plain".into(), ..Default::default() },
            )
            .expect("should create");
        let err = rm.update_resource(&r.id, b"Hello", UpdateOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Integrity(_)));
    }

    #[test]
    fn update_with_changed_content_bumps_version() {
        let mut rm = manager();
        let r = rm
            .create_resource(
                b"Hello",
                CreateOptions { content_type: "text/plain".into(), ..Default::default() },
            )
            .expect("should create");
        let r2 =
            rm.update_resource(&r.id, b"Hello2", UpdateOptions::default()).expect("should update");
        assert_eq!(r2.version, 2);
        assert_eq!(r2.previous_version_hash, Some(r.hash));
        rm.verify_version_chain(&r.id).expect("chain should verify");
    }

    #[test]
    fn update_missing_resource_not_found() {
        let mut rm = manager();
        let err = rm.update_resource("missing", b"data", UpdateOptions::default()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn rejects_invalid_mime() {
        let mut rm = manager();
        let err = rm
            .create_resource(
                b"data",
                CreateOptions { content_type: "not-a-mime".into(), ..Default::default() },
            )
            .unwrap_err();
        assert!(matches!(err, Error::Input(_)));
    }

    #[test]
    fn export_then_import_round_trips() {
        let mut rm = manager();
        rm.create_resource(
            b"Hello",
            CreateOptions { content_type: "text/plain".into(), id: Some("res1".into()), ..Default::default() },
        )
        .expect("should create");
        let exported = rm.export_resources();

        let mut rm2 = manager();
        for r in exported.clone() {
            rm2.import_resource(r).expect("should import");
        }
        assert_eq!(rm2.export_resources(), exported);
    }
}
