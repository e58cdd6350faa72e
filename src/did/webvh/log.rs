//! The `did.jsonl` log model and its read/write operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::did::document::DidDocument;
use crate::error::{Error, Result};
use crate::proof::DataIntegrityProof;
use crate::provider::StorageAdapter;

use super::path::log_file_path;

/// Per-version parameters carried by a [`DidLogEntry`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Parameters {
    /// DID method identifier and version, e.g. `did:webvh:0.5`.
    pub method: String,
    /// Keys authorized to sign subsequent log entries.
    pub update_keys: Vec<String>,
    /// Whether the DID may be ported to a new domain while preserving its
    /// identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portable: Option<bool>,
    /// Set once the DID has been deactivated; no further entries are valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivated: Option<bool>,
}

/// A single entry in a `did.jsonl` log.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DidLogEntry {
    /// The version id for this entry (`{n}-{entryHash}` in the full webvh
    /// spec; this implementation uses a sequential counter).
    pub version_id: String,
    /// UTC timestamp of this version, monotonically non-decreasing across
    /// the log.
    pub version_time: DateTime<Utc>,
    /// Parameters in effect as of this version.
    pub parameters: Parameters,
    /// The resolved DID document as of this version.
    pub state: DidDocument,
    /// Data integrity proof(s) signing this entry, by an update key
    /// authorized in `parameters.update_keys`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Vec<DataIntegrityProof>>,
}

/// An ordered sequence of [`DidLogEntry`].
pub type DidLog = Vec<DidLogEntry>;

/// Parse a `did.jsonl` byte buffer into an ordered [`DidLog`].
///
/// # Errors
///
/// Returns [`Error::Input`] if any line fails to parse as a [`DidLogEntry`].
pub fn parse_log(bytes: &[u8]) -> Result<DidLog> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| Error::Input(format!("did.jsonl is not valid UTF-8: {e}")))?;
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            serde_json::from_str(line)
                .map_err(|e| Error::Input(format!("invalid did.jsonl entry: {e}")))
        })
        .collect()
}

/// Serialize a [`DidLog`] to `did.jsonl` bytes: one JSON object per line.
///
/// # Errors
///
/// Returns [`Error::Input`] if an entry fails to serialize.
pub fn serialize_log(log: &DidLog) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for entry in log {
        serde_json::to_writer(&mut out, entry)?;
        out.push(b'\n');
    }
    Ok(out)
}

/// Load a DID log from storage at `<base_dir>/did/<safe_domain>/<path_segments>/did.jsonl`.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if no log exists at the resolved path, or
/// propagates storage/parse failures.
pub async fn load_did_log(
    storage: &dyn StorageAdapter, domain: &str, path_segments: &[String],
) -> Result<DidLog> {
    let rel_path = log_file_path(std::path::Path::new(""), domain, path_segments)?;
    let bytes = storage
        .get_object(domain, &rel_path.to_string_lossy())
        .await?
        .ok_or_else(|| Error::NotFound(format!("no did.jsonl for domain {domain}")))?;
    parse_log(&bytes)
}

/// Persist the full `log` to `<base_dir>/did/<safe_domain>/<path_segments>/did.jsonl`.
/// The whole log is rewritten on every save: append-only in content, not in
/// I/O operation.
///
/// # Errors
///
/// Returns an error from path sanitization, serialization, or the storage
/// adapter.
pub async fn save_did_log(
    storage: &dyn StorageAdapter, domain: &str, path_segments: &[String], log: &DidLog,
) -> Result<()> {
    let rel_path = log_file_path(std::path::Path::new(""), domain, path_segments)?;
    let bytes = serialize_log(log)?;
    storage.put_object(domain, &rel_path.to_string_lossy(), &bytes).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> DidLogEntry {
        DidLogEntry {
            version_id: "1".to_string(),
            version_time: Utc::now(),
            parameters: Parameters {
                method: "did:webvh:0.5".to_string(),
                update_keys: vec!["did:key:zAbc".to_string()],
                portable: Some(false),
                deactivated: None,
            },
            state: DidDocument::minimal("did:webvh:abc:example.com"),
            proof: None,
        }
    }

    #[test]
    fn serialize_then_parse_round_trips() {
        let log = vec![sample_entry(), sample_entry()];
        let bytes = serialize_log(&log).expect("should serialize");
        assert_eq!(bytes.iter().filter(|&&b| b == b'\n').count(), 2);
        let parsed = parse_log(&bytes).expect("should parse");
        assert_eq!(parsed, log);
    }

    #[test]
    fn parse_skips_blank_lines() {
        let mut bytes = serialize_log(&[sample_entry()].to_vec()).expect("should serialize");
        bytes.extend_from_slice(b"\n\n");
        let parsed = parse_log(&bytes).expect("should parse");
        assert_eq!(parsed.len(), 1);
    }
}
