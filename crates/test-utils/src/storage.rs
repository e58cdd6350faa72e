//! In-memory [`StorageAdapter`] fixture.

use dashmap::DashMap;
use originals::provider::StorageAdapter;
use originals::{Error, Result};

/// An in-memory object store keyed by path, standing in for the production
/// S3/GCS-backed adapter in tests. `put`/`put_object` write the same
/// underlying map under different key shapes so a test can assert on
/// whichever addressing scheme it used to write.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    objects: DashMap<String, (Vec<u8>, String)>,
}

impl MemoryStorage {
    /// Construct an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw bytes stored at `key`, if any, ignoring content type.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.get(key).map(|entry| entry.0.clone())
    }

    /// Whether anything has been written under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.objects.contains_key(key)
    }

    /// The number of objects currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait::async_trait]
impl StorageAdapter for MemoryStorage {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()> {
        self.objects.insert(key.to_string(), (bytes.to_vec(), content_type.to_string()));
        Ok(())
    }

    async fn put_object(&self, domain: &str, rel_path: &str, bytes: &[u8]) -> Result<()> {
        let key = format!("{domain}/{rel_path}");
        self.objects.insert(key, (bytes.to_vec(), "application/octet-stream".to_string()));
        Ok(())
    }

    async fn get_object(&self, domain: &str, rel_path: &str) -> Result<Option<Vec<u8>>> {
        let key = format!("{domain}/{rel_path}");
        Ok(self.objects.get(&key).map(|entry| entry.0.clone()))
    }
}

/// A [`StorageAdapter`] that always fails, for exercising the
/// best-effort-persistence paths that must tolerate a storage outage
/// without losing in-memory state.
#[derive(Clone, Default)]
pub struct FailingStorage;

#[async_trait::async_trait]
impl StorageAdapter for FailingStorage {
    async fn put(&self, _key: &str, _bytes: &[u8], _content_type: &str) -> Result<()> {
        Err(Error::External("storage unavailable".into()))
    }

    async fn put_object(&self, _domain: &str, _rel_path: &str, _bytes: &[u8]) -> Result<()> {
        Err(Error::External("storage unavailable".into()))
    }

    async fn get_object(&self, _domain: &str, _rel_path: &str) -> Result<Option<Vec<u8>>> {
        Err(Error::External("storage unavailable".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let storage = MemoryStorage::new();
        storage.put("a/b.json", b"hello", "application/json").await.expect("should put");
        assert_eq!(storage.get("a/b.json"), Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn put_object_then_get_object_round_trips() {
        let storage = MemoryStorage::new();
        storage.put_object("example.com", "did.jsonl", b"log-line").await.expect("should put");
        let fetched = storage.get_object("example.com", "did.jsonl").await.expect("should get");
        assert_eq!(fetched, Some(b"log-line".to_vec()));
    }

    #[tokio::test]
    async fn failing_storage_errors_on_every_call() {
        let storage = FailingStorage;
        assert!(storage.put("k", b"v", "text/plain").await.is_err());
        assert!(storage.get_object("d", "r").await.is_err());
    }
}
