use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use crate::{ObjectStore, StorageError};

/// Process-local store keyed by URL. For tests and offline runs.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    base_url: String,
    objects: DashMap<String, Bytes>,
}

impl MemoryObjectStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            objects: DashMap::new(),
        }
    }

    /// Seeds an object readable through [`ObjectStore::download`].
    pub fn insert(&self, url: impl Into<String>, bytes: Bytes) {
        self.objects.insert(url.into(), bytes);
    }

    pub fn get(&self, url: &str) -> Option<Bytes> {
        self.objects.get(url).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn upload(
        &self,
        bytes: Bytes,
        name: &str,
        _content_type: &str,
        request_id: &str,
    ) -> Result<String, StorageError> {
        let url = format!("{}/{request_id}/{name}", self.base_url);
        self.objects.insert(url.clone(), bytes);
        Ok(url)
    }

    async fn download(&self, url: &str) -> Result<Bytes, StorageError> {
        self.get(url)
            .ok_or_else(|| StorageError::NotFound(url.to_string()))
    }
}
