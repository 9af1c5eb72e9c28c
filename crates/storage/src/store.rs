use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::warn;

use crate::{HttpObjectStore, MemoryObjectStore, StorageConfig, StorageError};

/// Where crops, framed images and source photos live.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn name(&self) -> &str;

    /// Stores `bytes` as `{request_id}/{name}` and returns its public URL.
    async fn upload(
        &self,
        bytes: Bytes,
        name: &str,
        content_type: &str,
        request_id: &str,
    ) -> Result<String, StorageError>;

    async fn download(&self, url: &str) -> Result<Bytes, StorageError>;
}

pub fn build_store(cfg: &StorageConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
    match cfg.mode.as_str() {
        "memory" => Ok(Arc::new(MemoryObjectStore::new(
            cfg.public_base_url.as_deref().unwrap_or("memory://dendroscan"),
        ))),
        "http" => Ok(Arc::new(HttpObjectStore::new(cfg)?)),
        other => Err(StorageError::InvalidConfig(format!(
            "unknown storage mode `{other}` (expected `http` or `memory`)"
        ))),
    }
}

/// Uploads and returns the URL, or `placeholder` when the upload fails.
///
/// Upload failures never fail a prediction. No retry.
pub async fn upload_or_placeholder(
    store: &dyn ObjectStore,
    bytes: Bytes,
    name: &str,
    content_type: &str,
    request_id: &str,
    placeholder: &str,
) -> String {
    match store.upload(bytes, name, content_type, request_id).await {
        Ok(url) => url,
        Err(err) => {
            warn!(
                store = store.name(),
                object = name,
                request_id,
                error = %err,
                "upload failed, using placeholder URL"
            );
            placeholder.to_string()
        }
    }
}
