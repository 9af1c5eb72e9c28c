use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use crate::{ObjectStore, StorageConfig, StorageError};

/// Object store spoken to over plain HTTP: `PUT` to upload, `GET` to download.
///
/// Works with any bucket that accepts pre-authorized PUTs (a static bearer
/// token or a signing proxy in front of S3).
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    client: reqwest::Client,
    upload_url: Option<String>,
    public_base_url: Option<String>,
    auth_header: Option<String>,
}

impl HttpObjectStore {
    pub fn new(cfg: &StorageConfig) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| StorageError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        let trim = |s: &String| s.trim_end_matches('/').to_string();
        Ok(Self {
            client,
            upload_url: cfg.upload_url.as_ref().map(trim),
            public_base_url: cfg.public_base_url.as_ref().map(trim),
            auth_header: cfg.auth_header.clone(),
        })
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn upload(
        &self,
        bytes: Bytes,
        name: &str,
        content_type: &str,
        request_id: &str,
    ) -> Result<String, StorageError> {
        let base = self
            .upload_url
            .as_deref()
            .ok_or_else(|| StorageError::InvalidConfig("upload_url is not configured".into()))?;
        let key = format!("{request_id}/{name}");
        let target = format!("{base}/{key}");

        let mut request = self
            .client
            .put(&target)
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        if let Some(header) = self.auth_header.as_deref() {
            request = request.header(AUTHORIZATION, header);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::from_status(status.as_u16(), body));
        }

        let public = self.public_base_url.as_deref().unwrap_or(base);
        debug!(object = %key, "uploaded");
        Ok(format!("{public}/{key}"))
    }

    async fn download(&self, url: &str) -> Result<Bytes, StorageError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| StorageError::InvalidUrl(format!("{url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(StorageError::InvalidUrl(url.to_string()));
        }
        let response = self.client.get(parsed).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::from_status(status.as_u16(), url.to_string()));
        }
        Ok(response.bytes().await?)
    }
}
