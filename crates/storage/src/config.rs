use serde::{Deserialize, Serialize};

/// URL handed out when an upload fails.
pub const DEFAULT_PLACEHOLDER_URL: &str = "https://placeholder.invalid/unavailable.jpg";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// `http` or `memory`.
    pub mode: String,
    /// Base URL uploads are `PUT` to.
    pub upload_url: Option<String>,
    /// Base URL uploaded objects are readable from.
    pub public_base_url: Option<String>,
    /// Sent as `Authorization` on uploads.
    pub auth_header: Option<String>,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
    pub placeholder_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            mode: "memory".into(),
            upload_url: None,
            public_base_url: None,
            auth_header: None,
            connect_timeout_secs: 5,
            timeout_secs: 15,
            placeholder_url: DEFAULT_PLACEHOLDER_URL.into(),
        }
    }
}
