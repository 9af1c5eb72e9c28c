use serde::{Deserialize, Serialize};

/// Runtime configuration describing which embedder to use and how to reach it.
///
/// # Example
/// ```no_run
/// use similarity::EmbedderConfig;
///
/// let cfg = EmbedderConfig {
///     mode: "api".into(),
///     api_url: Some("http://clip.internal:8000".into()),
///     api_auth_header: Some("Bearer secret".into()),
///     ..Default::default()
/// };
/// let embedder = similarity::build_embedder(&cfg).unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbedderConfig {
    /// `"api"` (remote HTTP model server) or `"stub"` (deterministic hash vectors).
    pub mode: String,
    /// Friendly label surfaced in logs.
    pub model_name: String,
    /// Base URL of the embedding service when [`mode`](Self::mode) is `"api"`.
    /// Text prompts are posted to `{api_url}/encode/text`, images to `{api_url}/encode/image`.
    pub api_url: Option<String>,
    /// Authorization header (e.g. `"Bearer xxx"`).
    pub api_auth_header: Option<String>,
    /// Overall request timeout in seconds.
    pub timeout_secs: u64,
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Vector dimension produced by the stub embedder.
    pub stub_dim: usize,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            mode: "stub".into(),
            model_name: "mobileclip_s1".into(),
            api_url: None,
            api_auth_header: None,
            timeout_secs: 30,
            connect_timeout_secs: 5,
            stub_dim: 512,
        }
    }
}
