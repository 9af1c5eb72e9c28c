//! Server settings
//!
//! Read once at startup from `.env`, an optional `server.{toml,yaml,json}`
//! file and `DENDRO_SERVER__<SECTION>__<KEY>` environment variables, e.g.
//! `DENDRO_SERVER__AUTH__ML_TOKEN=...` or `DENDRO_SERVER__HTTP__PORT=9000`.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ServerError;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub http: HttpSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// `tracing` filter directive, e.g. `info` or `server=debug,tower_http=info`
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Listener and request limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Whole-request budget, download and uploads included
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthSettings {
    /// Shared secret expected in the `ml-token` header. Unset disables the check.
    #[serde(default)]
    pub ml_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PipelineSettings {
    /// Pipeline YAML; the built-in configuration when unset
    #[serde(default)]
    pub config_path: Option<PathBuf>,

    /// Public base URL that `/scan` rewrites source photo URLs onto
    #[serde(default)]
    pub public_bucket_url: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            enable_cors: true,
        }
    }
}

impl ServerConfig {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let mut config: ServerConfig = config::Config::builder()
            .add_source(config::File::with_name("server").required(false))
            .add_source(config::Environment::with_prefix("DENDRO_SERVER").separator("__"))
            .build()?
            .try_deserialize()?;

        // An empty env var reads as "no token", not as a token that matches empty headers.
        if config.auth.ml_token.as_deref().is_some_and(|t| t.trim().is_empty()) {
            config.auth.ml_token = None;
        }
        config.validate()?;

        if config.auth.ml_token.is_none() {
            tracing::warn!("No ml-token configured, prediction endpoints are open");
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ServerError> {
        if self.http.timeout_secs == 0 {
            return Err(ServerError::Config("http.timeout_secs must be > 0".into()));
        }
        if self.http.max_body_size_mb == 0 {
            return Err(ServerError::Config("http.max_body_size_mb must be > 0".into()));
        }
        if let Some(base) = &self.pipeline.public_bucket_url {
            if base.trim().is_empty() {
                return Err(ServerError::Config(
                    "pipeline.public_bucket_url must not be empty".into(),
                ));
            }
        }
        self.socket_addr().map(|_| ())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(format!("{}:{}", self.http.bind_addr, self.http.port).parse()?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    pub fn max_body_size(&self) -> usize {
        self.http.max_body_size_mb * 1024 * 1024
    }

    /// Whether `token` opens the protected routes.
    pub fn accepts_token(&self, token: Option<&str>) -> bool {
        match &self.auth.ml_token {
            None => true,
            Some(expected) => token == Some(expected.as_str()),
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_body_size_mb() -> usize {
    20
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_open_and_valid() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.http.port, 8080);
        assert_eq!(cfg.timeout(), Duration::from_secs(60));
        assert_eq!(cfg.max_body_size(), 20 * 1024 * 1024);
        assert!(cfg.http.enable_cors);
        assert!(cfg.auth.ml_token.is_none());
        assert!(cfg.pipeline.config_path.is_none());
        assert_eq!(cfg.log_level, "info");
        cfg.validate().unwrap();
    }

    #[test]
    fn sections_deserialize_with_partial_input() {
        let cfg: ServerConfig = serde_json::from_value(serde_json::json!({
            "http": { "port": 9000 },
            "auth": { "ml_token": "s3cret" },
        }))
        .unwrap();
        assert_eq!(cfg.http.port, 9000);
        assert_eq!(cfg.http.timeout_secs, 60);
        assert_eq!(cfg.auth.ml_token.as_deref(), Some("s3cret"));
        assert!(cfg.pipeline.public_bucket_url.is_none());
    }

    #[test]
    fn rejects_zero_limits_and_bad_address() {
        let mut cfg = ServerConfig::default();
        cfg.http.timeout_secs = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = ServerConfig::default();
        cfg.http.max_body_size_mb = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = ServerConfig::default();
        cfg.http.bind_addr = "not an address".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn token_check() {
        let open = ServerConfig::default();
        assert!(open.accepts_token(None));

        let mut locked = ServerConfig::default();
        locked.auth.ml_token = Some("s3cret".into());
        assert!(locked.accepts_token(Some("s3cret")));
        assert!(!locked.accepts_token(Some("guess")));
        assert!(!locked.accepts_token(None));
    }
}
