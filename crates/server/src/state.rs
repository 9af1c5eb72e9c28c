use crate::config::ServerConfig;
use crate::error::ServerResult;
use dendroscan::{Pipeline, PipelineConfig};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Prediction pipeline (shared across requests, read-only)
    pub pipeline: Arc<Pipeline>,
}

impl ServerState {
    /// Create new server state, building the pipeline from
    /// `pipeline.config_path` or the built-in configuration
    pub async fn new(config: ServerConfig) -> ServerResult<Self> {
        let pipeline_config = match &config.pipeline.config_path {
            Some(path) => PipelineConfig::from_file(path)?,
            None => PipelineConfig::builtin()?,
        };
        let pipeline = Pipeline::from_config(&pipeline_config).await?;
        Ok(Self::with_pipeline(config, pipeline))
    }

    pub fn with_pipeline(config: ServerConfig, pipeline: Pipeline) -> Self {
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
        }
    }

    /// Check the `ml-token` header value
    pub fn is_valid_token(&self, token: Option<&str>) -> bool {
        self.config.accepts_token(token)
    }
}
