use std::sync::Arc;

use async_trait::async_trait;

use crate::api::ApiEmbedder;
use crate::stub::StubEmbedder;
use crate::{EmbedderConfig, SimilarityError};

/// Maps images and text prompts into one shared embedding space.
///
/// Implementations may return vectors of any scale; the similarity engine
/// normalizes both sides before comparing them.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Name surfaced in logs and readiness probes.
    fn model_name(&self) -> &str;

    /// Embeds one encoded image (JPEG/PNG bytes).
    async fn encode_image(&self, image: &[u8]) -> Result<Vec<f32>, SimilarityError>;

    /// Embeds a batch of text prompts; the output follows the input order.
    async fn encode_text(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, SimilarityError>;
}

/// Builds the embedder selected by `cfg.mode`.
pub fn build_embedder(cfg: &EmbedderConfig) -> Result<Arc<dyn Embedder>, SimilarityError> {
    match cfg.mode.as_str() {
        "stub" | "fast" => Ok(Arc::new(StubEmbedder::new(cfg))),
        "api" => Ok(Arc::new(ApiEmbedder::new(cfg)?)),
        other => Err(SimilarityError::InvalidConfig(format!(
            "unknown embedder mode `{other}` (expected `api` or `stub`)"
        ))),
    }
}
