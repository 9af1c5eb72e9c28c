use async_trait::async_trait;
use fxhash::hash64;

use crate::normalize::l2_normalize_in_place;
use crate::{Embedder, EmbedderConfig, SimilarityError};

/// Deterministic embedder used for local runs and tests.
///
/// Generates sinusoid values derived from a hash of the input so identical inputs
/// always map to identical vectors. Carries no visual meaning.
#[derive(Debug, Clone)]
pub struct StubEmbedder {
    model_name: String,
    dim: usize,
}

impl StubEmbedder {
    pub fn new(cfg: &EmbedderConfig) -> Self {
        Self {
            model_name: cfg.model_name.clone(),
            dim: cfg.stub_dim.max(1),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    fn vector_for(&self, bytes: &[u8]) -> Vec<f32> {
        let h = hash64(bytes);
        let mut v: Vec<f32> = (0..self.dim)
            .map(|idx| {
                let shifted = h.rotate_left((idx % 64) as u32);
                ((shifted % 10_007) as f32 * 0.013 + idx as f32 * 0.7).sin()
            })
            .collect();
        l2_normalize_in_place(&mut v);
        v
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn encode_image(&self, image: &[u8]) -> Result<Vec<f32>, SimilarityError> {
        if image.is_empty() {
            return Err(SimilarityError::InvalidInput("image bytes are empty".into()));
        }
        Ok(self.vector_for(image))
    }

    async fn encode_text(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, SimilarityError> {
        Ok(texts.iter().map(|t| self.vector_for(t.as_bytes())).collect())
    }
}
