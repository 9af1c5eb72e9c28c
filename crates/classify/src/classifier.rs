use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use similarity::{Embedder, PromptBank, Vocabulary, DEFAULT_TEMPERATURE};
use tracing::debug;

use crate::{classify, ClassifyError, CropClassification, SelectionPolicy};

/// One vocabulary and the policy that selects from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularySpec {
    pub vocabulary: Vocabulary,
    pub policy: SelectionPolicy,
}

impl VocabularySpec {
    pub fn new(vocabulary: Vocabulary, policy: SelectionPolicy) -> Self {
        Self { vocabulary, policy }
    }

    pub fn name(&self) -> &str {
        self.vocabulary.name()
    }
}

/// Classifies one crop against every configured vocabulary.
///
/// Implementations are shared across concurrent crops and must not hold
/// per-request state.
#[async_trait]
pub trait CropClassifier: Send + Sync {
    /// Short identifier for logs and readiness reports.
    fn name(&self) -> &str;

    /// Vocabulary names in the order results are produced.
    fn vocabularies(&self) -> Vec<String>;

    async fn classify_crop(&self, image: &[u8]) -> Result<CropClassification, ClassifyError>;
}

/// Zero-shot classifier: one image embedding, scored against each vocabulary's
/// prompt embeddings, selected by that vocabulary's policy.
pub struct EmbeddingClassifier {
    embedder: Arc<dyn Embedder>,
    bank: Arc<PromptBank>,
    specs: Vec<VocabularySpec>,
    temperature: f32,
}

impl std::fmt::Debug for EmbeddingClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingClassifier")
            .field("model", &self.embedder.model_name())
            .field("vocabularies", &self.specs.len())
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl EmbeddingClassifier {
    /// Validates every policy and embeds every prompt once.
    pub async fn build(
        embedder: Arc<dyn Embedder>,
        specs: Vec<VocabularySpec>,
        temperature: f32,
    ) -> Result<Self, ClassifyError> {
        for spec in &specs {
            if spec.vocabulary.is_empty() {
                return Err(ClassifyError::EmptyVocabulary(spec.name().to_string()));
            }
            spec.policy.validate(spec.name())?;
        }
        let vocabularies: Vec<Vocabulary> = specs.iter().map(|s| s.vocabulary.clone()).collect();
        let bank = PromptBank::build(embedder.as_ref(), &vocabularies).await?;
        Ok(Self::with_bank(embedder, Arc::new(bank), specs, temperature))
    }

    /// Uses an already-built prompt bank. Every spec must be present in it.
    pub fn with_bank(
        embedder: Arc<dyn Embedder>,
        bank: Arc<PromptBank>,
        specs: Vec<VocabularySpec>,
        temperature: f32,
    ) -> Self {
        Self {
            embedder,
            bank,
            specs,
            temperature,
        }
    }

    pub fn with_default_temperature(
        embedder: Arc<dyn Embedder>,
        bank: Arc<PromptBank>,
        specs: Vec<VocabularySpec>,
    ) -> Self {
        Self::with_bank(embedder, bank, specs, DEFAULT_TEMPERATURE)
    }

    pub fn bank(&self) -> &Arc<PromptBank> {
        &self.bank
    }
}

#[async_trait]
impl CropClassifier for EmbeddingClassifier {
    fn name(&self) -> &str {
        self.embedder.model_name()
    }

    fn vocabularies(&self) -> Vec<String> {
        self.specs.iter().map(|s| s.name().to_string()).collect()
    }

    async fn classify_crop(&self, image: &[u8]) -> Result<CropClassification, ClassifyError> {
        let image_vector = self.embedder.encode_image(image).await?;

        let mut out = CropClassification::default();
        for spec in &self.specs {
            if self.bank.get(spec.name()).is_none() {
                return Err(ClassifyError::UnknownVocabulary(spec.name().to_string()));
            }
            let scores = self.bank.score(spec.name(), &image_vector, self.temperature)?;
            let result = classify(spec.name(), &scores, &spec.policy)?;
            out.push(spec.name(), result);
        }

        debug!(
            model = self.embedder.model_name(),
            vocabularies = out.results.len(),
            "crop classified"
        );
        Ok(out)
    }
}
