use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::engine::similarity;
use crate::{Embedder, PromptEmbedding, SimilarityError, SimilarityScore, Vocabulary};

/// Prompt embeddings for every configured vocabulary, computed once.
///
/// The bank is immutable after construction; share it behind an `Arc` and read
/// it from any number of concurrent classifications without locking.
#[derive(Debug, Clone)]
pub struct PromptBank {
    entries: Vec<Arc<PromptEmbedding>>,
    by_name: HashMap<String, usize>,
}

impl PromptBank {
    /// Encodes every vocabulary's labels with `embedder`.
    ///
    /// Fails on the first empty vocabulary, duplicate vocabulary name, or embedder error.
    pub async fn build(
        embedder: &dyn Embedder,
        vocabularies: &[Vocabulary],
    ) -> Result<Self, SimilarityError> {
        let mut embeddings = Vec::with_capacity(vocabularies.len());
        for vocab in vocabularies {
            if vocab.is_empty() {
                return Err(SimilarityError::EmptyVocabulary(vocab.name().to_string()));
            }
            let vectors = embedder.encode_text(vocab.labels()).await?;
            let prompts = PromptEmbedding::new(vocab.name(), vocab.labels().to_vec(), vectors)?;
            info!(
                vocabulary = vocab.name(),
                labels = prompts.len(),
                dim = prompts.dim(),
                model = embedder.model_name(),
                "prompt embeddings ready"
            );
            embeddings.push(prompts);
        }
        Self::from_embeddings(embeddings)
    }

    /// Assembles a bank from precomputed prompt embeddings.
    pub fn from_embeddings(embeddings: Vec<PromptEmbedding>) -> Result<Self, SimilarityError> {
        let mut by_name = HashMap::with_capacity(embeddings.len());
        let mut entries = Vec::with_capacity(embeddings.len());
        for (idx, prompts) in embeddings.into_iter().enumerate() {
            if by_name.insert(prompts.vocabulary().to_string(), idx).is_some() {
                return Err(SimilarityError::InvalidConfig(format!(
                    "vocabulary `{}` declared twice",
                    prompts.vocabulary()
                )));
            }
            entries.push(Arc::new(prompts));
        }
        Ok(Self { entries, by_name })
    }

    pub fn get(&self, vocabulary: &str) -> Option<&Arc<PromptEmbedding>> {
        self.by_name.get(vocabulary).map(|&idx| &self.entries[idx])
    }

    /// Vocabulary names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.vocabulary())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Scores `image_vector` against one vocabulary of the bank.
    pub fn score(
        &self,
        vocabulary: &str,
        image_vector: &[f32],
        temperature: f32,
    ) -> Result<Vec<SimilarityScore>, SimilarityError> {
        let prompts = self.get(vocabulary).ok_or_else(|| {
            SimilarityError::InvalidConfig(format!("vocabulary `{vocabulary}` is not in the prompt bank"))
        })?;
        similarity(image_vector, prompts, temperature)
    }
}
