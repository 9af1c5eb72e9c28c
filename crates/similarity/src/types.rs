use serde::{Deserialize, Serialize};

use crate::normalize::to_unit;
use crate::SimilarityError;

/// How many labels of a vocabulary may be true at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VocabularyKind {
    /// Exactly one label is true (species, tree/bush type).
    Exclusive,
    /// Zero or more labels may be true (defects).
    MultiLabel,
}

/// A named, ordered set of text prompts scored together via softmax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    name: String,
    kind: VocabularyKind,
    labels: Vec<String>,
}

impl Vocabulary {
    pub fn new(
        name: impl Into<String>,
        kind: VocabularyKind,
        labels: Vec<String>,
    ) -> Result<Self, SimilarityError> {
        let name = name.into();
        if labels.is_empty() {
            return Err(SimilarityError::EmptyVocabulary(name));
        }
        Ok(Self { name, kind, labels })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> VocabularyKind {
        self.kind
    }

    /// Labels in declaration order. Declaration order is the tie-break order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// A vocabulary's labels paired 1:1 with unit-length prompt vectors.
///
/// Built once when the prompt bank is initialized and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptEmbedding {
    vocabulary: String,
    labels: Vec<String>,
    vectors: Vec<Vec<f32>>,
}

impl PromptEmbedding {
    /// Pairs `labels` with `vectors`, L2-normalizing every vector.
    pub fn new(
        vocabulary: impl Into<String>,
        labels: Vec<String>,
        vectors: Vec<Vec<f32>>,
    ) -> Result<Self, SimilarityError> {
        let vocabulary = vocabulary.into();
        if labels.is_empty() {
            return Err(SimilarityError::EmptyVocabulary(vocabulary));
        }
        if labels.len() != vectors.len() {
            return Err(SimilarityError::InvalidInput(format!(
                "vocabulary `{vocabulary}` has {} labels but {} prompt vectors",
                labels.len(),
                vectors.len()
            )));
        }

        let dim = vectors[0].len();
        let mut unit_vectors = Vec::with_capacity(vectors.len());
        for (label, vector) in labels.iter().zip(&vectors) {
            if vector.len() != dim {
                return Err(SimilarityError::PromptDimensionMismatch {
                    vocabulary,
                    label: label.clone(),
                    expected: dim,
                    found: vector.len(),
                });
            }
            unit_vectors.push(to_unit(vector, &format!("prompt vector for `{label}`"))?);
        }

        Ok(Self {
            vocabulary,
            labels,
            vectors: unit_vectors,
        })
    }

    pub fn vocabulary(&self) -> &str {
        &self.vocabulary
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    /// Embedding dimension shared by every prompt vector.
    pub fn dim(&self) -> usize {
        self.vectors.first().map_or(0, Vec::len)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Probability assigned to one label of one vocabulary for one crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScore {
    pub label: String,
    pub score: f32,
}

impl SimilarityScore {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}
