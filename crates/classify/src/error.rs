use similarity::SimilarityError;
use thiserror::Error;

/// Errors surfaced while classifying a crop.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClassifyError {
    /// A vocabulary without labels reached the classifier. Misconfiguration.
    #[error("vocabulary `{0}` has no labels")]
    EmptyVocabulary(String),
    /// The classifier was asked about a vocabulary it was not built with.
    #[error("unknown vocabulary `{0}`")]
    UnknownVocabulary(String),
    /// A selection policy carries out-of-range parameters.
    #[error("invalid selection policy for `{vocabulary}`: {reason}")]
    InvalidPolicy { vocabulary: String, reason: String },
    /// Scoring failed (bad image vector, embedding service down, ...).
    #[error(transparent)]
    Similarity(#[from] SimilarityError),
}

impl ClassifyError {
    /// True when the embedding service, not the request, is at fault.
    pub fn is_upstream(&self) -> bool {
        matches!(self, ClassifyError::Similarity(err) if err.is_upstream())
    }
}
