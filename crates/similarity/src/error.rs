use thiserror::Error;

/// Errors surfaced by the similarity engine and the embedders behind it.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimilarityError {
    /// The image or text vector is absent, empty, non-finite, or has zero norm.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A vocabulary was declared without any label.
    #[error("vocabulary `{0}` has no labels")]
    EmptyVocabulary(String),
    /// Image and prompt vectors do not live in the same space.
    #[error("dimension mismatch: image vector has {image} values, prompt `{label}` has {prompt}")]
    DimensionMismatch {
        label: String,
        image: usize,
        prompt: usize,
    },
    /// Prompt vectors of one vocabulary disagree on their length.
    #[error("vocabulary `{vocabulary}`: prompt `{label}` has {found} values, first prompt has {expected}")]
    PromptDimensionMismatch {
        vocabulary: String,
        label: String,
        expected: usize,
        found: usize,
    },
    /// Configuration is inconsistent (e.g. `api` mode without an URL).
    #[error("invalid embedder config: {0}")]
    InvalidConfig(String),
    /// The embedding service answered with an error or an unreadable body.
    #[error("embedding service failure: {0}")]
    Upstream(String),
    /// The embedding service did not answer in time.
    #[error("embedding service timed out: {0}")]
    Timeout(String),
}

impl SimilarityError {
    /// True for failures caused by the remote collaborator rather than the input.
    pub fn is_upstream(&self) -> bool {
        matches!(self, SimilarityError::Upstream(_) | SimilarityError::Timeout(_))
    }
}
