use classify::ClassifyError;
use crops::CropError;
use merge::MergeError;
use similarity::SimilarityError;
use storage::StorageError;
use thiserror::Error;

use crate::ConfigLoadError;

/// Errors that stop a whole prediction, or stop the pipeline from being built.
///
/// Per-crop failures never show up here: they are logged and the crop is
/// skipped. A photo with no detections is a valid empty answer, not an error.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The photo could not be decoded. Client error.
    #[error("could not process image: {0}")]
    InvalidImage(String),

    #[error("detection failed: {0}")]
    Detection(CropError),

    /// Cropping or encoding failed after a successful decode.
    #[error("crop extraction failed: {0}")]
    Extraction(CropError),

    /// The source photo could not be fetched.
    #[error("failed to fetch source image: {0}")]
    Source(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigLoadError),

    /// An adapter could not be built from configuration.
    #[error("pipeline setup failed: {0}")]
    Setup(String),
}

impl PipelineError {
    /// True when the caller sent something unusable.
    pub fn is_client_error(&self) -> bool {
        match self {
            PipelineError::InvalidImage(_) => true,
            PipelineError::Source(err) => err.is_client_error(),
            _ => false,
        }
    }

    /// True when a collaborator (detector, object store) failed or timed out.
    pub fn is_upstream(&self) -> bool {
        match self {
            PipelineError::Detection(err) => {
                matches!(err, CropError::Upstream(_) | CropError::Timeout(_))
            }
            PipelineError::Source(err) => !err.is_client_error(),
            _ => false,
        }
    }

    pub(crate) fn from_decode(err: CropError) -> Self {
        match err {
            CropError::InvalidImage(message) => PipelineError::InvalidImage(message),
            other => PipelineError::Extraction(other),
        }
    }
}

impl From<ClassifyError> for PipelineError {
    fn from(err: ClassifyError) -> Self {
        PipelineError::Setup(err.to_string())
    }
}

impl From<SimilarityError> for PipelineError {
    fn from(err: SimilarityError) -> Self {
        PipelineError::Setup(err.to_string())
    }
}

impl From<MergeError> for PipelineError {
    fn from(err: MergeError) -> Self {
        PipelineError::Setup(err.to_string())
    }
}
