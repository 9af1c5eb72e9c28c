use thiserror::Error;

/// Errors raised while turning a photo into crops.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CropError {
    /// The source bytes are not a decodable image. Client error.
    #[error("invalid image: {0}")]
    InvalidImage(String),
    /// A crop or the framed image could not be encoded.
    #[error("failed to encode image: {0}")]
    Encode(String),
    /// Detector configuration is inconsistent.
    #[error("invalid detector config: {0}")]
    InvalidConfig(String),
    /// The detection service answered with an error or an unreadable body.
    #[error("detector failure: {0}")]
    Upstream(String),
    #[error("detector timed out: {0}")]
    Timeout(String),
}

impl CropError {
    /// True when the request itself is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, CropError::InvalidImage(_))
    }
}

impl From<image::ImageError> for CropError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Decoding(_) | image::ImageError::Unsupported(_) => {
                CropError::InvalidImage(err.to_string())
            }
            other => CropError::Encode(other.to_string()),
        }
    }
}
