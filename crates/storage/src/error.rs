use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StorageError {
    /// The URL is not one this service can fetch from.
    #[error("invalid object URL: {0}")]
    InvalidUrl(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("access to object denied: {0}")]
    Forbidden(String),
    #[error("object store timed out: {0}")]
    Timeout(String),
    #[error("object store HTTP error {status}: {message}")]
    Http { status: u16, message: String },
    #[error("object store I/O failure: {0}")]
    Io(String),
    #[error("invalid storage config: {0}")]
    InvalidConfig(String),
}

impl StorageError {
    /// True when the caller sent something unusable (bad URL, missing object).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StorageError::InvalidUrl(_) | StorageError::NotFound(_) | StorageError::Forbidden(_)
        )
    }

    pub(crate) fn from_status(status: u16, message: String) -> Self {
        match status {
            404 => StorageError::NotFound(message),
            401 | 403 => StorageError::Forbidden(message),
            408 | 504 => StorageError::Timeout(message),
            _ => StorageError::Http { status, message },
        }
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StorageError::Timeout(err.to_string())
        } else if let Some(status) = err.status() {
            StorageError::from_status(status.as_u16(), err.to_string())
        } else {
            StorageError::Io(err.to_string())
        }
    }
}
