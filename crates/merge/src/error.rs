use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MergeError {
    #[error("invalid normalizer config: {0}")]
    InvalidConfig(String),
}
