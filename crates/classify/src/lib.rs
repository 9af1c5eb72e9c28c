//! DendroScan vocabulary classifier
//!
//! Turns per-vocabulary similarity distributions into selections. Two policies
//! exist and every vocabulary picks one in configuration:
//!
//! - **Best-of**: argmax, ties go to the first declared label.
//! - **Threshold**: every non-sentinel label at or above the threshold,
//!   highest first, capped at `max_results`, with a single-label fallback when
//!   nothing clears the bar.
//!
//! The result shape is decided here: `None`, `Single` or `Multi`, never a
//! one-element list.
//!
//! [`CropClassifier`] is the seam the pipeline talks to. [`EmbeddingClassifier`]
//! is the real one; [`StubClassifier`] returns fixed answers for local runs.

pub mod error;
pub mod policy;
pub mod result;

mod classifier;
mod stub;

pub use crate::classifier::{CropClassifier, EmbeddingClassifier, VocabularySpec};
pub use crate::error::ClassifyError;
pub use crate::policy::{classify, SelectionPolicy, DEFAULT_MAX_RESULTS};
pub use crate::result::{ClassificationResult, CropClassification, LabelScore, VocabularyResult};
pub use crate::stub::StubClassifier;
