//! Workspace umbrella crate for DendroScan, plant species and defect
//! classification.
//!
//! This crate stitches the stage crates into one [`Pipeline`]:
//!
//! 1. decode the photo and ask the detector for plant boxes,
//! 2. cut one crop per box and draw the boxes onto a framed copy,
//! 3. score every crop against each vocabulary and select labels,
//! 4. merge the per-vocabulary answers into one localized record per plant,
//! 5. upload crops and the framed photo, degrading to a placeholder URL.
//!
//! ```no_run
//! use dendroscan::{Pipeline, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::builtin()?;
//!     let pipeline = Pipeline::from_config(&config).await?;
//!     let photo = std::fs::read("garden.jpg")?;
//!     let response = pipeline.predict(&photo, "req-1").await?;
//!     println!("{}", serde_json::to_string_pretty(&response)?);
//!     Ok(())
//! }
//! ```

pub mod config;

mod error;
mod pipeline;
mod response;

pub use crate::config::{
    ClassifierYamlConfig, ConfigLoadError, PipelineConfig, PolicyName, VocabularyYamlConfig,
    BUILTIN_CONFIG,
};
pub use crate::error::PipelineError;
pub use crate::pipeline::{Pipeline, PipelineOptions, FRAMED_IMAGE_NAME};
pub use crate::response::{PipelineInfo, Plant, PredictResponse};

pub use classify::{
    ClassificationResult, CropClassification, CropClassifier, EmbeddingClassifier, LabelScore,
    SelectionPolicy, StubClassifier, VocabularySpec,
};
pub use crops::{Crop, CropFormat, Detection, Detector, StaticDetector};
pub use merge::{
    DefectEntry, NormalizedPrediction, Normalizer, NormalizerConfig, PlantType, SentinelSet,
    TranslationSource,
};
pub use similarity::{Embedder, EmbedderConfig, PromptBank, Vocabulary, VocabularyKind};
pub use storage::{MemoryObjectStore, ObjectStore, StorageConfig, StorageError};
