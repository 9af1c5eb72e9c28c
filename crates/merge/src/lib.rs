//! DendroScan result normalizer
//!
//! Classification produces one result per vocabulary. This crate folds those
//! into the record a user sees:
//!
//! 1. resolve tree or bush from the type vocabulary,
//! 2. take the species from the matching species vocabulary only,
//! 3. merge the defect vocabularies that apply to the type (or to any type),
//!    translating labels and dropping healthy-state labels,
//! 4. clamp every confidence to `[0, 1]`.
//!
//! Translation and healthy-state tables come from configuration.

pub mod config;
pub mod error;
pub mod keys;
pub mod tables;
pub mod types;

mod normalizer;

pub use crate::config::{NormalizerConfig, DEFAULT_MAX_DEFECTS};
pub use crate::error::MergeError;
pub use crate::keys::{default_prefixes, normalize_key};
pub use crate::normalizer::Normalizer;
pub use crate::tables::{SentinelSet, SpeciesName, TranslationSource, TranslationTable};
pub use crate::types::{clamp_confidence, DefectEntry, NormalizedPrediction, PlantType};
