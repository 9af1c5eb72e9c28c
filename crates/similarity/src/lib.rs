//! DendroScan embedding similarity
//!
//! This crate turns an image vector and a set of text-prompt vectors into a
//! probability distribution over the prompts of one vocabulary. It is the
//! numeric heart of the classifier: every vocabulary is scored the same way so
//! confidences stay comparable across vocabularies.
//!
//! The algorithm is CLIP-style zero-shot scoring:
//!
//! 1. L2-normalize the image vector and every prompt vector.
//! 2. Take the dot products (cosine similarities).
//! 3. Multiply by a temperature (100.0 by default).
//! 4. Softmax across the vocabulary.
//!
//! Prompt vectors are computed once per process by [`PromptBank::build`] and
//! shared read-only afterwards.
//!
//! We ship two embedders behind the [`Embedder`] trait:
//!
//! - **API mode** - Call a remote model server over HTTP.
//! - **Stub mode** - Deterministic hash vectors. For tests and local runs.
//!
//! ## Quick example
//!
//! ```no_run
//! use similarity::{build_embedder, EmbedderConfig, PromptBank, Vocabulary, VocabularyKind};
//!
//! #[tokio::main]
//! async fn main() {
//!     let embedder = build_embedder(&EmbedderConfig::default()).unwrap();
//!     let vocab = Vocabulary::new(
//!         "tree or bush",
//!         VocabularyKind::Exclusive,
//!         vec!["A photo of a tree".into(), "A photo of a bush".into()],
//!     )
//!     .unwrap();
//!     let bank = PromptBank::build(embedder.as_ref(), &[vocab]).await.unwrap();
//!     let image = embedder.encode_image(b"jpeg bytes").await.unwrap();
//!     let scores = bank.score("tree or bush", &image, 100.0).unwrap();
//!     println!("{scores:?}");
//! }
//! ```

pub mod config;
pub mod error;
pub mod types;

mod api;
mod bank;
mod embedder;
mod engine;
mod normalize;
mod stub;

pub use crate::api::ApiEmbedder;
pub use crate::bank::PromptBank;
pub use crate::config::EmbedderConfig;
pub use crate::embedder::{build_embedder, Embedder};
pub use crate::engine::{similarity, DEFAULT_TEMPERATURE};
pub use crate::error::SimilarityError;
pub use crate::normalize::l2_normalize_in_place;
pub use crate::stub::StubEmbedder;
pub use crate::types::{PromptEmbedding, SimilarityScore, Vocabulary, VocabularyKind};
