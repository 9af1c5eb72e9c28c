#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dendroscan::{
    CropClassification, CropClassifier, Detection, Embedder, MemoryObjectStore, ObjectStore,
    Pipeline, PipelineConfig, StorageError,
};
use similarity::SimilarityError;

pub const PLACEHOLDER: &str = "https://placeholder.invalid/unavailable.jpg";

/// A PNG photo with a colour gradient, so crops differ from each other.
pub fn photo(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 128])
    });
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

pub fn detection(id: u32, bbox: [f32; 4]) -> Detection {
    Detection::new(id, "plant", bbox)
}

pub fn builtin_with(detections: Vec<Detection>) -> PipelineConfig {
    let mut config = PipelineConfig::builtin().unwrap();
    config.embedder.stub_dim = 64;
    config.detector.detections = detections;
    config
}

pub async fn builtin_pipeline(detections: Vec<Detection>) -> Pipeline {
    Pipeline::from_config(&builtin_with(detections)).await.unwrap()
}

/// Prompt vector whose softmax share against image `[1, 0]` at temperature
/// 100 is proportional to `p`.
pub fn prompt_for(p: f32) -> Vec<f32> {
    let c = 0.5 + p.ln() / 100.0;
    vec![c, (1.0 - c * c).sqrt()]
}

/// Embedder with hand-placed prompt vectors and a fixed image vector.
pub struct ScriptedEmbedder {
    prompts: HashMap<String, Vec<f32>>,
}

impl ScriptedEmbedder {
    pub fn new(distributions: &[(&str, f32)]) -> Self {
        Self {
            prompts: distributions
                .iter()
                .map(|(label, p)| (label.to_string(), prompt_for(*p)))
                .collect(),
        }
    }
}

#[async_trait]
impl Embedder for ScriptedEmbedder {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn encode_image(&self, image: &[u8]) -> Result<Vec<f32>, SimilarityError> {
        if image.is_empty() {
            return Err(SimilarityError::InvalidInput("empty".into()));
        }
        Ok(vec![1.0, 0.0])
    }

    async fn encode_text(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, SimilarityError> {
        texts
            .iter()
            .map(|t| {
                self.prompts
                    .get(t)
                    .cloned()
                    .ok_or_else(|| SimilarityError::InvalidInput(format!("unscripted prompt {t}")))
            })
            .collect()
    }
}

/// Answers every crop with the same classification.
pub struct FixedClassifier(pub CropClassification);

#[async_trait]
impl CropClassifier for FixedClassifier {
    fn name(&self) -> &str {
        "fixed"
    }

    fn vocabularies(&self) -> Vec<String> {
        self.0.iter().map(|r| r.vocabulary.clone()).collect()
    }

    async fn classify_crop(
        &self,
        _image: &[u8],
    ) -> Result<CropClassification, classify::ClassifyError> {
        Ok(self.0.clone())
    }
}

/// Fails crops of a given width; others get the inner classifier's answer.
pub struct WidthGatedClassifier<C> {
    pub inner: C,
    pub failing_width: u32,
}

#[async_trait]
impl<C: CropClassifier> CropClassifier for WidthGatedClassifier<C> {
    fn name(&self) -> &str {
        "width-gated"
    }

    fn vocabularies(&self) -> Vec<String> {
        self.inner.vocabularies()
    }

    async fn classify_crop(
        &self,
        image: &[u8],
    ) -> Result<CropClassification, classify::ClassifyError> {
        let width = image::load_from_memory(image).unwrap().width();
        if width == self.failing_width {
            return Err(SimilarityError::Upstream("embedding service unavailable".into()).into());
        }
        self.inner.classify_crop(image).await
    }
}

/// Smaller crops answer later, so completion order is the reverse of
/// detector order.
pub struct SlowForSmallClassifier<C> {
    pub inner: C,
}

#[async_trait]
impl<C: CropClassifier> CropClassifier for SlowForSmallClassifier<C> {
    fn name(&self) -> &str {
        "slow-for-small"
    }

    fn vocabularies(&self) -> Vec<String> {
        self.inner.vocabularies()
    }

    async fn classify_crop(
        &self,
        image: &[u8],
    ) -> Result<CropClassification, classify::ClassifyError> {
        let width = image::load_from_memory(image).unwrap().width() as u64;
        tokio::time::sleep(Duration::from_millis(200u64.saturating_sub(width))).await;
        self.inner.classify_crop(image).await
    }
}

/// Memory store whose uploads time out for the listed object names.
pub struct FlakyStore {
    pub inner: MemoryObjectStore,
    pub failing: HashSet<String>,
}

impl FlakyStore {
    pub fn failing(names: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryObjectStore::new("memory://flaky"),
            failing: names.iter().map(|s| s.to_string()).collect(),
        })
    }
}

#[async_trait]
impl ObjectStore for FlakyStore {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn upload(
        &self,
        bytes: Bytes,
        name: &str,
        content_type: &str,
        request_id: &str,
    ) -> Result<String, StorageError> {
        if self.failing.contains(name) {
            return Err(StorageError::Timeout(format!("upload of {name}")));
        }
        self.inner.upload(bytes, name, content_type, request_id).await
    }

    async fn download(&self, url: &str) -> Result<Bytes, StorageError> {
        self.inner.download(url).await
    }
}
