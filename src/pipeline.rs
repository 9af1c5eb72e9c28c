use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use classify::{CropClassifier, EmbeddingClassifier, StubClassifier};
use crops::{
    annotate, build_detector, decode_image, encode_image, extract_crops, Crop, CropFormat,
    Detection, Detector,
};
use futures::stream::{self, StreamExt};
use merge::Normalizer;
use similarity::build_embedder;
use storage::{build_store, upload_or_placeholder, ObjectStore, DEFAULT_PLACEHOLDER_URL};
use tracing::{info, info_span, warn, Instrument};

use crate::{PipelineConfig, PipelineError, PipelineInfo, Plant, PredictResponse};

/// Object name of the annotated source photo.
pub const FRAMED_IMAGE_NAME: &str = "framed_image.jpeg";

/// Knobs that are not owned by any single stage.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// Crops classified at once per photo.
    pub concurrency: usize,
    pub crop_format: CropFormat,
    /// URL reported when an upload fails.
    pub placeholder_url: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            crop_format: CropFormat::default(),
            placeholder_url: DEFAULT_PLACEHOLDER_URL.to_string(),
        }
    }
}

/// Photo in, plants out: detect, crop, classify, merge, upload.
///
/// All collaborators are shared read-only, so one pipeline serves any number
/// of concurrent requests.
#[derive(Clone)]
pub struct Pipeline {
    detector: Arc<dyn Detector>,
    classifier: Arc<dyn CropClassifier>,
    normalizer: Arc<Normalizer>,
    store: Arc<dyn ObjectStore>,
    options: PipelineOptions,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("detector", &self.detector.name())
            .field("classifier", &self.classifier.name())
            .field("store", &self.store.name())
            .field("options", &self.options)
            .finish()
    }
}

impl Pipeline {
    pub fn new(
        detector: Arc<dyn Detector>,
        classifier: Arc<dyn CropClassifier>,
        normalizer: Normalizer,
        store: Arc<dyn ObjectStore>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            detector,
            classifier,
            normalizer: Arc::new(normalizer),
            store,
            options: PipelineOptions {
                concurrency: options.concurrency.max(1),
                ..options
            },
        }
    }

    /// Builds every adapter named in `cfg`. Prompt embeddings are computed
    /// here, once.
    pub async fn from_config(cfg: &PipelineConfig) -> Result<Self, PipelineError> {
        cfg.validate()?;
        let specs = cfg.vocabulary_specs()?;

        let classifier: Arc<dyn CropClassifier> = match cfg.classifier.mode.as_str() {
            "stub" => Arc::new(StubClassifier::new(specs)),
            _ => {
                let embedder = build_embedder(&cfg.embedder)?;
                Arc::new(EmbeddingClassifier::build(embedder, specs, cfg.classifier.temperature).await?)
            }
        };
        let detector =
            build_detector(&cfg.detector).map_err(|e| PipelineError::Setup(e.to_string()))?;
        let store = build_store(&cfg.storage).map_err(|e| PipelineError::Setup(e.to_string()))?;
        let normalizer = Normalizer::new(
            cfg.normalizer.clone(),
            &cfg.translations,
            cfg.sentinel_set(),
        )?;

        let pipeline = Self::new(
            detector,
            classifier,
            normalizer,
            store,
            PipelineOptions {
                concurrency: cfg.classifier.concurrency,
                crop_format: cfg.crops,
                placeholder_url: cfg.storage.placeholder_url.clone(),
            },
        );
        info!(
            classifier = pipeline.classifier.name(),
            detector = pipeline.detector.name(),
            store = pipeline.store.name(),
            vocabularies = cfg.vocabularies.len(),
            "pipeline ready"
        );
        Ok(pipeline)
    }

    pub fn with_detector(mut self, detector: Arc<dyn Detector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn CropClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.store = store;
        self
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn describe(&self) -> PipelineInfo {
        PipelineInfo {
            classifier: self.classifier.name().to_string(),
            detector: self.detector.name().to_string(),
            store: self.store.name().to_string(),
            vocabularies: self.classifier.vocabularies(),
            concurrency: self.options.concurrency,
        }
    }

    /// Fetches the photo at `url` from the object store, then predicts.
    pub async fn predict_url(
        &self,
        url: &str,
        request_id: &str,
    ) -> Result<PredictResponse, PipelineError> {
        let image = self.store.download(url).await?;
        info!(request_id, url, bytes = image.len(), "source image downloaded");
        self.predict(&image, request_id).await
    }

    /// Runs the whole pipeline on one encoded photo.
    ///
    /// Fails only when no crops can be produced at all: undecodable bytes or
    /// an unavailable detector. Crop-level failures are logged and skipped;
    /// upload failures become the placeholder URL.
    pub async fn predict(
        &self,
        image: &[u8],
        request_id: &str,
    ) -> Result<PredictResponse, PipelineError> {
        let started = Instant::now();
        let source = decode_image(image).map_err(PipelineError::from_decode)?;

        let detections = self
            .detector
            .detect(image)
            .await
            .map_err(PipelineError::Detection)?;
        info!(
            request_id,
            detector = self.detector.name(),
            detections = detections.len(),
            "objects detected"
        );

        let crops = extract_crops(&source, &detections, self.options.crop_format)
            .map_err(PipelineError::Extraction)?;

        let framed = self.upload_framed(&source, &detections, request_id);
        let plants = self.process_crops(crops, request_id);
        let (framed_url, plants) = futures::join!(framed, plants);

        info!(
            request_id,
            plants = plants.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "prediction complete"
        );
        Ok(PredictResponse { plants, framed_url })
    }

    async fn upload_framed(
        &self,
        source: &image::RgbImage,
        detections: &[Detection],
        request_id: &str,
    ) -> String {
        let framed = annotate(source, detections);
        let quality = match self.options.crop_format {
            CropFormat::Jpeg { quality } => quality,
            CropFormat::Png => 95,
        };
        let encoded = match encode_image(&framed, CropFormat::Jpeg { quality }) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(request_id, error = %err, "framed image not encoded, using placeholder URL");
                return self.options.placeholder_url.clone();
            }
        };
        upload_or_placeholder(
            self.store.as_ref(),
            Bytes::from(encoded),
            FRAMED_IMAGE_NAME,
            "image/jpeg",
            request_id,
            &self.options.placeholder_url,
        )
        .await
    }

    /// Processes crops with bounded fan-out. Output keeps detector order.
    async fn process_crops(&self, crops: Vec<Crop>, request_id: &str) -> Vec<Plant> {
        let results: Vec<Option<Plant>> = stream::iter(crops)
            .map(|crop| self.process_crop(crop, request_id))
            .buffered(self.options.concurrency)
            .collect()
            .await;
        results.into_iter().flatten().collect()
    }

    async fn process_crop(&self, crop: Crop, request_id: &str) -> Option<Plant> {
        let span = info_span!("crop", request_id, crop_id = crop.id);
        async move {
            let started = Instant::now();
            let name = crop.file_name(self.options.crop_format.extension());

            let upload = upload_or_placeholder(
                self.store.as_ref(),
                crop.bytes.clone(),
                &name,
                self.options.crop_format.content_type(),
                request_id,
                &self.options.placeholder_url,
            );
            let classification = self.classifier.classify_crop(&crop.bytes);
            let (crop_url, classification) = futures::join!(upload, classification);

            let classification = match classification {
                Ok(classification) => classification,
                Err(err) => {
                    warn!(
                        classifier = self.classifier.name(),
                        error = %err,
                        "crop classification failed, skipping crop"
                    );
                    return None;
                }
            };

            let prediction = self.normalizer.normalize(&classification);
            info!(
                plant_type = prediction.plant_type.map(|t| t.as_str()).unwrap_or(""),
                name = %prediction.name,
                confidence = prediction.confidence,
                defects = prediction.defects.len(),
                "crop normalized"
            );
            Some(Plant {
                id: crop.id,
                prediction,
                crop_url,
                processing_time: started.elapsed().as_secs_f64(),
            })
        }
        .instrument(span)
        .await
    }
}
