mod common;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use common::*;
use crops::CropError;
use dendroscan::{
    Detection, Detector, MemoryObjectStore, ObjectStore, PipelineError, StorageError,
    StubClassifier,
};

struct DownDetector;

#[async_trait]
impl Detector for DownDetector {
    fn name(&self) -> &str {
        "down"
    }

    async fn detect(&self, _image: &[u8]) -> Result<Vec<Detection>, CropError> {
        Err(CropError::Timeout("detector did not answer".into()))
    }
}

#[tokio::test]
async fn undecodable_photo_is_a_client_error() {
    let pipeline = builtin_pipeline(vec![detection(0, [0.0, 0.0, 10.0, 10.0])]).await;

    let err = pipeline.predict(b"definitely not a jpeg", "req").await.unwrap_err();

    assert!(matches!(err, PipelineError::InvalidImage(_)));
    assert!(err.is_client_error());
    assert!(err.to_string().starts_with("could not process image"));
}

#[tokio::test]
async fn empty_body_is_a_client_error() {
    let pipeline = builtin_pipeline(vec![]).await;
    let err = pipeline.predict(b"", "req").await.unwrap_err();
    assert!(err.is_client_error());
}

#[tokio::test]
async fn detector_outage_fails_the_request() {
    let pipeline = builtin_pipeline(vec![])
        .await
        .with_detector(Arc::new(DownDetector));

    let err = pipeline.predict(&photo(32, 32), "req").await.unwrap_err();

    assert!(matches!(err, PipelineError::Detection(CropError::Timeout(_))));
    assert!(err.is_upstream());
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn empty_boxes_are_skipped() {
    let pipeline = builtin_pipeline(vec![
        detection(0, [5.0, 5.0, 5.0, 20.0]),
        detection(1, [0.0, 0.0, 16.0, 16.0]),
        detection(2, [100.0, 100.0, 120.0, 120.0]),
    ])
    .await;

    let response = pipeline.predict(&photo(32, 32), "req").await.unwrap();

    let ids: Vec<_> = response.plants.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1]);
}

#[tokio::test]
async fn failing_crop_is_skipped_and_others_survive() {
    let config = builtin_with(vec![
        detection(0, [0.0, 0.0, 20.0, 20.0]),
        detection(1, [0.0, 0.0, 10.0, 10.0]),
        detection(2, [10.0, 10.0, 30.0, 30.0]),
    ]);
    let pipeline = dendroscan::Pipeline::from_config(&config)
        .await
        .unwrap()
        .with_classifier(Arc::new(WidthGatedClassifier {
            inner: StubClassifier::new(config.vocabulary_specs().unwrap()),
            failing_width: 10,
        }));

    let response = pipeline.predict(&photo(32, 32), "req").await.unwrap();

    let ids: Vec<_> = response.plants.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![0, 2]);
}

#[tokio::test]
async fn predict_url_reads_from_the_store() {
    let store = Arc::new(MemoryObjectStore::new("memory://src"));
    store.insert("memory://src/bucket/photo.png", Bytes::from(photo(32, 32)));
    let pipeline = builtin_pipeline(vec![detection(0, [0.0, 0.0, 16.0, 16.0])])
        .await
        .with_store(store.clone());

    let response = pipeline
        .predict_url("memory://src/bucket/photo.png", "req-url")
        .await
        .unwrap();

    assert_eq!(response.plants.len(), 1);
    assert!(store.get("memory://src/req-url/crop_0.jpg").is_some());
}

#[tokio::test]
async fn missing_source_photo_is_a_client_error() {
    let pipeline = builtin_pipeline(vec![]).await;

    let err = pipeline
        .predict_url("memory://dendroscan/nope/photo.jpg", "req")
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Source(StorageError::NotFound(_))));
    assert!(err.is_client_error());
}

#[tokio::test]
async fn describe_reports_adapters() {
    let pipeline = builtin_pipeline(vec![]).await;
    let info = pipeline.describe();
    assert_eq!(info.detector, "static");
    assert_eq!(info.store, pipeline.store().name());
    assert_eq!(info.vocabularies.len(), 7);
    assert_eq!(info.concurrency, 4);
}
