use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::{CropError, Detection};

/// Adapter settings for the object detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// `api` or `static`.
    pub mode: String,
    pub api_url: Option<String>,
    pub api_auth_header: Option<String>,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Forwarded to the detection service.
    pub confidence: f32,
    pub iou: f32,
    /// Answer of the `static` detector.
    pub detections: Vec<Detection>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            mode: "static".into(),
            api_url: None,
            api_auth_header: None,
            timeout_secs: 30,
            connect_timeout_secs: 5,
            confidence: 0.6,
            iou: 0.6,
            detections: Vec::new(),
        }
    }
}

/// Locates plants in a photo.
#[async_trait]
pub trait Detector: Send + Sync {
    fn name(&self) -> &str;

    /// Detections in the detector's own order. An empty list is a valid answer.
    async fn detect(&self, image: &[u8]) -> Result<Vec<Detection>, CropError>;
}

pub fn build_detector(cfg: &DetectorConfig) -> Result<Arc<dyn Detector>, CropError> {
    match cfg.mode.as_str() {
        "static" => Ok(Arc::new(StaticDetector::new(cfg.detections.clone()))),
        "api" => Ok(Arc::new(ApiDetector::new(cfg)?)),
        other => Err(CropError::InvalidConfig(format!(
            "unknown detector mode `{other}` (expected `api` or `static`)"
        ))),
    }
}

/// Returns the same detections for every photo.
#[derive(Debug, Clone, Default)]
pub struct StaticDetector {
    detections: Vec<Detection>,
}

impl StaticDetector {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }
}

#[async_trait]
impl Detector for StaticDetector {
    fn name(&self) -> &str {
        "static"
    }

    async fn detect(&self, _image: &[u8]) -> Result<Vec<Detection>, CropError> {
        Ok(self.detections.clone())
    }
}

/// Detector behind an HTTP service.
///
/// `POST {api_url}/detect` with `{"image": "<base64>", "conf", "iou"}`,
/// answered by `{"detections": [{"class_id", "class_name", "bbox"}]}` or a bare
/// array of detections.
#[derive(Debug, Clone)]
pub struct ApiDetector {
    client: reqwest::Client,
    url: String,
    auth_header: Option<String>,
    confidence: f32,
    iou: f32,
}

impl ApiDetector {
    pub fn new(cfg: &DetectorConfig) -> Result<Self, CropError> {
        let base = cfg
            .api_url
            .as_deref()
            .ok_or_else(|| CropError::InvalidConfig("api_url is required for api mode".into()))?
            .trim_end_matches('/');

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .build()
            .map_err(|e| CropError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: format!("{base}/detect"),
            auth_header: cfg.api_auth_header.clone(),
            confidence: cfg.confidence,
            iou: cfg.iou,
        })
    }
}

#[async_trait]
impl Detector for ApiDetector {
    fn name(&self) -> &str {
        "api"
    }

    async fn detect(&self, image: &[u8]) -> Result<Vec<Detection>, CropError> {
        let payload = json!({
            "image": base64::engine::general_purpose::STANDARD.encode(image),
            "conf": self.confidence,
            "iou": self.iou,
        });
        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(header) = self.auth_header.as_deref() {
            request = request.header("Authorization", header);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                CropError::Timeout(e.to_string())
            } else {
                CropError::Upstream(format!("HTTP request failed: {e}"))
            }
        })?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CropError::Upstream(format!("HTTP error {status}: {body}")));
        }
        let body: Value = response
            .json()
            .await
            .map_err(|e| CropError::Upstream(format!("invalid JSON response: {e}")))?;

        let detections = parse_detections(body)?;
        debug!(count = detections.len(), "detector answered");
        Ok(detections)
    }
}

fn parse_detections(body: Value) -> Result<Vec<Detection>, CropError> {
    let list = match body {
        Value::Object(mut map) => map
            .remove("detections")
            .ok_or_else(|| CropError::Upstream("missing `detections` field".into()))?,
        other => other,
    };
    serde_json::from_value(list)
        .map_err(|e| CropError::Upstream(format!("malformed detections: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_detector_echoes_config() {
        let det = build_detector(&DetectorConfig {
            detections: vec![Detection::new(0, "plant", [0.0, 0.0, 5.0, 5.0])],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(det.name(), "static");
        assert_eq!(det.detect(b"img").await.unwrap().len(), 1);
    }

    #[test]
    fn unknown_mode_and_missing_url_rejected() {
        let unknown = DetectorConfig {
            mode: "yolo".into(),
            ..Default::default()
        };
        assert!(matches!(build_detector(&unknown), Err(CropError::InvalidConfig(_))));
        let api = DetectorConfig {
            mode: "api".into(),
            ..Default::default()
        };
        assert!(matches!(build_detector(&api), Err(CropError::InvalidConfig(_))));
    }

    #[test]
    fn parses_both_response_shapes() {
        let wrapped = parse_detections(json!({
            "detections": [{"class_id": 0, "class_name": "plant", "bbox": [1, 2, 3, 4]}]
        }))
        .unwrap();
        assert_eq!(wrapped[0].class_name, "plant");

        let bare = parse_detections(json!([{"class_id": 1, "bbox": [0, 0, 1, 1]}])).unwrap();
        assert_eq!(bare[0].class_id, 1);

        assert!(parse_detections(json!({"boxes": []})).is_err());
        assert!(parse_detections(json!([{"bbox": "nope"}])).is_err());
    }

    #[tokio::test]
    async fn unreachable_service_is_upstream() {
        let det = ApiDetector::new(&DetectorConfig {
            mode: "api".into(),
            api_url: Some("http://127.0.0.1:9/".into()),
            timeout_secs: 2,
            connect_timeout_secs: 1,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(det.url, "http://127.0.0.1:9/detect");
        let err = det.detect(b"img").await.unwrap_err();
        assert!(matches!(err, CropError::Upstream(_) | CropError::Timeout(_)));
    }
}
