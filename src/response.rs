use merge::NormalizedPrediction;
use serde::{Deserialize, Serialize};

/// One detected plant, in detector order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    /// Index of the detection this plant came from.
    pub id: usize,
    #[serde(flatten)]
    pub prediction: NormalizedPrediction,
    pub crop_url: String,
    /// Seconds spent on this crop.
    pub processing_time: f64,
}

/// Answer for one photo.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PredictResponse {
    pub plants: Vec<Plant>,
    pub framed_url: String,
}

impl PredictResponse {
    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }
}

/// Which adapters a pipeline was built with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineInfo {
    pub classifier: String,
    pub detector: String,
    pub store: String,
    pub vocabularies: Vec<String>,
    pub concurrency: usize,
}
