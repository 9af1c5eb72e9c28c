use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantType {
    Tree,
    Bush,
}

impl PlantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlantType::Tree => "tree",
            PlantType::Bush => "bush",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectEntry {
    pub name: String,
    pub confidence: f32,
}

/// Final per-crop record.
///
/// Missing information is empty, never an error: no species means an empty
/// `name`, an unresolved type means `plant_type: None`. Every confidence is in
/// `[0, 1]` and no defect is a healthy-state label.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedPrediction {
    #[serde(rename = "type")]
    pub plant_type: Option<PlantType>,
    /// Localized type name, empty when unresolved or untranslated.
    pub type_name: String,
    pub name: String,
    pub latin_name: String,
    pub confidence: f32,
    pub defects: Vec<DefectEntry>,
}

/// Coerces a model confidence into `[0, 1]`; non-finite becomes `0.0`.
pub fn clamp_confidence(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
