//! YAML configuration for the DendroScan pipeline
//!
//! One file describes every stage: the adapters (embedder, detector, object
//! store), the vocabularies and their selection policies, the normalizer roles
//! and the display tables. A production default ships inside the binary and is
//! available through [`PipelineConfig::builtin`].
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//!
//! embedder:
//!   mode: "api"
//!   api_url: "http://clip.internal:8000"
//!
//! detector:
//!   mode: "api"
//!   api_url: "http://yolo.internal:8001"
//!
//! storage:
//!   mode: "http"
//!   upload_url: "https://s3.example.net/dendroscan"
//!
//! classifier:
//!   temperature: 100.0
//!   concurrency: 4
//!
//! vocabularies:
//!   - name: "tree or bush"
//!     kind: exclusive
//!     labels: ["A photo of a tree", "A photo of a bush"]
//!   - name: "tree problems"
//!     kind: multi_label
//!     threshold: 0.2
//!     sentinels: ["A photo of a tree showing example of the normal tree"]
//!     labels:
//!       - "A photo of a tree showing example of the normal tree"
//!       - "A photo of a tree showing example of dead branches"
//!
//! normalizer:
//!   defect_vocabularies: ["tree problems"]
//!
//! sentinels: ["the normal tree"]
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use classify::{SelectionPolicy, VocabularySpec, DEFAULT_MAX_RESULTS};
use crops::{CropFormat, DetectorConfig};
use merge::{NormalizerConfig, SentinelSet, TranslationSource};
use serde::{Deserialize, Serialize};
use similarity::{EmbedderConfig, Vocabulary, VocabularyKind, DEFAULT_TEMPERATURE};
use storage::StorageConfig;
use thiserror::Error;

/// The configuration compiled into the crate.
pub const BUILTIN_CONFIG: &str = include_str!("../config/dendroscan.yaml");

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),

    #[error("missing required field: {0}")]
    MissingField(String),
}

/// Top-level YAML configuration for the whole pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    /// Configuration format version
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub embedder: EmbedderConfig,

    #[serde(default)]
    pub detector: DetectorConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub classifier: ClassifierYamlConfig,

    /// Encoding of uploaded crops
    #[serde(default)]
    pub crops: CropFormat,

    /// Vocabularies in classification order
    #[serde(default)]
    pub vocabularies: Vec<VocabularyYamlConfig>,

    #[serde(default)]
    pub normalizer: NormalizerConfig,

    /// Display names keyed by prompt label
    #[serde(default)]
    pub translations: TranslationSource,

    /// Healthy-state labels never reported as defects
    #[serde(default)]
    pub sentinels: Vec<String>,
}

impl PipelineConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// The production vocabularies and tables with local adapters.
    pub fn builtin() -> Result<Self, ConfigLoadError> {
        Self::from_yaml(BUILTIN_CONFIG)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        check_mode("embedder.mode", &self.embedder.mode, &["api", "stub"])?;
        check_mode("detector.mode", &self.detector.mode, &["api", "static"])?;
        check_mode("storage.mode", &self.storage.mode, &["http", "memory"])?;
        self.classifier.validate()?;

        if let CropFormat::Jpeg { quality } = self.crops {
            if !(1..=100).contains(&quality) {
                return Err(ConfigLoadError::Validation(format!(
                    "crops.quality must be in 1..=100, got {quality}"
                )));
            }
        }

        if self.vocabularies.is_empty() {
            return Err(ConfigLoadError::MissingField("vocabularies".to_string()));
        }
        let mut seen = HashSet::new();
        for vocabulary in &self.vocabularies {
            if !seen.insert(vocabulary.name.as_str()) {
                return Err(ConfigLoadError::Validation(format!(
                    "vocabulary `{}` is declared twice",
                    vocabulary.name
                )));
            }
            vocabulary.to_spec(self.classifier.default_threshold)?;
        }

        self.normalizer
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        for referenced in self.normalizer.referenced_vocabularies() {
            if !seen.contains(referenced) {
                return Err(ConfigLoadError::Validation(format!(
                    "normalizer references undeclared vocabulary `{referenced}`"
                )));
            }
        }

        Ok(())
    }

    /// Vocabularies with their resolved selection policies, in declared order.
    pub fn vocabulary_specs(&self) -> Result<Vec<VocabularySpec>, ConfigLoadError> {
        self.vocabularies
            .iter()
            .map(|v| v.to_spec(self.classifier.default_threshold))
            .collect()
    }

    pub fn sentinel_set(&self) -> SentinelSet {
        SentinelSet::new(&self.sentinels)
    }
}

/// Classifier YAML configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierYamlConfig {
    /// `embedding` (zero-shot scoring) or `stub` (fixed answers)
    #[serde(default = "default_classifier_mode")]
    pub mode: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Crops classified at once per photo
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Threshold for multi-label vocabularies that do not set their own
    #[serde(default = "default_threshold")]
    pub default_threshold: f32,
}

impl ClassifierYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        check_mode("classifier.mode", &self.mode, &["embedding", "stub"])?;
        if !self.temperature.is_finite() || self.temperature <= 0.0 {
            return Err(ConfigLoadError::Validation(
                "classifier.temperature must be > 0".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(ConfigLoadError::Validation(
                "classifier.concurrency must be >= 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.default_threshold) {
            return Err(ConfigLoadError::Validation(
                "classifier.default_threshold must be in [0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ClassifierYamlConfig {
    fn default() -> Self {
        Self {
            mode: default_classifier_mode(),
            temperature: default_temperature(),
            concurrency: default_concurrency(),
            default_threshold: default_threshold(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyName {
    BestOf,
    Threshold,
}

/// One vocabulary as written in YAML.
///
/// `policy` defaults from `kind`: exclusive vocabularies are best-of,
/// multi-label vocabularies use a threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyYamlConfig {
    pub name: String,

    pub kind: VocabularyKind,

    pub labels: Vec<String>,

    #[serde(default)]
    pub policy: Option<PolicyName>,

    #[serde(default)]
    pub threshold: Option<f32>,

    #[serde(default)]
    pub sentinels: Vec<String>,

    #[serde(default)]
    pub max_results: Option<usize>,
}

impl VocabularyYamlConfig {
    pub fn to_spec(&self, default_threshold: f32) -> Result<VocabularySpec, ConfigLoadError> {
        if self.name.trim().is_empty() {
            return Err(ConfigLoadError::MissingField("vocabularies[].name".to_string()));
        }
        let vocabulary = Vocabulary::new(self.name.clone(), self.kind, self.labels.clone())
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;

        let policy = match self.policy.unwrap_or(match self.kind {
            VocabularyKind::Exclusive => PolicyName::BestOf,
            VocabularyKind::MultiLabel => PolicyName::Threshold,
        }) {
            PolicyName::BestOf => SelectionPolicy::BestOf,
            PolicyName::Threshold => SelectionPolicy::Threshold {
                threshold: self.threshold.unwrap_or(default_threshold),
                sentinels: self.sentinels.clone(),
                max_results: self.max_results.unwrap_or(DEFAULT_MAX_RESULTS),
            },
        };
        policy
            .validate(&self.name)
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;

        Ok(VocabularySpec::new(vocabulary, policy))
    }
}

fn check_mode(field: &str, value: &str, allowed: &[&str]) -> Result<(), ConfigLoadError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ConfigLoadError::Validation(format!(
            "{field} must be one of: {allowed:?}"
        )))
    }
}

// Helper functions for serde defaults
fn default_classifier_mode() -> String {
    "embedding".to_string()
}
fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}
fn default_concurrency() -> usize {
    4
}
fn default_threshold() -> f32 {
    0.2
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
version: "1.0"
name: "test config"
vocabularies:
  - name: "tree or bush"
    kind: exclusive
    labels: ["A photo of a tree", "A photo of a bush"]
  - name: "tree species"
    kind: exclusive
    labels: ["A photo of an Oak (Quercus) tree."]
  - name: "bush species"
    kind: exclusive
    labels: ["A photo of a Juniper (Juniperus) bush."]
  - name: "tree problems"
    kind: multi_label
    sentinels: ["A photo of a tree showing example of the normal tree"]
    labels:
      - "A photo of a tree showing example of the normal tree"
      - "A photo of a tree showing example of dead branches"
normalizer:
  defect_vocabularies: ["tree problems"]
"#;

    #[test]
    fn test_load_valid_yaml() {
        let config = PipelineConfig::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.name, Some("test config".to_string()));
        assert_eq!(config.vocabularies.len(), 4);
        assert_eq!(config.classifier, ClassifierYamlConfig::default());
        assert_eq!(config.embedder.mode, "stub");
        assert_eq!(config.detector.mode, "static");
        assert_eq!(config.storage.mode, "memory");
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = PipelineConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.version, "1.0");
    }

    #[test]
    fn test_policy_follows_kind() {
        let config = PipelineConfig::from_yaml(MINIMAL).unwrap();
        let specs = config.vocabulary_specs().unwrap();
        assert_eq!(specs[0].policy, SelectionPolicy::BestOf);
        assert_eq!(
            specs[3].policy,
            SelectionPolicy::threshold(
                0.2,
                vec!["A photo of a tree showing example of the normal tree".into()]
            )
        );
    }

    #[test]
    fn test_builtin_config() {
        let config = PipelineConfig::builtin().unwrap();
        let specs = config.vocabulary_specs().unwrap();
        let names: Vec<_> = specs.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "tree or bush",
                "tree species",
                "bush species",
                "tree problems",
                "bush problems",
                "bush dry branches",
                "tree is leaning",
            ]
        );
        assert_eq!(specs[1].vocabulary.len(), 15);
        assert_eq!(specs[2].vocabulary.len(), 14);
        assert_eq!(config.translations.species.len(), 29);
        assert!(config.sentinel_set().contains("The normal tree"));
        assert_eq!(config.classifier.temperature, 100.0);
    }

    #[test]
    fn test_unsupported_version() {
        let yaml = MINIMAL.replace("version: \"1.0\"", "version: \"2\"");
        let err = PipelineConfig::from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, ConfigLoadError::UnsupportedVersion(_)));
    }

    #[test]
    fn test_empty_vocabulary_rejected() {
        let yaml = r#"
version: "1"
vocabularies:
  - name: "tree or bush"
    kind: exclusive
    labels: []
"#;
        let err = PipelineConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("tree or bush"));
    }

    #[test]
    fn test_threshold_validation() {
        let yaml = MINIMAL.replace(
            "    kind: multi_label\n",
            "    kind: multi_label\n    threshold: 1.5\n",
        );
        let err = PipelineConfig::from_yaml(&yaml).unwrap_err();
        assert!(err.to_string().contains("threshold"));
    }

    #[test]
    fn test_temperature_validation() {
        let yaml = format!("{MINIMAL}\nclassifier:\n  temperature: 0.0\n");
        let err = PipelineConfig::from_yaml(&yaml).unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn test_undeclared_reference_rejected() {
        let yaml = MINIMAL.replace(
            "defect_vocabularies: [\"tree problems\"]",
            "defect_vocabularies: [\"tree problems\", \"bush problems\"]",
        );
        let err = PipelineConfig::from_yaml(&yaml).unwrap_err();
        assert!(err.to_string().contains("bush problems"));
    }

    #[test]
    fn test_duplicate_vocabulary_rejected() {
        let yaml = MINIMAL.replace("name: \"bush species\"", "name: \"tree species\"");
        let err = PipelineConfig::from_yaml(&yaml).unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn test_unknown_adapter_mode() {
        let yaml = format!("{MINIMAL}\nstorage:\n  mode: \"s3\"\n");
        let err = PipelineConfig::from_yaml(&yaml).unwrap_err();
        assert!(err.to_string().contains("storage.mode"));
    }
}
