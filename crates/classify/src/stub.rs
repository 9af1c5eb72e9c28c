use async_trait::async_trait;

use crate::{
    ClassificationResult, ClassifyError, CropClassifier, CropClassification, LabelScore,
    SelectionPolicy, VocabularySpec,
};

/// Fixed-answer classifier for local runs and tests.
///
/// Best-of vocabularies answer with their first declared label at full
/// confidence; threshold vocabularies answer `None`. No model is touched and
/// every crop gets the same answer.
#[derive(Debug, Clone)]
pub struct StubClassifier {
    specs: Vec<VocabularySpec>,
}

impl StubClassifier {
    pub fn new(specs: Vec<VocabularySpec>) -> Self {
        Self { specs }
    }
}

#[async_trait]
impl CropClassifier for StubClassifier {
    fn name(&self) -> &str {
        "stub"
    }

    fn vocabularies(&self) -> Vec<String> {
        self.specs.iter().map(|s| s.name().to_string()).collect()
    }

    async fn classify_crop(&self, image: &[u8]) -> Result<CropClassification, ClassifyError> {
        if image.is_empty() {
            return Err(similarity::SimilarityError::InvalidInput("image bytes are empty".into()).into());
        }
        let mut out = CropClassification::default();
        for spec in &self.specs {
            let result = match spec.policy {
                SelectionPolicy::BestOf => spec
                    .vocabulary
                    .labels()
                    .first()
                    .map(|label| ClassificationResult::Single(LabelScore::new(label.clone(), 1.0)))
                    .unwrap_or_default(),
                SelectionPolicy::Threshold { .. } => ClassificationResult::None,
            };
            out.push(spec.name(), result);
        }
        Ok(out)
    }
}
