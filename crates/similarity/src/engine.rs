//! Temperature-scaled softmax over cosine similarities.

use crate::normalize::{dot, to_unit};
use crate::{PromptEmbedding, SimilarityError, SimilarityScore};

/// Logit scale shared by every vocabulary query so confidences stay comparable.
pub const DEFAULT_TEMPERATURE: f32 = 100.0;

/// Scores `image_vector` against every prompt of one vocabulary.
///
/// Both sides are L2-normalized, the cosine similarities are multiplied by
/// `temperature`, and a softmax is taken over the vocabulary. The returned scores
/// follow the vocabulary's declared label order and sum to 1.
pub fn similarity(
    image_vector: &[f32],
    prompts: &PromptEmbedding,
    temperature: f32,
) -> Result<Vec<SimilarityScore>, SimilarityError> {
    if prompts.is_empty() {
        return Err(SimilarityError::EmptyVocabulary(
            prompts.vocabulary().to_string(),
        ));
    }
    if !temperature.is_finite() || temperature <= 0.0 {
        return Err(SimilarityError::InvalidInput(format!(
            "temperature must be a positive finite number, got {temperature}"
        )));
    }

    let image = to_unit(image_vector, "image vector")?;
    if image.len() != prompts.dim() {
        return Err(SimilarityError::DimensionMismatch {
            label: prompts.labels()[0].clone(),
            image: image.len(),
            prompt: prompts.dim(),
        });
    }

    let logits: Vec<f64> = prompts
        .vectors()
        .iter()
        .map(|prompt| f64::from(temperature) * f64::from(dot(&image, prompt)))
        .collect();
    let probs = softmax(&logits);

    Ok(prompts
        .labels()
        .iter()
        .zip(probs)
        .map(|(label, p)| SimilarityScore::new(label.clone(), p as f32))
        .collect())
}

/// Numerically stable softmax; works in f64 so small vocabularies sum to 1 within 1e-6.
pub(crate) fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
