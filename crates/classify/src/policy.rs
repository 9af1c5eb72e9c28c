use serde::{Deserialize, Serialize};
use similarity::SimilarityScore;
use tracing::debug;

use crate::{ClassificationResult, ClassifyError, LabelScore};

/// Upper bound on labels returned by a threshold vocabulary.
pub const DEFAULT_MAX_RESULTS: usize = 3;

/// How one vocabulary turns a score distribution into a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Argmax, first declared label wins ties. Always exactly one result.
    #[default]
    BestOf,
    /// Every non-sentinel label scoring at least `threshold`, highest first.
    Threshold {
        threshold: f32,
        /// Labels that never compete (e.g. "a photo of normal tree").
        #[serde(default)]
        sentinels: Vec<String>,
        #[serde(default = "default_max_results")]
        max_results: usize,
    },
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

impl SelectionPolicy {
    pub fn threshold(threshold: f32, sentinels: Vec<String>) -> Self {
        SelectionPolicy::Threshold {
            threshold,
            sentinels,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn validate(&self, vocabulary: &str) -> Result<(), ClassifyError> {
        match self {
            SelectionPolicy::BestOf => Ok(()),
            SelectionPolicy::Threshold {
                threshold,
                max_results,
                ..
            } => {
                if !threshold.is_finite() || !(0.0..=1.0).contains(threshold) {
                    return Err(ClassifyError::InvalidPolicy {
                        vocabulary: vocabulary.to_string(),
                        reason: format!("threshold {threshold} outside [0, 1]"),
                    });
                }
                if *max_results == 0 {
                    return Err(ClassifyError::InvalidPolicy {
                        vocabulary: vocabulary.to_string(),
                        reason: "max_results must be at least 1".into(),
                    });
                }
                Ok(())
            }
        }
    }
}

/// Applies `policy` to one vocabulary's score distribution.
///
/// `scores` must be in the vocabulary's declared label order; tie-breaking
/// depends on it.
pub fn classify(
    vocabulary: &str,
    scores: &[SimilarityScore],
    policy: &SelectionPolicy,
) -> Result<ClassificationResult, ClassifyError> {
    if scores.is_empty() {
        return Err(ClassifyError::EmptyVocabulary(vocabulary.to_string()));
    }

    let result = match policy {
        SelectionPolicy::BestOf => best_of(scores.iter()).map_or(
            ClassificationResult::None,
            |best| ClassificationResult::Single(to_label(best)),
        ),
        SelectionPolicy::Threshold {
            threshold,
            sentinels,
            max_results,
        } => select_above(scores, *threshold, sentinels, *max_results),
    };

    debug!(
        vocabulary,
        selected = result.len(),
        top = result.top().map(|l| l.label.as_str()).unwrap_or(""),
        "vocabulary classified"
    );
    Ok(result)
}

fn select_above(
    scores: &[SimilarityScore],
    threshold: f32,
    sentinels: &[String],
    max_results: usize,
) -> ClassificationResult {
    let candidates: Vec<&SimilarityScore> = scores
        .iter()
        .filter(|s| !is_sentinel(&s.label, sentinels))
        .collect();

    let mut selected: Vec<&SimilarityScore> = candidates
        .iter()
        .copied()
        .filter(|s| score_of(s) >= threshold)
        .collect();

    if selected.is_empty() {
        match best_of(candidates.iter().copied()) {
            Some(fallback) => selected.push(fallback),
            None => return ClassificationResult::None,
        }
    }

    // stable: equal scores keep declared order
    selected.sort_by(|a, b| score_of(b).total_cmp(&score_of(a)));
    selected.truncate(max_results.max(1));

    ClassificationResult::from_entries(selected.into_iter().map(to_label).collect())
}

fn best_of<'a, I>(scores: I) -> Option<&'a SimilarityScore>
where
    I: Iterator<Item = &'a SimilarityScore>,
{
    let mut best: Option<&SimilarityScore> = None;
    for candidate in scores {
        match best {
            Some(current) if score_of(candidate) <= score_of(current) => {}
            _ => best = Some(candidate),
        }
    }
    best
}

fn is_sentinel(label: &str, sentinels: &[String]) -> bool {
    let label = label.trim().to_lowercase();
    sentinels.iter().any(|s| s.trim().to_lowercase() == label)
}

/// Non-finite scores never win and never clear a threshold.
fn score_of(s: &SimilarityScore) -> f32 {
    if s.score.is_finite() {
        s.score
    } else {
        f32::NEG_INFINITY
    }
}

fn to_label(s: &SimilarityScore) -> LabelScore {
    let confidence = if s.score.is_finite() {
        s.score.clamp(0.0, 1.0)
    } else {
        0.0
    };
    LabelScore::new(s.label.clone(), confidence)
}
