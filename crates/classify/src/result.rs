use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One selected label and its confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    /// Missing, `null`, non-numeric or non-finite values read as `0.0`.
    #[serde(default, deserialize_with = "lenient_confidence")]
    pub confidence: f32,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Outcome of one vocabulary for one crop.
///
/// The shape is fixed at the classifier boundary: a selection of exactly one
/// label is always `Single`, never a one-element `Multi`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ClassificationResult {
    /// No label cleared the policy.
    #[default]
    None,
    Single(LabelScore),
    /// Two or more labels, highest confidence first.
    Multi(Vec<LabelScore>),
}

impl ClassificationResult {
    /// Builds the canonical shape for `entries` (empty → `None`, one → `Single`).
    pub fn from_entries(mut entries: Vec<LabelScore>) -> Self {
        match entries.len() {
            0 => ClassificationResult::None,
            1 => ClassificationResult::Single(entries.remove(0)),
            _ => ClassificationResult::Multi(entries),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ClassificationResult::None)
    }

    /// Every selected entry in order.
    pub fn entries(&self) -> &[LabelScore] {
        match self {
            ClassificationResult::None => &[],
            ClassificationResult::Single(entry) => std::slice::from_ref(entry),
            ClassificationResult::Multi(entries) => entries,
        }
    }

    /// The first (highest-confidence) entry, if any.
    pub fn top(&self) -> Option<&LabelScore> {
        self.entries().first()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// Results of every vocabulary for one crop, in vocabulary declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CropClassification {
    pub results: Vec<VocabularyResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyResult {
    pub vocabulary: String,
    #[serde(default)]
    pub result: ClassificationResult,
}

impl CropClassification {
    pub fn push(&mut self, vocabulary: impl Into<String>, result: ClassificationResult) {
        self.results.push(VocabularyResult {
            vocabulary: vocabulary.into(),
            result,
        });
    }

    pub fn get(&self, vocabulary: &str) -> Option<&ClassificationResult> {
        self.results
            .iter()
            .find(|r| r.vocabulary == vocabulary)
            .map(|r| &r.result)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VocabularyResult> {
        self.results.iter()
    }
}

fn lenient_confidence<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    struct ConfidenceVisitor;

    impl<'de> Visitor<'de> for ConfidenceVisitor {
        type Value = f32;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a confidence number")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f32, E> {
            Ok(finite_or_zero(v as f32))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f32, E> {
            Ok(v as f32)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f32, E> {
            Ok(v as f32)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f32, E> {
            Ok(v.trim().parse::<f32>().map(finite_or_zero).unwrap_or(0.0))
        }

        fn visit_bool<E: de::Error>(self, _: bool) -> Result<f32, E> {
            Ok(0.0)
        }

        fn visit_unit<E: de::Error>(self) -> Result<f32, E> {
            Ok(0.0)
        }

        fn visit_none<E: de::Error>(self) -> Result<f32, E> {
            Ok(0.0)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<f32, D::Error> {
            d.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(ConfidenceVisitor)
}

fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_entries_enforces_shape() {
        assert!(ClassificationResult::from_entries(vec![]).is_none());
        assert_eq!(
            ClassificationResult::from_entries(vec![LabelScore::new("a", 0.4)]),
            ClassificationResult::Single(LabelScore::new("a", 0.4))
        );
        let multi = ClassificationResult::from_entries(vec![
            LabelScore::new("a", 0.4),
            LabelScore::new("b", 0.3),
        ]);
        assert!(matches!(multi, ClassificationResult::Multi(ref v) if v.len() == 2));
        assert_eq!(multi.top().unwrap().label, "a");
    }

    #[test]
    fn entries_view_is_uniform() {
        assert!(ClassificationResult::None.entries().is_empty());
        let single = ClassificationResult::Single(LabelScore::new("dead branches", 0.25));
        assert_eq!(single.entries().len(), 1);
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn serde_shape_is_tagged() {
        let single = ClassificationResult::Single(LabelScore::new("tree", 0.9));
        let value = serde_json::to_value(&single).unwrap();
        assert_eq!(
            value,
            json!({"kind": "single", "value": {"label": "tree", "confidence": 0.9f32}})
        );
        let none = serde_json::to_value(ClassificationResult::None).unwrap();
        assert_eq!(none, json!({"kind": "none"}));
    }

    #[test]
    fn lenient_confidence_accepts_messy_input() {
        let missing: LabelScore = serde_json::from_value(json!({"label": "a"})).unwrap();
        assert_eq!(missing.confidence, 0.0);

        let null: LabelScore =
            serde_json::from_value(json!({"label": "a", "confidence": null})).unwrap();
        assert_eq!(null.confidence, 0.0);

        let text: LabelScore =
            serde_json::from_value(json!({"label": "a", "confidence": "0.75"})).unwrap();
        assert!((text.confidence - 0.75).abs() < 1e-6);

        let garbage: LabelScore =
            serde_json::from_value(json!({"label": "a", "confidence": "high"})).unwrap();
        assert_eq!(garbage.confidence, 0.0);

        let int: LabelScore =
            serde_json::from_value(json!({"label": "a", "confidence": 1})).unwrap();
        assert_eq!(int.confidence, 1.0);
    }

    #[test]
    fn crop_classification_lookup() {
        let mut crop = CropClassification::default();
        crop.push("tree or bush", ClassificationResult::Single(LabelScore::new("tree", 0.9)));
        crop.push("tree problems", ClassificationResult::None);

        assert_eq!(crop.get("tree or bush").unwrap().top().unwrap().label, "tree");
        assert!(crop.get("tree problems").unwrap().is_none());
        assert!(crop.get("bush problems").is_none());
        assert_eq!(crop.iter().count(), 2);
    }

    #[test]
    fn vocabulary_result_without_result_defaults_to_none() {
        let parsed: VocabularyResult =
            serde_json::from_value(json!({"vocabulary": "tree problems"})).unwrap();
        assert!(parsed.result.is_none());
    }
}
