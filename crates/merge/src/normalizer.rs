use std::collections::HashMap;

use classify::{ClassificationResult, CropClassification, VocabularyResult};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::tables::{SentinelSet, TranslationSource, TranslationTable};
use crate::types::clamp_confidence;
use crate::{DefectEntry, MergeError, NormalizedPrediction, NormalizerConfig, PlantType};

/// Folds one crop's per-vocabulary results into a [`NormalizedPrediction`].
///
/// Translation and sentinel tables are injected so deployments can localize
/// without code changes. The normalizer never fails on model output: missing
/// vocabularies, malformed entries and odd confidences degrade to empty values
/// with a warning.
#[derive(Debug, Clone)]
pub struct Normalizer {
    config: NormalizerConfig,
    translations: TranslationTable,
    sentinels: SentinelSet,
    tree_keyword: String,
    bush_keyword: String,
}

impl Normalizer {
    pub fn new(
        config: NormalizerConfig,
        translations: &TranslationSource,
        sentinels: SentinelSet,
    ) -> Result<Self, MergeError> {
        config.validate()?;
        Ok(Self {
            translations: TranslationTable::new(translations, config.key_prefixes.clone()),
            tree_keyword: config.tree_keyword.trim().to_lowercase(),
            bush_keyword: config.bush_keyword.trim().to_lowercase(),
            sentinels,
            config,
        })
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    pub fn translations(&self) -> &TranslationTable {
        &self.translations
    }

    /// Tree or bush, from the best label of the type vocabulary.
    pub fn resolve_type(&self, crop: &CropClassification) -> Option<PlantType> {
        let label = crop.get(&self.config.type_vocabulary)?.top()?.label.to_lowercase();
        if label.contains(&self.tree_keyword) {
            Some(PlantType::Tree)
        } else if label.contains(&self.bush_keyword) {
            Some(PlantType::Bush)
        } else {
            None
        }
    }

    /// Whether a defect vocabulary contributes for `plant_type`.
    pub fn applies(&self, vocabulary: &str, plant_type: Option<PlantType>) -> bool {
        let name = vocabulary.to_lowercase();
        let tree = name.contains(&self.tree_keyword);
        let bush = name.contains(&self.bush_keyword);
        if !tree && !bush {
            return true;
        }
        match plant_type {
            Some(PlantType::Tree) => tree,
            Some(PlantType::Bush) => bush,
            None => false,
        }
    }

    pub fn normalize(&self, crop: &CropClassification) -> NormalizedPrediction {
        let mut out = NormalizedPrediction::default();

        if crop.get(&self.config.type_vocabulary).is_none() {
            warn!(
                vocabulary = %self.config.type_vocabulary,
                "partial result: type vocabulary missing"
            );
        }
        let plant_type = self.resolve_type(crop);
        out.plant_type = plant_type;
        out.type_name = plant_type
            .and_then(|t| self.translations.type_name(t))
            .unwrap_or_default()
            .to_string();

        if let Some(t) = plant_type {
            self.fill_species(crop, t, &mut out);
        } else {
            info!(
                vocabulary = %self.config.type_vocabulary,
                "type unresolved, species skipped"
            );
        }

        let mut defects = Vec::new();
        for vocabulary in &self.config.defect_vocabularies {
            if !self.applies(vocabulary, plant_type) {
                debug!(vocabulary = %vocabulary, "defect vocabulary does not apply");
                continue;
            }
            match crop.get(vocabulary) {
                Some(result) => self.collect_defects(vocabulary, result, &mut defects),
                None => warn!(vocabulary = %vocabulary, "partial result: defect vocabulary missing"),
            }
        }
        out.defects = merge_defects(defects, self.config.max_defects_per_crop);
        out
    }

    /// Like [`normalize`](Self::normalize) for results that arrive as JSON.
    ///
    /// Accepts `{"results": [{"vocabulary", "result"}, ..]}` or a map of
    /// vocabulary name to result. Entries that do not parse are skipped.
    pub fn normalize_value(&self, value: &Value) -> NormalizedPrediction {
        let mut crop = CropClassification::default();
        let entries: Vec<(Option<String>, &Value)> = match value {
            Value::Object(map) => match map.get("results") {
                Some(Value::Array(items)) => items.iter().map(|v| (None, v)).collect(),
                _ => map.iter().map(|(k, v)| (Some(k.clone()), v)).collect(),
            },
            Value::Array(items) => items.iter().map(|v| (None, v)).collect(),
            _ => Vec::new(),
        };

        for (name, raw) in entries {
            let parsed = match name {
                Some(vocabulary) => serde_json::from_value::<ClassificationResult>(raw.clone())
                    .map(|result| VocabularyResult { vocabulary, result }),
                None => serde_json::from_value::<VocabularyResult>(raw.clone()),
            };
            match parsed {
                Ok(entry) => crop.results.push(entry),
                Err(err) => warn!(error = %err, "partial result: skipping malformed vocabulary result"),
            }
        }
        self.normalize(&crop)
    }

    fn fill_species(
        &self,
        crop: &CropClassification,
        plant_type: PlantType,
        out: &mut NormalizedPrediction,
    ) {
        let vocabulary = match plant_type {
            PlantType::Tree => &self.config.tree_species_vocabulary,
            PlantType::Bush => &self.config.bush_species_vocabulary,
        };
        let Some(result) = crop.get(vocabulary) else {
            warn!(vocabulary = %vocabulary, "partial result: species vocabulary missing");
            return;
        };
        let Some(top) = result.top() else {
            info!(vocabulary = %vocabulary, "no species selected");
            return;
        };

        match self.translations.species(&top.label) {
            Some(species) => {
                out.name = species.name.clone();
                out.latin_name = species.latin_name.clone();
            }
            None => out.name = top.label.trim().to_string(),
        }
        out.confidence = clamp_confidence(top.confidence);
        info!(
            vocabulary = %vocabulary,
            label = %top.label,
            name = %out.name,
            confidence = out.confidence,
            "species selected"
        );
    }

    fn collect_defects(
        &self,
        vocabulary: &str,
        result: &ClassificationResult,
        defects: &mut Vec<DefectEntry>,
    ) {
        let mut kept = 0usize;
        for entry in result.entries() {
            let key = self.translations.key(&entry.label);
            let mut display = self.translations.label(&entry.label);
            if self.sentinels.contains(&key)
                || self.sentinels.contains(&display)
                || self.sentinels.contains(&entry.label)
            {
                continue;
            }
            if self.config.lowercase_defect_names {
                display = display.to_lowercase();
            }
            if display.is_empty() {
                continue;
            }
            defects.push(DefectEntry {
                name: display,
                confidence: clamp_confidence(entry.confidence),
            });
            kept += 1;
        }
        info!(
            vocabulary = %vocabulary,
            entries = result.len(),
            kept,
            "defect vocabulary merged"
        );
    }
}

/// De-duplicates by name (highest confidence wins), orders by descending
/// confidence keeping first-seen order on ties, then applies the cap.
fn merge_defects(defects: Vec<DefectEntry>, cap: usize) -> Vec<DefectEntry> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<DefectEntry> = Vec::with_capacity(defects.len());
    for defect in defects {
        match seen.get(&defect.name) {
            Some(&idx) => {
                if defect.confidence > merged[idx].confidence {
                    merged[idx].confidence = defect.confidence;
                }
            }
            None => {
                seen.insert(defect.name.clone(), merged.len());
                merged.push(defect);
            }
        }
    }
    merged.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    merged.truncate(cap);
    merged
}
