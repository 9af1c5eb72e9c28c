use serde::{Deserialize, Serialize};

use crate::keys::default_prefixes;
use crate::MergeError;

/// Cap on merged defects per crop when configuration does not set one.
pub const DEFAULT_MAX_DEFECTS: usize = 5;

/// Which vocabularies play which role in a merged prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Best-of vocabulary deciding tree vs. bush.
    pub type_vocabulary: String,
    pub tree_keyword: String,
    pub bush_keyword: String,
    pub tree_species_vocabulary: String,
    pub bush_species_vocabulary: String,
    /// Defect vocabularies in merge order. Each one applies to the type its
    /// name mentions, or to both when it mentions neither.
    pub defect_vocabularies: Vec<String>,
    pub key_prefixes: Vec<String>,
    pub max_defects_per_crop: usize,
    /// Lowercase defect display names before emitting them.
    pub lowercase_defect_names: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            type_vocabulary: "tree or bush".into(),
            tree_keyword: "tree".into(),
            bush_keyword: "bush".into(),
            tree_species_vocabulary: "tree species".into(),
            bush_species_vocabulary: "bush species".into(),
            defect_vocabularies: vec![
                "tree problems".into(),
                "bush problems".into(),
                "bush dry branches".into(),
                "tree is leaning".into(),
            ],
            key_prefixes: default_prefixes(),
            max_defects_per_crop: DEFAULT_MAX_DEFECTS,
            lowercase_defect_names: true,
        }
    }
}

impl NormalizerConfig {
    pub fn validate(&self) -> Result<(), MergeError> {
        if self.type_vocabulary.trim().is_empty() {
            return Err(MergeError::InvalidConfig("type_vocabulary is empty".into()));
        }
        let tree = self.tree_keyword.trim().to_lowercase();
        let bush = self.bush_keyword.trim().to_lowercase();
        if tree.is_empty() || bush.is_empty() {
            return Err(MergeError::InvalidConfig("type keywords must not be empty".into()));
        }
        if tree.contains(&bush) || bush.contains(&tree) {
            return Err(MergeError::InvalidConfig(format!(
                "type keywords `{tree}` and `{bush}` overlap"
            )));
        }
        if self.max_defects_per_crop == 0 {
            return Err(MergeError::InvalidConfig(
                "max_defects_per_crop must be at least 1".into(),
            ));
        }
        for name in &self.defect_vocabularies {
            if name == &self.type_vocabulary
                || name == &self.tree_species_vocabulary
                || name == &self.bush_species_vocabulary
            {
                return Err(MergeError::InvalidConfig(format!(
                    "`{name}` cannot be both a defect vocabulary and a type/species vocabulary"
                )));
            }
        }
        Ok(())
    }

    /// Every vocabulary the normalizer reads, for cross-checking configuration.
    pub fn referenced_vocabularies(&self) -> Vec<&str> {
        let mut names = vec![
            self.type_vocabulary.as_str(),
            self.tree_species_vocabulary.as_str(),
            self.bush_species_vocabulary.as_str(),
        ];
        names.extend(self.defect_vocabularies.iter().map(String::as_str));
        names
    }
}
