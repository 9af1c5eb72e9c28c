use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::keys::normalize_key;

/// Display names of one species.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesName {
    pub name: String,
    #[serde(default)]
    pub latin_name: String,
}

/// Raw label → display string tables, as written in configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationSource {
    pub species: BTreeMap<String, SpeciesName>,
    pub labels: BTreeMap<String, String>,
    pub tree: Option<String>,
    pub bush: Option<String>,
}

/// Lookup tables from internal label keys to display strings.
///
/// Lookups try the raw label first, then its normalized key. Keys in the
/// source may be written either way.
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    prefixes: Vec<String>,
    species: Index<SpeciesName>,
    labels: Index<String>,
    tree: Option<String>,
    bush: Option<String>,
}

#[derive(Debug, Clone)]
struct Index<V> {
    exact: HashMap<String, V>,
    normalized: HashMap<String, V>,
}

impl<V> Default for Index<V> {
    fn default() -> Self {
        Self {
            exact: HashMap::new(),
            normalized: HashMap::new(),
        }
    }
}

impl<V: Clone> Index<V> {
    fn build(source: &BTreeMap<String, V>, prefixes: &[String]) -> Self {
        let mut index = Self::default();
        for (key, value) in source {
            index.exact.insert(key.clone(), value.clone());
            index
                .normalized
                .entry(normalize_key(key, prefixes))
                .or_insert_with(|| value.clone());
        }
        index
    }

    fn get(&self, raw: &str, normalized: &str) -> Option<&V> {
        self.exact.get(raw).or_else(|| self.normalized.get(normalized))
    }
}

impl TranslationTable {
    pub fn new(source: &TranslationSource, prefixes: Vec<String>) -> Self {
        Self {
            species: Index::build(&source.species, &prefixes),
            labels: Index::build(&source.labels, &prefixes),
            tree: source.tree.clone(),
            bush: source.bush.clone(),
            prefixes,
        }
    }

    pub fn key(&self, label: &str) -> String {
        normalize_key(label, &self.prefixes)
    }

    pub fn species(&self, label: &str) -> Option<&SpeciesName> {
        self.species.get(label, &self.key(label))
    }

    /// Display string for a defect label. Unmapped labels pass through trimmed.
    pub fn label(&self, label: &str) -> String {
        self.labels
            .get(label, &self.key(label))
            .cloned()
            .unwrap_or_else(|| label.trim().to_string())
    }

    pub fn type_name(&self, plant_type: crate::PlantType) -> Option<&str> {
        match plant_type {
            crate::PlantType::Tree => self.tree.as_deref(),
            crate::PlantType::Bush => self.bush.as_deref(),
        }
    }
}

/// Labels that carry no information for the user ("normal tree",
/// "straight tree", ...). Matching ignores case and surrounding whitespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentinelSet {
    entries: HashSet<String>,
}

impl SentinelSet {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|s| fold(s.as_ref()))
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains(&fold(label))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn fold(s: &str) -> String {
    s.trim().to_lowercase()
}
