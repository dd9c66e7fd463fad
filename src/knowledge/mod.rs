//! Static crop, pest, and gene facts.
//!
//! A `KnowledgeBase` is built once (from the embedded default table or an
//! external JSON/YAML file) and never mutated afterwards, so it can be shared
//! between threads without locking.

pub mod facts;
pub mod loader;

pub use facts::{ChemicalFact, CropFact, GENE_RULES, GeneTrait, gene_traits};
pub use loader::LoadError;

use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Crop names containing this marker use the vine pest category.
pub const VINE_MARKER: &str = "ВИНОГРАД";
/// Pest category for vines.
pub const VINE_CATEGORY: &str = "ВИНОГРАД";
/// Pest category used for everything else, and as the fallback search scope.
pub const DEFAULT_CATEGORY: &str = "ОБЩИЕ";

const DEFAULT_KNOWLEDGE: &str = include_str!("../../resources/default_knowledge.json");

/// Canonical form of a knowledge-base key: trimmed and uppercased.
pub fn canonical_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// In-memory fact table plus vocabularies derived from it at load time.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    crops: HashMap<String, CropFact>,
    /// Canonical crop names, longest first (stable over declared order)
    crop_vocabulary: Vec<String>,
    /// Category → chemical classes in declared order
    pests: HashMap<String, Vec<(String, ChemicalFact)>>,
    /// Category names in declared order
    pest_categories: Vec<String>,
    /// Every pest target once, in declared order
    pest_targets: Vec<String>,
    genes: HashMap<char, String>,
}

impl KnowledgeBase {
    pub(crate) fn from_parts(
        crops: Vec<(String, CropFact)>,
        pests: Vec<(String, Vec<(String, ChemicalFact)>)>,
        genes: HashMap<char, String>,
    ) -> Self {
        let mut crop_vocabulary: Vec<String> = Vec::with_capacity(crops.len());
        for (name, _) in &crops {
            if !crop_vocabulary.contains(name) {
                crop_vocabulary.push(name.clone());
            }
        }
        // sort_by is stable: equal-length names keep their declared order
        crop_vocabulary.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));

        let pest_categories: Vec<String> = pests.iter().map(|(category, _)| category.clone()).collect();

        let mut pest_targets: Vec<String> = Vec::new();
        for (_, classes) in &pests {
            for (_, chemical) in classes {
                for target in &chemical.targets {
                    if !pest_targets.contains(target) {
                        pest_targets.push(target.clone());
                    }
                }
            }
        }

        Self {
            crops: crops.into_iter().collect(),
            crop_vocabulary,
            pests: pests.into_iter().collect(),
            pest_categories,
            pest_targets,
            genes,
        }
    }

    /// Parses a JSON knowledge table.
    pub fn from_json_str(source: &str) -> Result<Self, LoadError> {
        let value: serde_json::Value = serde_json::from_str(source)?;
        loader::from_value(value)
    }

    /// Parses a YAML knowledge table.
    pub fn from_yaml_str(source: &str) -> Result<Self, LoadError> {
        let value: serde_json::Value = serde_yaml::from_str(source)?;
        loader::from_value(value)
    }

    /// Loads a knowledge table from disk. `.yaml`/`.yml` files are read as YAML,
    /// anything else as JSON.
    pub fn load_from_file(path: &Path) -> Result<Self, LoadError> {
        let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let kb = if is_yaml_path(path) {
            Self::from_yaml_str(&source)?
        } else {
            Self::from_json_str(&source)?
        };

        info!(
            path = %path.display(),
            crops = kb.crops.len(),
            categories = kb.pest_categories.len(),
            "knowledge table loaded"
        );
        Ok(kb)
    }

    /// The table shipped with the crate.
    pub fn load_default() -> Result<Self, LoadError> {
        Self::from_json_str(DEFAULT_KNOWLEDGE)
    }

    /// Exact lookup on the canonical crop name.
    pub fn get_crop(&self, name: &str) -> Option<&CropFact> {
        let key = canonical_name(name);
        if key.is_empty() {
            return None;
        }
        self.crops.get(&key)
    }

    /// Pest category for a crop: vines get their own, everything else the default.
    pub fn pest_category(&self, crop_name: Option<&str>) -> &'static str {
        match crop_name {
            Some(name) if name.to_uppercase().contains(VINE_MARKER) => VINE_CATEGORY,
            _ => DEFAULT_CATEGORY,
        }
    }

    /// Finds the first chemical class (in declared order) controlling the pest.
    ///
    /// Searches the crop's own category first, then the default category.
    pub fn find_chemical(
        &self,
        crop_name: Option<&str>,
        pest_phrase: &str,
    ) -> Option<(&str, &ChemicalFact)> {
        let pest_upper = pest_phrase.to_uppercase();
        let category = self.pest_category(crop_name);

        self.search_category(category, &pest_upper)
            .or_else(|| self.search_category(DEFAULT_CATEGORY, &pest_upper))
    }

    fn search_category(&self, category: &str, pest_upper: &str) -> Option<(&str, &ChemicalFact)> {
        self.pests
            .get(category)?
            .iter()
            .find(|(_, chemical)| chemical.controls(pest_upper))
            .map(|(class, chemical)| (class.as_str(), chemical))
    }

    /// Description of a gene letter (case-insensitive).
    pub fn gene_effect(&self, letter: char) -> Option<&str> {
        self.genes
            .get(&letter.to_ascii_uppercase())
            .map(String::as_str)
    }

    /// Canonical crop names, longest first.
    pub fn crop_names(&self) -> &[String] {
        &self.crop_vocabulary
    }

    /// Pest category names in declared order.
    pub fn pest_categories(&self) -> &[String] {
        &self.pest_categories
    }

    /// Chemical classes of a category in declared order.
    pub fn chemicals(&self, category: &str) -> &[(String, ChemicalFact)] {
        self.pests
            .get(&canonical_name(category))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All known pest names, in declared order.
    pub fn pest_targets(&self) -> &[String] {
        &self.pest_targets
    }
}

pub(crate) fn is_yaml_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml")
    )
}
