use serde::{Deserialize, Serialize};

/// Static agronomic facts for one crop.
///
/// Every field is optional: the table may know the water demand of a vine
/// without knowing its temperature range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropFact {
    /// Comfortable temperature range (min, max) in °C
    pub temperature_range: Option<(f64, f64)>,
    /// Water requirement in liters
    pub water_l: Option<f64>,
    /// Fertilizer family label (e.g. "АЗОТНЫЕ")
    pub fertilizer_family: Option<String>,
}

/// One chemical class within a pest category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChemicalFact {
    /// Volume of the treatment in liters
    pub volume_l: f64,
    /// Uppercased pest names this class controls
    pub targets: Vec<String>,
}

impl ChemicalFact {
    /// Returns true if any target is a substring of the (already uppercased) pest phrase.
    pub fn controls(&self, pest_upper: &str) -> bool {
        self.targets
            .iter()
            .any(|target| pest_upper.contains(target.as_str()))
    }
}

/// What a gene letter does beyond its description text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneTrait {
    /// Multiplies the water requirement by the configured genome multiplier
    WaterDemand,
    /// Raises the parasite risk flag
    ParasiteRisk,
}

/// Behavioral gene rules, keyed by uppercase letter.
///
/// Descriptions in the knowledge table are display text only; editing them
/// never changes these rules.
pub const GENE_RULES: &[(char, GeneTrait)] = &[
    ('W', GeneTrait::WaterDemand),
    ('X', GeneTrait::ParasiteRisk),
];

/// Returns the behavioral traits of a gene letter (case-insensitive).
pub fn gene_traits(letter: char) -> impl Iterator<Item = GeneTrait> {
    let letter = letter.to_ascii_uppercase();
    GENE_RULES
        .iter()
        .filter(move |(code, _)| *code == letter)
        .map(|(_, gene_trait)| *gene_trait)
}
