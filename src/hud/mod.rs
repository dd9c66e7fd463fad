//! HUD text parsing: normalization, per-field extraction, fuzzy matching.
//!
//! Input is the raw OCR text of each named HUD field. `HudParser::parse`
//! normalizes every field and splits the crop block into crop + status; the
//! typed extractors in [`extract`] are then applied by the rule engine.

pub mod extract;
pub mod fuzzy;
pub mod normalize;

pub use extract::{
    extract_crop_and_status, extract_genome, extract_soil, extract_stage, extract_temperature,
    extract_water, parse_decimal, title_case,
};
pub use fuzzy::{DEFAULT_FUZZY_CUTOFF, fuzzy_match, partial_ratio};
pub use normalize::normalize_text;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::knowledge::KnowledgeBase;

pub const FIELD_CROP: &str = "crop";
pub const FIELD_STAGE: &str = "stage";
pub const FIELD_GENOME: &str = "genome";
pub const FIELD_TEMPERATURE: &str = "temperature";
pub const FIELD_WATER: &str = "water";
pub const FIELD_SOIL: &str = "soil";
pub const FIELD_PARASITES: &str = "parasites";

/// Raw OCR text per HUD field name.
pub type FieldMap = HashMap<String, String>;

/// Normalized, not yet interpreted HUD fields of one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    pub crop: Option<String>,
    pub status_text: Option<String>,
    pub stage_text: Option<String>,
    pub genome_text: Option<String>,
    pub temperature_text: Option<String>,
    pub water_text: Option<String>,
    pub soil_text: Option<String>,
    pub parasites_text: Option<String>,
}

/// Parser bound to the vocabularies of one knowledge base.
#[derive(Debug, Clone)]
pub struct HudParser {
    crop_vocabulary: Vec<String>,
    pest_vocabulary: Vec<String>,
    fuzzy_cutoff: f64,
}

impl HudParser {
    pub fn new(knowledge: &KnowledgeBase, fuzzy_cutoff: f64) -> Self {
        Self {
            crop_vocabulary: knowledge.crop_names().to_vec(),
            pest_vocabulary: knowledge.pest_targets().to_vec(),
            fuzzy_cutoff,
        }
    }

    /// Normalizes every field of a frame and splits the crop block.
    pub fn parse(&self, fields: &FieldMap) -> ParseResult {
        let field = |name: &str| -> Option<String> {
            let text = fields.get(name).map(|raw| normalize_text(raw));
            match text {
                Some(text) if !text.is_empty() => Some(text),
                _ => {
                    debug!(field = name, "HUD field missing or empty");
                    None
                }
            }
        };

        let crop_block = field(FIELD_CROP);
        let (crop, status_text) = self.extract_crop_and_status(crop_block.as_deref());

        ParseResult {
            crop,
            status_text,
            stage_text: field(FIELD_STAGE),
            genome_text: field(FIELD_GENOME),
            temperature_text: field(FIELD_TEMPERATURE),
            water_text: field(FIELD_WATER),
            soil_text: field(FIELD_SOIL),
            parasites_text: field(FIELD_PARASITES),
        }
    }

    pub fn extract_crop_and_status(&self, text: Option<&str>) -> (Option<String>, Option<String>) {
        extract_crop_and_status(text, &self.crop_vocabulary)
    }

    /// Closest known pest name for an OCR parasite phrase, if close enough.
    pub fn match_parasite(&self, text: &str) -> Option<&str> {
        fuzzy_match(text, &self.pest_vocabulary, self.fuzzy_cutoff)
    }

    pub fn fuzzy_cutoff(&self) -> f64 {
        self.fuzzy_cutoff
    }
}
