//! Tunables for the rule engine.
//!
//! Loaded from a settings file (JSON, or YAML by extension) at startup. Keys
//! that are missing take their defaults; unknown keys (capture regions, OCR
//! options) belong to other tools and are ignored.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::knowledge::is_yaml_path;

/// Rule-engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Degrees outside the crop range before a reading becomes WARN
    #[serde(default = "default_temp_delta_near")]
    pub temp_delta_near: f64,
    /// Degrees outside the crop range before a reading becomes CRITICAL
    #[serde(default = "default_temp_delta_warn")]
    pub temp_delta_warn: f64,
    /// Water requirement multiplier applied once per water-demand gene
    #[serde(default = "default_genome_water_multiplier")]
    pub genome_water_multiplier: f64,
    /// Fertilizer dosage as a fraction of the crop's water requirement
    #[serde(default = "default_fertilizer_apply_factor")]
    pub fertilizer_apply_factor: f64,
    /// Minimum fuzzy score (0-100) for a parasite name hint
    #[serde(default = "default_parasite_fuzzy_cutoff")]
    pub parasite_fuzzy_cutoff: f64,
    /// External knowledge table; the embedded table is used when unset
    #[serde(default)]
    pub knowledge_file: Option<PathBuf>,
}

fn default_temp_delta_near() -> f64 {
    0.5
}

fn default_temp_delta_warn() -> f64 {
    2.0
}

fn default_genome_water_multiplier() -> f64 {
    1.15
}

fn default_fertilizer_apply_factor() -> f64 {
    1.0
}

fn default_parasite_fuzzy_cutoff() -> f64 {
    crate::hud::DEFAULT_FUZZY_CUTOFF
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            temp_delta_near: default_temp_delta_near(),
            temp_delta_warn: default_temp_delta_warn(),
            genome_water_multiplier: default_genome_water_multiplier(),
            fertilizer_apply_factor: default_fertilizer_apply_factor(),
            parasite_fuzzy_cutoff: default_parasite_fuzzy_cutoff(),
            knowledge_file: None,
        }
    }
}

impl EngineSettings {
    /// Parses settings text; YAML when `yaml` is set, JSON otherwise.
    pub fn parse_str(source: &str, yaml: bool) -> Result<Self> {
        let settings = if yaml {
            serde_yaml::from_str(source).context("Failed to parse YAML settings")?
        } else {
            serde_json::from_str(source).context("Failed to parse JSON settings")?
        };
        Ok(settings)
    }

    /// Loads settings, failing on a missing or invalid file.
    pub fn load_strict(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        let mut settings = Self::parse_str(&contents, is_yaml_path(path))
            .with_context(|| format!("Invalid settings file: {}", path.display()))?;

        // A relative knowledge path is relative to the settings file
        if let Some(dir) = path.parent() {
            settings.knowledge_file = settings
                .knowledge_file
                .take()
                .map(|knowledge| if knowledge.is_relative() { dir.join(knowledge) } else { knowledge });
        }
        Ok(settings)
    }

    /// Loads settings, or returns defaults if the file is missing or invalid.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            info!(path = %path.display(), "settings file not found, using defaults");
            return Self::default();
        }

        match Self::load_strict(path) {
            Ok(settings) => {
                info!(path = %path.display(), "settings loaded");
                settings
            }
            Err(e) => {
                warn!("{:#}. Using default settings.", e);
                Self::default()
            }
        }
    }
}
