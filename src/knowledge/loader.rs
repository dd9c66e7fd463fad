//! Knowledge table loading.
//!
//! Both JSON and YAML sources are first read into a `serde_json::Value`
//! (declared key order is kept through the `preserve_order` feature) and then
//! walked section by section, so that a malformed entry can be reported by name.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

use super::facts::{ChemicalFact, CropFact};
use super::{KnowledgeBase, canonical_name};

pub const CROPS_SECTION: &str = "CROPS";
pub const PESTS_SECTION: &str = "PESTS";
pub const GENES_SECTION: &str = "GENES";

/// Failure to build a knowledge base. Fatal to startup.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read knowledge source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON knowledge source: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML knowledge source: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("knowledge source is not a mapping of sections")]
    NotAMapping,

    #[error("knowledge source is missing the {0} section")]
    MissingSection(&'static str),

    #[error("malformed knowledge entry {entry}: {reason}")]
    Malformed { entry: String, reason: String },
}

#[derive(Debug, Deserialize)]
struct RawCrop {
    #[serde(default)]
    temp: Option<Vec<f64>>,
    #[serde(default)]
    water: Option<f64>,
    #[serde(default)]
    fert: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawChemical {
    volume_l: f64,
    #[serde(default)]
    targets: Vec<String>,
}

fn malformed(entry: impl Into<String>, reason: impl ToString) -> LoadError {
    LoadError::Malformed {
        entry: entry.into(),
        reason: reason.to_string(),
    }
}

fn section<'a>(root: &'a Map<String, Value>, name: &'static str) -> Result<&'a Map<String, Value>, LoadError> {
    match root.get(name) {
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(malformed(name, "section must be a mapping")),
        None => Err(LoadError::MissingSection(name)),
    }
}

/// Builds a knowledge base from an already-parsed source tree.
pub(crate) fn from_value(root: Value) -> Result<KnowledgeBase, LoadError> {
    let Value::Object(root) = root else {
        return Err(LoadError::NotAMapping);
    };

    let crop_section = section(&root, CROPS_SECTION)?;
    let pest_section = section(&root, PESTS_SECTION)?;
    let gene_section = section(&root, GENES_SECTION)?;

    let mut crops = Vec::with_capacity(crop_section.len());
    for (name, value) in crop_section {
        crops.push((canonical_name(name), parse_crop(name, value)?));
    }

    let mut pests = Vec::with_capacity(pest_section.len());
    for (category, chemicals) in pest_section {
        let Value::Object(chemicals) = chemicals else {
            return Err(malformed(category.as_str(), "pest category must be a mapping"));
        };
        let mut classes = Vec::with_capacity(chemicals.len());
        for (class, value) in chemicals {
            let entry = format!("{}/{}", category, class);
            let raw: RawChemical =
                serde_json::from_value(value.clone()).map_err(|e| malformed(entry, e))?;
            classes.push((
                canonical_name(class),
                ChemicalFact {
                    volume_l: raw.volume_l,
                    targets: raw.targets.iter().map(|t| canonical_name(t)).collect(),
                },
            ));
        }
        pests.push((canonical_name(category), classes));
    }

    let mut genes = HashMap::with_capacity(gene_section.len());
    for (key, value) in gene_section {
        let mut letters = key.trim().chars();
        let letter = match (letters.next(), letters.next()) {
            (Some(letter), None) => letter.to_ascii_uppercase(),
            _ => return Err(malformed(key.as_str(), "gene key must be a single letter")),
        };
        let Value::String(description) = value else {
            return Err(malformed(key.as_str(), "gene description must be a string"));
        };
        genes.insert(letter, description.clone());
    }

    Ok(KnowledgeBase::from_parts(crops, pests, genes))
}

fn parse_crop(name: &str, value: &Value) -> Result<CropFact, LoadError> {
    let raw: RawCrop = serde_json::from_value(value.clone()).map_err(|e| malformed(name, e))?;

    let temperature_range = match raw.temp.as_deref() {
        None | Some([]) => None,
        Some([min, max]) => Some((*min, *max)),
        Some(other) => {
            return Err(malformed(
                name,
                format!("temp must be [min, max], got {} values", other.len()),
            ));
        }
    };

    Ok(CropFact {
        temperature_range,
        water_l: raw.water,
        fertilizer_family: raw.fert,
    })
}
