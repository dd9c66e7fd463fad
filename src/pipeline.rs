//! End-to-end analysis of one frame: raw field text in, metrics and advice out.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::hud::FieldMap;
use crate::knowledge::KnowledgeBase;
use crate::report::build_recommendations;
use crate::rules::{CropMetrics, EngineSettings, RuleEngine};

/// Result of analyzing one frame.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub metrics: CropMetrics,
    pub recommendations: Vec<String>,
}

/// Parses, evaluates and formats one frame of HUD fields.
pub fn analyze(engine: &RuleEngine, fields: &FieldMap) -> Analysis {
    let parsed = engine.parser().parse(fields);
    let metrics = engine.evaluate(&parsed);
    let recommendations = build_recommendations(&metrics);
    Analysis {
        metrics,
        recommendations,
    }
}

/// Reads a frame file: a JSON object of field name → raw OCR text.
pub fn read_fields(path: &Path) -> Result<FieldMap> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read frame file: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Frame file is not a field-name → text object: {}", path.display()))
}

/// Loads the knowledge table and builds an engine.
///
/// `knowledge_override` wins over `settings.knowledge_file`; with neither the
/// embedded default table is used.
pub fn load_engine(settings: EngineSettings, knowledge_override: Option<&Path>) -> Result<RuleEngine> {
    let knowledge_path = knowledge_override.or(settings.knowledge_file.as_deref());
    let knowledge = match knowledge_path {
        Some(path) => KnowledgeBase::load_from_file(path)
            .with_context(|| format!("Failed to load knowledge table: {}", path.display()))?,
        None => {
            info!("using embedded knowledge table");
            KnowledgeBase::load_default().context("Embedded knowledge table is invalid")?
        }
    };
    Ok(RuleEngine::new(Arc::new(knowledge), settings))
}
