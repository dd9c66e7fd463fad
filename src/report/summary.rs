//! Flat per-frame summary written to the journal and to `--save-json` files.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::rules::{BarReading, CropMetrics, FertilizerAdvice, ParasiteInfo, Severity};

/// Headline crop label when the crop block could not be read.
pub const UNKNOWN_CROP: &str = "Неизвестная культура";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSummary {
    /// RFC 3339 creation time of the metrics
    pub timestamp: String,
    pub crop: Option<String>,
    pub stage: Option<String>,
    pub stage_percent: Option<f64>,
    /// Genome letter sequence only
    pub genome: Option<String>,
    pub temperature: Option<BarReading>,
    pub water: Option<BarReading>,
    pub soil_pct: Option<f64>,
    pub parasites: ParasiteInfo,
    pub fertilizer: FertilizerAdvice,
    pub alerts: Vec<String>,
}

impl FrameSummary {
    pub fn from_metrics(metrics: &CropMetrics) -> Self {
        Self {
            timestamp: metrics.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            crop: metrics.crop.clone(),
            stage: metrics.stage.clone(),
            stage_percent: metrics.stage_percent,
            genome: metrics.genome.as_ref().map(|genome| genome.sequence.clone()),
            temperature: metrics.temperature.clone(),
            water: metrics.water.clone(),
            soil_pct: metrics.soil_pct,
            parasites: metrics.parasites.clone(),
            fertilizer: metrics.fertilizer.clone(),
            alerts: metrics.alerts.clone(),
        }
    }

    /// One-line console title: `[<temperature severity>] <crop>`.
    pub fn headline(&self) -> String {
        let status = self
            .temperature
            .as_ref()
            .map(|temperature| temperature.status)
            .unwrap_or(Severity::Ok);
        format!("[{}] {}", status, self.crop.as_deref().unwrap_or(UNKNOWN_CROP))
    }
}
