//! The diagnostic record produced for one HUD frame.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Urgency of a reading. Ordered: `Ok < Near < Warn < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    #[default]
    Ok,
    Near,
    Warn,
    Critical,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Near => "NEAR",
            Severity::Warn => "WARN",
            Severity::Critical => "CRITICAL",
        }
    }

    /// WARN and above are raised as alerts.
    pub fn is_alert(&self) -> bool {
        *self >= Severity::Warn
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A HUD bar (temperature or water) with its classification.
///
/// `None` values mean "unknown", never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarReading {
    pub current: Option<f64>,
    pub target: Option<f64>,
    pub required: Option<f64>,
    pub unit: String,
    pub status: Severity,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeInfo {
    pub sequence: String,
    pub effects: Vec<String>,
    pub risk: Option<String>,
    /// Product of all water-demand genes' multipliers
    pub water_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParasiteInfo {
    pub detected: String,
    pub status: Severity,
    pub recommendation: Option<String>,
    pub chemical_class: Option<String>,
    pub volume_l: Option<f64>,
    /// 1.0 when a treatment was identified, 0.0 otherwise
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FertilizerAdvice {
    pub family: Option<String>,
    pub recommended: bool,
    pub dosage_l: Option<f64>,
    pub rationale: Option<String>,
}

/// Everything the rule engine concluded about one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropMetrics {
    pub crop: Option<String>,
    pub status_text: Option<String>,
    pub stage: Option<String>,
    pub stage_percent: Option<f64>,
    pub genome: Option<GenomeInfo>,
    pub temperature: Option<BarReading>,
    pub water: Option<BarReading>,
    pub soil_pct: Option<f64>,
    pub parasites: ParasiteInfo,
    pub fertilizer: FertilizerAdvice,
    pub alerts: Vec<String>,
    /// Creation time, for logging only
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Ok < Severity::Near);
        assert!(Severity::Near < Severity::Warn);
        assert!(Severity::Warn < Severity::Critical);
        assert!(!Severity::Near.is_alert());
        assert!(Severity::Warn.is_alert());
        assert!(Severity::Critical.is_alert());
    }

    #[test]
    fn test_severity_serializes_as_label() {
        assert_eq!(serde_json::to_string(&Severity::Critical).unwrap(), "\"CRITICAL\"");
        assert_eq!(serde_json::from_str::<Severity>("\"NEAR\"").unwrap(), Severity::Near);
        assert_eq!(Severity::Warn.to_string(), "WARN");
    }
}
