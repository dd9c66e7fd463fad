//! Rule engine: turns parsed HUD fields into classified metrics.

pub mod config;
pub mod engine;
pub mod metrics;

pub use config::EngineSettings;
pub use engine::{
    FERTILIZER_KEYWORD, FERTILIZER_RATIONALE, NO_PARASITES, PARASITE_ALERT, PARASITE_RISK_RAISED,
    RuleEngine, TEMPERATURE_UNIT, WATER_UNIT, classify_temperature, classify_water,
};
pub use metrics::{BarReading, CropMetrics, FertilizerAdvice, GenomeInfo, ParasiteInfo, Severity};
