//! Farm HUD assistant.
//!
//! Interprets OCR text scraped from a farming game's crop-status panel:
//! normalizes and extracts each HUD field, grades the readings against a crop
//! knowledge table, and produces advice lines.
//!
//! ```no_run
//! use farm_hud_assistant::hud::FieldMap;
//! use farm_hud_assistant::pipeline::{analyze, load_engine};
//! use farm_hud_assistant::rules::EngineSettings;
//!
//! let engine = load_engine(EngineSettings::default(), None)?;
//! let mut fields = FieldMap::new();
//! fields.insert("crop".into(), "Кукуруза Посажено".into());
//! fields.insert("water".into(), "4.0 л. / 5.0 л.".into());
//!
//! for line in analyze(&engine, &fields).recommendations {
//!     println!("{}", line);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod batch;
pub mod hud;
pub mod knowledge;
pub mod paths;
pub mod pipeline;
pub mod report;
pub mod rules;

pub use hud::{FieldMap, HudParser, ParseResult};
pub use knowledge::{KnowledgeBase, LoadError};
pub use pipeline::{Analysis, analyze};
pub use rules::{CropMetrics, EngineSettings, RuleEngine, Severity};
