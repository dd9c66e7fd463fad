//! Output side of an analysis: advice lines, frame summary, journal.

pub mod journal;
pub mod recommend;
pub mod summary;

pub use journal::{Journal, LogLevel, save_json};
pub use recommend::build_recommendations;
pub use summary::{FrameSummary, UNKNOWN_CROP};

use anyhow::Result;
use std::path::Path;

use crate::pipeline::Analysis;

/// Journals one analyzed frame: summary line, headline, then each advice line.
///
/// Optionally also writes the summary to `save_json`.
pub fn render_frame(analysis: &Analysis, journal: &Journal, save_json_path: Option<&Path>) -> Result<FrameSummary> {
    let summary = FrameSummary::from_metrics(&analysis.metrics);

    journal.log_json(&summary)?;
    journal.log(LogLevel::Info, &summary.headline(), Some(&summary))?;
    for recommendation in &analysis.recommendations {
        journal.log::<FrameSummary>(LogLevel::Advice, recommendation, None)?;
    }

    if let Some(path) = save_json_path {
        save_json(&summary, path)?;
    }
    Ok(summary)
}
