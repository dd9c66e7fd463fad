//! Analysis worker thread.
//!
//! Receives frame files from the work queue, analyzes each with a shared
//! engine and journals the result. An unreadable frame is logged and skipped;
//! the batch keeps going.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use tracing::{info, warn};

use super::queue::FrameWorkItem;
use crate::pipeline::{analyze, read_fields};
use crate::report::{Journal, render_frame};
use crate::rules::RuleEngine;

/// Counters reported when the worker exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub analyzed: u32,
    pub skipped: u32,
    /// Frames with at least one alert
    pub alerted: u32,
}

/// Runs the worker loop until the channel closes (all senders dropped).
///
/// Blocks; run it on a dedicated thread.
pub fn run_frame_worker(receiver: Receiver<FrameWorkItem>, engine: Arc<RuleEngine>, journal: Journal) -> BatchStats {
    info!("frame worker started");
    let mut stats = BatchStats::default();

    for work_item in receiver {
        info!(
            sequence = work_item.sequence,
            frame = %work_item.frame_path.display(),
            "analyzing frame"
        );

        let fields = match read_fields(&work_item.frame_path) {
            Ok(fields) => fields,
            Err(e) => {
                warn!(sequence = work_item.sequence, "skipping frame: {:#}", e);
                stats.skipped += 1;
                continue;
            }
        };

        let analysis = analyze(&engine, &fields);
        if !analysis.metrics.alerts.is_empty() {
            stats.alerted += 1;
        }
        stats.analyzed += 1;

        if let Err(e) = render_frame(&analysis, &journal, None) {
            // The analysis itself succeeded; only the journal line is lost
            warn!(sequence = work_item.sequence, "failed to journal frame: {:#}", e);
        }
    }

    info!(
        analyzed = stats.analyzed,
        skipped = stats.skipped,
        alerted = stats.alerted,
        "frame worker finished"
    );
    stats
}
