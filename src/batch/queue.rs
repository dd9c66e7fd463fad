//! Work queue between the frame producer and the analysis worker.
//!
//! A plain `std::sync::mpsc` channel: the producer sends frame files, the
//! worker receives them in order and exits once every sender is dropped.

use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender, channel};

/// One frame file waiting to be analyzed.
#[derive(Debug, Clone)]
pub struct FrameWorkItem {
    /// JSON file of raw HUD field text
    pub frame_path: PathBuf,
    /// Frame number within the batch (1-based)
    pub sequence: u32,
    pub queued_at: DateTime<Local>,
}

impl FrameWorkItem {
    pub fn new(frame_path: PathBuf, sequence: u32) -> Self {
        Self {
            frame_path,
            sequence,
            queued_at: Local::now(),
        }
    }
}

/// Creates an unbounded frame queue. Frames pile up if analysis is slower
/// than the producer.
pub fn create_work_queue() -> (Sender<FrameWorkItem>, Receiver<FrameWorkItem>) {
    channel()
}
