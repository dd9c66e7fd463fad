//! Background analysis of many frames.

pub mod queue;
pub mod worker;

pub use queue::{FrameWorkItem, create_work_queue};
pub use worker::{BatchStats, run_frame_worker};
