//! Chart loading — decodes bmson files into timing events for the core.

pub mod bmson;

pub use bmson::{Bmson, BmsonInfo, BpmEvent, StopEvent};

use thiserror::Error;

use crate::timing::TimingError;

/// Failure to turn a chart file into a timing structure.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("failed to read chart: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid bmson: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Timing(#[from] TimingError),
}
