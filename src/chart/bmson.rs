//! The timing-relevant subset of a bmson chart.
//!
//! Only `info.init_bpm`, `info.resolution`, `bpm_events` and `stop_events`
//! are read; everything else in the document is ignored.

use std::path::Path;

use log::info;
use serde::Deserialize;

use super::ChartError;
use crate::timing::{
    normalize, normalize_checked, Pause, TempoChange, TimingDirective, DEFAULT_RESOLUTION,
};

/// Chart header fields needed for timing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BmsonInfo {
    pub init_bpm: f64,
    /// Pulses per quarter note.
    #[serde(default = "BmsonInfo::default_resolution")]
    pub resolution: u64,
}

impl BmsonInfo {
    fn default_resolution() -> u64 {
        DEFAULT_RESOLUTION
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BpmEvent {
    pub y: u64,
    pub bpm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StopEvent {
    pub y: u64,
    /// Older charts name this field `value`. A stop carrying both keys is
    /// rejected as a duplicate field.
    #[serde(alias = "value")]
    pub duration: u64,
}

/// A bmson document reduced to its timing events.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Bmson {
    pub info: BmsonInfo,
    #[serde(default)]
    pub bpm_events: Vec<BpmEvent>,
    #[serde(default)]
    pub stop_events: Vec<StopEvent>,
}

impl Bmson {
    pub fn from_json_str(json: &str) -> Result<Self, ChartError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and decode a chart file.
    pub fn from_path(path: &Path) -> Result<Self, ChartError> {
        let content = std::fs::read_to_string(path)?;
        let chart = Self::from_json_str(&content)?;
        info!(
            "loaded {}: {} bpm events, {} stop events",
            path.display(),
            chart.bpm_events.len(),
            chart.stop_events.len()
        );
        Ok(chart)
    }

    pub fn tempo_events(&self) -> Vec<TempoChange> {
        self.bpm_events
            .iter()
            .map(|e| TempoChange::new(e.y, e.bpm))
            .collect()
    }

    pub fn pause_events(&self) -> Vec<Pause> {
        self.stop_events
            .iter()
            .map(|e| Pause::new(e.y, e.duration))
            .collect()
    }

    /// Normalized timing structure, with `init_bpm` anchored at pulse 0.
    pub fn timing_structure(&self) -> Vec<TimingDirective> {
        normalize(self.info.init_bpm, &self.tempo_events(), &self.pause_events())
    }

    /// Like [`Bmson::timing_structure`], but fails on a non-finite or non-positive tempo.
    pub fn timing_structure_checked(&self) -> Result<Vec<TimingDirective>, ChartError> {
        Ok(normalize_checked(
            self.info.init_bpm,
            &self.tempo_events(),
            &self.pause_events(),
        )?)
    }
}
