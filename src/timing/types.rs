//! Timing event data model — the inputs and output records of normalization.

use serde::{Deserialize, Serialize};

use super::pulse::Pulse;

/// An instantaneous tempo change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoChange {
    pub pulse: Pulse,
    /// New tempo in beats per minute.
    pub bpm: f64,
}

impl TempoChange {
    pub fn new(pulse: u64, bpm: f64) -> Self {
        Self {
            pulse: Pulse::from_ticks(pulse),
            bpm,
        }
    }
}

/// A pause ("stop") inserted at a pulse without advancing the pulse position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pause {
    pub pulse: Pulse,
    /// Length of the pause, in pulses at the tempo in effect.
    pub duration: u64,
}

impl Pause {
    pub fn new(pulse: u64, duration: u64) -> Self {
        Self {
            pulse: Pulse::from_ticks(pulse),
            duration,
        }
    }
}

/// One entry of a normalized timing structure.
///
/// Carries at most one tempo change and one accumulated pause. A directive
/// with neither is never produced by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingDirective {
    #[serde(rename = "y")]
    pub pulse: Pulse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<u64>,
}

impl TimingDirective {
    pub fn tempo(pulse: u64, bpm: f64) -> Self {
        Self {
            pulse: Pulse::from_ticks(pulse),
            bpm: Some(bpm),
            stop: None,
        }
    }

    pub fn stop(pulse: u64, duration: u64) -> Self {
        Self {
            pulse: Pulse::from_ticks(pulse),
            bpm: None,
            stop: Some(duration),
        }
    }

    /// Attach a pause to this directive.
    pub fn with_stop(mut self, duration: u64) -> Self {
        self.stop = Some(duration);
        self
    }

    /// Whether the directive carries nothing and would be dropped.
    pub fn is_empty(&self) -> bool {
        self.bpm.is_none() && self.stop.is_none()
    }
}
