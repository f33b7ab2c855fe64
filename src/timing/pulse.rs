//! Chart time measured in integer pulses.
//!
//! A pulse is the smallest unit of a bmson timeline. How many pulses make up a
//! quarter note is a per-chart property (`info.resolution`); the timing core
//! never needs it, only the ordering of pulses.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Pulses per quarter note when a chart does not declare a resolution.
pub const DEFAULT_RESOLUTION: u64 = 240;

/// A position on the chart timeline. Ordered by pulse count.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Pulse {
    ticks: u64,
}

impl Pulse {
    /// The start of the chart.
    pub const ZERO: Pulse = Pulse { ticks: 0 };

    pub fn from_ticks(ticks: u64) -> Self {
        Self { ticks }
    }

    pub fn ticks(self) -> u64 {
        self.ticks
    }

    /// Fractional quarter-note position at the given resolution.
    pub fn as_beats_f64(self, resolution: u64) -> f64 {
        self.ticks as f64 / resolution as f64
    }
}

impl fmt::Display for Pulse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ticks)
    }
}
