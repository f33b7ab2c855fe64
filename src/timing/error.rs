//! Error types for checked normalization.

use thiserror::Error;

use super::pulse::Pulse;

/// Timing input that would corrupt every downstream time computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimingError {
    #[error("tempo at pulse {pulse} is not finite: {bpm}")]
    NonFiniteTempo { pulse: Pulse, bpm: f64 },
    #[error("tempo at pulse {pulse} must be positive, got {bpm}")]
    NonPositiveTempo { pulse: Pulse, bpm: f64 },
    #[error("total stop duration at pulse {pulse} overflows")]
    StopOverflow { pulse: Pulse },
}

impl TimingError {
    /// The pulse of the offending event.
    pub fn pulse(&self) -> Pulse {
        match self {
            TimingError::NonFiniteTempo { pulse, .. }
            | TimingError::NonPositiveTempo { pulse, .. }
            | TimingError::StopOverflow { pulse } => *pulse,
        }
    }
}
