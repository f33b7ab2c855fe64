//! Timing core — turns unordered tempo and stop events into a timing structure.
//!
//! The output of [`normalize`] is what a pulse-to-time mapper walks to build
//! its lookup table. This module never computes elapsed time and never
//! serializes; both are left to the caller.

pub mod error;
pub mod normalizer;
pub mod pulse;
pub mod types;

pub use error::TimingError;
pub use normalizer::{normalize, normalize_checked, TimingEventNormalizer};
pub use pulse::{Pulse, DEFAULT_RESOLUTION};
pub use types::{Pause, TempoChange, TimingDirective};
