//! Merge of tempo and stop events into a canonical timing structure.
//!
//! Both event kinds are tagged, concatenated behind a synthetic tempo entry
//! for the initial BPM at pulse 0, and stable-sorted by pulse alone. Each
//! distinct pulse then folds into at most one [`TimingDirective`]: the last
//! tempo entry at a pulse wins, stops at a pulse accumulate, and a tempo equal
//! to the previously emitted one is dropped.

use std::collections::BTreeMap;

use log::{debug, trace, warn};

use super::error::TimingError;
use super::pulse::Pulse;
use super::types::{Pause, TempoChange, TimingDirective};

/// A tagged entry of the unified event list.
#[derive(Debug, Clone, Copy)]
enum Entry {
    Tempo(f64),
    Stop(u64),
}

/// Collects tempo and stop events for a single chart and normalizes them.
#[derive(Debug, Clone)]
pub struct TimingEventNormalizer {
    initial_bpm: f64,
    tempo_events: Vec<TempoChange>,
    pause_events: Vec<Pause>,
}

impl TimingEventNormalizer {
    /// Create a normalizer with the tempo in effect at pulse 0.
    pub fn new(initial_bpm: f64) -> Self {
        Self {
            initial_bpm,
            tempo_events: Vec::new(),
            pause_events: Vec::new(),
        }
    }

    pub fn initial_bpm(&self) -> f64 {
        self.initial_bpm
    }

    pub fn add_tempo(&mut self, event: TempoChange) {
        self.tempo_events.push(event);
    }

    pub fn add_pause(&mut self, event: Pause) {
        self.pause_events.push(event);
    }

    /// Append tempo changes, keeping their order for same-pulse resolution.
    pub fn extend_tempo(&mut self, events: impl IntoIterator<Item = TempoChange>) {
        self.tempo_events.extend(events);
    }

    pub fn extend_pauses(&mut self, events: impl IntoIterator<Item = Pause>) {
        self.pause_events.extend(events);
    }

    /// Number of explicit events collected (the initial tempo is not counted).
    pub fn len(&self) -> usize {
        self.tempo_events.len() + self.pause_events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn normalize(&self) -> Vec<TimingDirective> {
        normalize(self.initial_bpm, &self.tempo_events, &self.pause_events)
    }

    pub fn normalize_checked(&self) -> Result<Vec<TimingDirective>, TimingError> {
        normalize_checked(self.initial_bpm, &self.tempo_events, &self.pause_events)
    }
}

/// Merge an initial tempo, tempo changes and pauses into a timing structure.
///
/// The output is strictly ascending by pulse and always starts with a
/// directive at pulse 0 carrying a tempo. Inputs may be unsorted and may
/// share pulses. Values are not validated; see [`normalize_checked`].
pub fn normalize(
    initial_bpm: f64,
    tempo_events: &[TempoChange],
    pause_events: &[Pause],
) -> Vec<TimingDirective> {
    debug!(
        "normalizing {} tempo and {} stop events (initial bpm {initial_bpm})",
        tempo_events.len(),
        pause_events.len()
    );

    let mut entries: Vec<(Pulse, Entry)> =
        std::iter::once((Pulse::ZERO, Entry::Tempo(initial_bpm)))
            .chain(tempo_events.iter().map(|e| (e.pulse, Entry::Tempo(e.bpm))))
            .chain(pause_events.iter().map(|e| (e.pulse, Entry::Stop(e.duration))))
            .collect();
    // Stable, and keyed on pulse only: ties keep input order.
    entries.sort_by_key(|&(pulse, _)| pulse);

    // The comparison state starts unset, so pulse 0 always emits its tempo.
    let (_, directives) = pulse_groups(&entries).fold(
        (None::<f64>, Vec::<TimingDirective>::new()),
        |(last_bpm, mut out), (pulse, group)| {
            let tempo = group.iter().rev().find_map(|&(_, entry)| match entry {
                Entry::Tempo(bpm) => Some(bpm),
                Entry::Stop(_) => None,
            });
            // Saturating: a total past u64::MAX stays at u64::MAX.
            let stop = group
                .iter()
                .filter_map(|&(_, entry)| match entry {
                    Entry::Stop(duration) => Some(duration),
                    Entry::Tempo(_) => None,
                })
                .fold(0u64, u64::saturating_add);

            let bpm = tempo.filter(|&bpm| last_bpm != Some(bpm));
            if tempo.is_some() && bpm.is_none() {
                trace!("dropping unchanged tempo at pulse {pulse}");
            }

            let directive = TimingDirective {
                pulse,
                bpm,
                stop: (stop > 0).then_some(stop),
            };
            if !directive.is_empty() {
                out.push(directive);
            }
            (bpm.or(last_bpm), out)
        },
    );

    directives
}

/// Like [`normalize`], but rejects the whole call on an unusable tempo or on
/// stops whose total at one pulse does not fit in a `u64`.
///
/// The initial tempo is reported at pulse 0.
pub fn normalize_checked(
    initial_bpm: f64,
    tempo_events: &[TempoChange],
    pause_events: &[Pause],
) -> Result<Vec<TimingDirective>, TimingError> {
    validate(initial_bpm, tempo_events, pause_events).map_err(|e| {
        warn!("rejecting timing events: {e}");
        e
    })?;

    Ok(normalize(initial_bpm, tempo_events, pause_events))
}

fn validate(
    initial_bpm: f64,
    tempo_events: &[TempoChange],
    pause_events: &[Pause],
) -> Result<(), TimingError> {
    std::iter::once((Pulse::ZERO, initial_bpm))
        .chain(tempo_events.iter().map(|e| (e.pulse, e.bpm)))
        .try_for_each(|(pulse, bpm)| check_tempo(pulse, bpm))?;

    let mut totals: BTreeMap<Pulse, u64> = BTreeMap::new();
    for pause in pause_events {
        let total = totals.entry(pause.pulse).or_default();
        *total = total
            .checked_add(pause.duration)
            .ok_or(TimingError::StopOverflow { pulse: pause.pulse })?;
    }
    Ok(())
}

fn check_tempo(pulse: Pulse, bpm: f64) -> Result<(), TimingError> {
    if !bpm.is_finite() {
        Err(TimingError::NonFiniteTempo { pulse, bpm })
    } else if bpm <= 0.0 {
        Err(TimingError::NonPositiveTempo { pulse, bpm })
    } else {
        Ok(())
    }
}

/// Split a pulse-sorted slice into runs sharing the same pulse.
fn pulse_groups<T>(sorted: &[(Pulse, T)]) -> impl Iterator<Item = (Pulse, &[(Pulse, T)])> + '_ {
    let mut rest = sorted;
    std::iter::from_fn(move || {
        let pulse = rest.first()?.0;
        let len = rest.iter().take_while(|(p, _)| *p == pulse).count();
        let (group, tail) = rest.split_at(len);
        rest = tail;
        Some((pulse, group))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulses(directives: &[TimingDirective]) -> Vec<u64> {
        directives.iter().map(|d| d.pulse.ticks()).collect()
    }

    #[test]
    fn no_events_yields_initial_tempo_only() {
        let out = normalize(120.0, &[], &[]);
        assert_eq!(out, vec![TimingDirective::tempo(0, 120.0)]);
    }

    #[test]
    fn unchanged_tempo_is_dropped() {
        let out = normalize(120.0, &[TempoChange::new(480, 120.0)], &[]);
        assert_eq!(out, vec![TimingDirective::tempo(0, 120.0)]);
    }

    #[test]
    fn tempo_and_stop_share_a_directive() {
        let out = normalize(
            120.0,
            &[TempoChange::new(480, 140.0)],
            &[Pause::new(480, 2)],
        );
        assert_eq!(
            out,
            vec![
                TimingDirective::tempo(0, 120.0),
                TimingDirective::tempo(480, 140.0).with_stop(2),
            ]
        );
    }

    #[test]
    fn explicit_initial_duplicate_still_emits_pulse_zero() {
        let out = normalize(100.0, &[TempoChange::new(0, 100.0)], &[]);
        assert_eq!(out, vec![TimingDirective::tempo(0, 100.0)]);
    }

    #[test]
    fn zero_length_stop_emits_nothing() {
        let out = normalize(120.0, &[], &[Pause::new(960, 0)]);
        assert_eq!(out, vec![TimingDirective::tempo(0, 120.0)]);
    }

    #[test]
    fn stops_at_same_pulse_accumulate() {
        let out = normalize(120.0, &[], &[Pause::new(240, 30), Pause::new(240, 12)]);
        assert_eq!(out[1], TimingDirective::stop(240, 42));
    }

    #[test]
    fn huge_stops_at_one_pulse_saturate() {
        let half = u64::MAX / 2 + 1;
        let out = normalize(120.0, &[], &[Pause::new(480, half), Pause::new(480, half)]);
        assert_eq!(
            out,
            vec![
                TimingDirective::tempo(0, 120.0),
                TimingDirective::stop(480, u64::MAX),
            ]
        );
    }

    #[test]
    fn max_stop_alone_is_kept_exactly() {
        let out = normalize(120.0, &[], &[Pause::new(960, u64::MAX), Pause::new(960, 0)]);
        assert_eq!(out[1], TimingDirective::stop(960, u64::MAX));
    }

    #[test]
    fn checked_rejects_overflowing_stop_total() {
        let half = u64::MAX / 2 + 1;
        let err = normalize_checked(120.0, &[], &[Pause::new(480, half), Pause::new(480, half)])
            .unwrap_err();
        assert_eq!(
            err,
            TimingError::StopOverflow {
                pulse: Pulse::from_ticks(480)
            }
        );
    }

    #[test]
    fn checked_accepts_large_stops_at_distinct_pulses() {
        let half = u64::MAX / 2 + 1;
        let pauses = [Pause::new(480, half), Pause::new(960, half)];
        assert_eq!(
            normalize_checked(120.0, &[], &pauses).unwrap(),
            normalize(120.0, &[], &pauses)
        );
    }

    #[test]
    fn last_tempo_at_a_pulse_wins() {
        let out = normalize(
            120.0,
            &[TempoChange::new(480, 150.0), TempoChange::new(480, 180.0)],
            &[],
        );
        assert_eq!(out[1], TimingDirective::tempo(480, 180.0));
    }

    #[test]
    fn explicit_tempo_at_zero_overrides_initial() {
        let out = normalize(120.0, &[TempoChange::new(0, 90.0)], &[]);
        assert_eq!(out, vec![TimingDirective::tempo(0, 90.0)]);
    }

    #[test]
    fn stop_at_zero_joins_initial_tempo() {
        let out = normalize(120.0, &[], &[Pause::new(0, 48)]);
        assert_eq!(out, vec![TimingDirective::tempo(0, 120.0).with_stop(48)]);
    }

    #[test]
    fn unsorted_input_is_ordered() {
        let out = normalize(
            120.0,
            &[
                TempoChange::new(1920, 160.0),
                TempoChange::new(480, 140.0),
            ],
            &[Pause::new(960, 10), Pause::new(240, 5)],
        );
        assert_eq!(pulses(&out), vec![0, 240, 480, 960, 1920]);
    }

    #[test]
    fn stop_alone_keeps_tempo_state() {
        // 140 at 960 equals the tempo set at 480; the stop in between must not reset it.
        let out = normalize(
            120.0,
            &[TempoChange::new(480, 140.0), TempoChange::new(960, 140.0)],
            &[Pause::new(720, 24)],
        );
        assert_eq!(
            out,
            vec![
                TimingDirective::tempo(0, 120.0),
                TimingDirective::tempo(480, 140.0),
                TimingDirective::stop(720, 24),
            ]
        );
    }

    #[test]
    fn redundant_tempo_with_stop_keeps_stop_only() {
        let out = normalize(
            120.0,
            &[TempoChange::new(480, 120.0)],
            &[Pause::new(480, 60)],
        );
        assert_eq!(out[1], TimingDirective::stop(480, 60));
    }

    #[test]
    fn returning_to_an_earlier_tempo_is_emitted() {
        let out = normalize(
            120.0,
            &[TempoChange::new(480, 140.0), TempoChange::new(960, 120.0)],
            &[],
        );
        assert_eq!(out[2], TimingDirective::tempo(960, 120.0));
    }

    #[test]
    fn checked_rejects_bad_initial_tempo() {
        let err = normalize_checked(0.0, &[], &[]).unwrap_err();
        assert_eq!(
            err,
            TimingError::NonPositiveTempo {
                pulse: Pulse::ZERO,
                bpm: 0.0
            }
        );
    }

    #[test]
    fn checked_rejects_non_finite_event() {
        let err = normalize_checked(120.0, &[TempoChange::new(480, f64::INFINITY)], &[])
            .unwrap_err();
        assert!(matches!(err, TimingError::NonFiniteTempo { .. }));
        assert_eq!(err.pulse(), Pulse::from_ticks(480));
    }

    #[test]
    fn checked_matches_unchecked_on_valid_input() {
        let tempo = [TempoChange::new(480, 140.0)];
        let pauses = [Pause::new(240, 12)];
        assert_eq!(
            normalize_checked(120.0, &tempo, &pauses).unwrap(),
            normalize(120.0, &tempo, &pauses)
        );
    }

    #[test]
    fn normalizer_collects_events() {
        let mut n = TimingEventNormalizer::new(150.0);
        assert!(n.is_empty());
        n.add_tempo(TempoChange::new(960, 75.0));
        n.add_pause(Pause::new(960, 240));
        n.extend_tempo([TempoChange::new(1920, 150.0)]);
        n.extend_pauses([Pause::new(0, 0)]);
        assert_eq!(n.len(), 4);
        assert_eq!(n.initial_bpm(), 150.0);

        assert_eq!(
            n.normalize(),
            vec![
                TimingDirective::tempo(0, 150.0),
                TimingDirective::tempo(960, 75.0).with_stop(240),
                TimingDirective::tempo(1920, 150.0),
            ]
        );
        assert_eq!(n.normalize_checked().unwrap(), n.normalize());
    }

    #[test]
    fn pulse_groups_split_runs() {
        let sorted = [
            (Pulse::from_ticks(0), 'a'),
            (Pulse::from_ticks(0), 'b'),
            (Pulse::from_ticks(5), 'c'),
        ];
        let groups: Vec<_> = pulse_groups(&sorted).map(|(p, g)| (p.ticks(), g.len())).collect();
        assert_eq!(groups, vec![(0, 2), (5, 1)]);
    }
}
