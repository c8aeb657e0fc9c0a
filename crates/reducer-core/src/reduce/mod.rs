//! Density-adaptive difficulty reduction.
//!
//! The minimum spacing of a derived tier scales with the median gap between
//! Expert chords, so dense charts are thinned harder than sparse ones.

mod chord;

use std::collections::BTreeSet;

use tracing::debug;

use crate::chart::{NoteEvent, group_by_tick};
use crate::config::TierRule;

pub use chord::reduce_chord;

/// Median of the positive gaps between consecutive distinct ticks.
///
/// For an even number of gaps this is the upper-middle one. `None` when
/// there are fewer than two distinct ticks.
pub fn median_gap(ticks: &[u32]) -> Option<u32> {
    let mut gaps: Vec<u32> = ticks
        .windows(2)
        .map(|pair| pair[1].saturating_sub(pair[0]))
        .filter(|&gap| gap > 0)
        .collect();
    if gaps.is_empty() {
        return None;
    }
    gaps.sort_unstable();
    Some(gaps[gaps.len() / 2])
}

/// Minimum accepted gap for a tier: `floor(median * multiplier)`.
pub fn minimum_gap(median: u32, tier: &TierRule) -> u64 {
    (f64::from(median) * tier.spacing_multiplier).floor() as u64
}

/// Derive a lower-difficulty sequence from Expert notes.
///
/// Ticks in `forced` bypass the spacing check but still go through the lane
/// and chord limits. The output is sorted by tick, then lane.
pub fn reduce(expert: &[NoteEvent], tier: &TierRule, forced: &BTreeSet<u32>) -> Vec<NoteEvent> {
    let chords = group_by_tick(expert);
    if chords.len() < 2 {
        return expert.to_vec();
    }

    let ticks: Vec<u32> = chords.keys().copied().collect();
    let Some(median) = median_gap(&ticks) else {
        return expert.to_vec();
    };
    let min_gap = minimum_gap(median, tier);
    debug!(
        "Median gap {} ticks, minimum gap {} (x{})",
        median, min_gap, tier.spacing_multiplier
    );

    let mut output = Vec::new();
    let mut last_accepted: Option<u32> = None;

    for (&tick, chord) in &chords {
        let playable: Vec<_> = chord
            .iter()
            .filter(|n| n.lane <= tier.max_lane)
            .copied()
            .collect();
        if playable.is_empty() {
            continue;
        }

        let too_close = last_accepted.is_some_and(|last| u64::from(tick - last) < min_gap);
        if too_close && !forced.contains(&tick) {
            continue;
        }

        output.extend(
            reduce_chord(&playable, tier.max_chord)
                .into_iter()
                .map(|n| NoteEvent::new(tick, n.lane, n.duration)),
        );
        last_accepted = Some(tick);
    }

    output
}
