use crate::chart::ChordNote;

/// Shrink a chord to at most `cap` notes.
///
/// - cap 1 keeps the lowest lane
/// - cap 2 keeps the adjacent pair (in lane order) with the smallest lane
///   distance, the first such pair on ties
/// - larger caps keep the lowest `cap` lanes
pub fn reduce_chord(chord: &[ChordNote], cap: usize) -> Vec<ChordNote> {
    let mut sorted = chord.to_vec();
    sorted.sort_by_key(|n| n.lane);

    if sorted.len() <= cap {
        return sorted;
    }

    if cap == 2 {
        let start = sorted
            .windows(2)
            .enumerate()
            .min_by_key(|(i, pair)| (pair[1].lane - pair[0].lane, *i))
            .map_or(0, |(i, _)| i);
        return sorted[start..start + 2].to_vec();
    }
    sorted.truncate(cap);
    sorted
}
