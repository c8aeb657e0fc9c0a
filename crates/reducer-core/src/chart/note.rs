use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One playable note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteEvent {
    pub tick: u32,
    pub lane: u8,
    pub duration: u32,
}

impl NoteEvent {
    pub fn new(tick: u32, lane: u8, duration: u32) -> Self {
        Self {
            tick,
            lane,
            duration,
        }
    }
}

/// Non-gameplay marker carried through reduction untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpecialEvent {
    pub tick: u32,
    pub code: u32,
    /// Phrase length in ticks, zero when the source carried none.
    pub length: u32,
}

impl SpecialEvent {
    pub fn new(tick: u32, code: u32, length: u32) -> Self {
        Self { tick, code, length }
    }
}

/// A note inside a chord, keyed externally by its tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordNote {
    pub lane: u8,
    pub duration: u32,
}

/// Notes grouped by tick, iterated in ascending tick order.
pub type ChordMap = BTreeMap<u32, Vec<ChordNote>>;

/// Groups a note sequence into chords in a single pass.
pub fn group_by_tick(notes: &[NoteEvent]) -> ChordMap {
    let mut chords = ChordMap::new();
    for note in notes {
        chords.entry(note.tick).or_default().push(ChordNote {
            lane: note.lane,
            duration: note.duration,
        });
    }
    chords
}

/// Number of distinct ticks (chords) in a sequence.
pub fn chord_count(notes: &[NoteEvent]) -> usize {
    let mut ticks: Vec<u32> = notes.iter().map(|n| n.tick).collect();
    ticks.sort_unstable();
    ticks.dedup();
    ticks.len()
}

/// Sorts notes by tick, then lane. Stable for equal keys.
pub fn sort_notes(notes: &mut [NoteEvent]) {
    notes.sort_by_key(|n| (n.tick, n.lane));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_by_tick() {
        let notes = [
            NoteEvent::new(200, 1, 10),
            NoteEvent::new(100, 0, 10),
            NoteEvent::new(200, 3, 20),
        ];
        let chords = group_by_tick(&notes);

        let ticks: Vec<_> = chords.keys().copied().collect();
        assert_eq!(ticks, vec![100, 200]);
        assert_eq!(chords[&200].len(), 2);
        assert_eq!(chords[&200][1].lane, 3);
    }

    #[test]
    fn test_chord_count() {
        let notes = [
            NoteEvent::new(0, 0, 1),
            NoteEvent::new(0, 1, 1),
            NoteEvent::new(96, 2, 1),
        ];
        assert_eq!(chord_count(&notes), 2);
        assert_eq!(chord_count(&[]), 0);
    }
}
