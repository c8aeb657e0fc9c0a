//! Re-encoding of an instrument's Expert and derived tiers.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::chart::{Difficulty, Instrument, NoteEvent, SpecialEvent};
use crate::config::RuleSet;
use crate::midi::{Chunk, TrackBuilder};
use crate::text::render_section;

/// Order in which tiers are laid into a binary track before sorting.
const TRACK_ORDER: [Difficulty; 4] = [
    Difficulty::Expert,
    Difficulty::Hard,
    Difficulty::Medium,
    Difficulty::Easy,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimedEvent {
    tick: u32,
    open: bool,
    pitch: u8,
}

fn push_span(events: &mut Vec<TimedEvent>, tick: u32, duration: u32, pitch: u8) {
    events.push(TimedEvent {
        tick,
        open: true,
        pitch,
    });
    events.push(TimedEvent {
        tick: tick.saturating_add(duration),
        open: false,
        pitch,
    });
}

/// Build the open/close event list for a track, sorted by tick with closes
/// ahead of opens at the same tick.
fn timeline(
    tracks: &BTreeMap<Difficulty, Vec<NoteEvent>>,
    special: &[SpecialEvent],
    rules: &RuleSet,
) -> Vec<TimedEvent> {
    let mut events = Vec::new();
    let duration = |d: u32| if d == 0 { rules.fallback_duration } else { d };

    for difficulty in TRACK_ORDER {
        let Some(notes) = tracks.get(&difficulty) else {
            continue;
        };
        for note in notes {
            match rules.pitch_for(difficulty, note.lane) {
                Some(pitch) => push_span(&mut events, note.tick, duration(note.duration), pitch),
                None => debug!(
                    "{} lane {} at tick {} has no pitch, dropped",
                    difficulty, note.lane, note.tick
                ),
            }
        }
    }
    for event in special {
        match u8::try_from(event.code).ok().filter(|&p| p <= 127) {
            Some(pitch) => push_span(&mut events, event.tick, duration(event.length), pitch),
            None => warn!(
                "Special event code {} at tick {} is not a pitch, dropped",
                event.code, event.tick
            ),
        }
    }

    events.sort_by_key(|e| (e.tick, e.open));
    events
}

/// Encode a complete instrument track chunk.
pub fn build_track(
    track_name: &str,
    tracks: &BTreeMap<Difficulty, Vec<NoteEvent>>,
    special: &[SpecialEvent],
    rules: &RuleSet,
) -> Chunk {
    let mut builder = TrackBuilder::new();
    builder.track_name(track_name);
    for event in timeline(tracks, special, rules) {
        if event.open {
            builder.note_on(event.tick, event.pitch, rules.note_velocity);
        } else {
            builder.note_off(event.tick, event.pitch);
        }
    }
    builder.finish()
}

/// Render the derived-tier sections of one instrument as text.
///
/// Expert is never rewritten. Each section repeats the special events.
/// Empty tiers produce no section. Durations are written as given.
pub fn build_sections(
    instrument: Instrument,
    tracks: &BTreeMap<Difficulty, Vec<NoteEvent>>,
    special: &[SpecialEvent],
    rules: &RuleSet,
    newline: &str,
) -> String {
    let mut out = String::new();
    for difficulty in Difficulty::DERIVED {
        let Some(notes) = tracks.get(&difficulty).filter(|n| !n.is_empty()) else {
            continue;
        };
        let Some(name) = rules.section_name(difficulty, instrument) else {
            continue;
        };
        out.push_str(&render_section(&name, notes, special, newline));
    }
    out
}
