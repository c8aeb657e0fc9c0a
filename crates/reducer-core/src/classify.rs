//! Maps binary chunks and text sections to (instrument, difficulty) pairs.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::chart::{Difficulty, Instrument, NoteEvent, SpecialEvent, sort_notes};
use crate::config::RuleSet;
use crate::midi::{MidiFile, ScanStatus, scan_track};
use crate::text::ChartText;

/// Everything extracted for one instrument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstrumentData {
    pub special: Vec<SpecialEvent>,
    /// Note sequences per difficulty, sorted by tick then lane. A difficulty
    /// absent from the source has no entry.
    pub tracks: BTreeMap<Difficulty, Vec<NoteEvent>>,
}

impl InstrumentData {
    pub fn expert(&self) -> Option<&[NoteEvent]> {
        self.tracks
            .get(&Difficulty::Expert)
            .map(Vec::as_slice)
            .filter(|notes| !notes.is_empty())
    }

    pub fn has_expert(&self) -> bool {
        self.expert().is_some()
    }

    /// Ticks of the special events carrying `code`.
    pub fn forced_ticks(&self, code: u32) -> BTreeSet<u32> {
        self.special
            .iter()
            .filter(|s| s.code == code)
            .map(|s| s.tick)
            .collect()
    }

    pub fn count(&self, difficulty: Difficulty) -> usize {
        self.tracks.get(&difficulty).map_or(0, Vec::len)
    }
}

pub type InstrumentMap = BTreeMap<Instrument, InstrumentData>;

/// Per-chunk outcome of binary classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkReport {
    pub index: usize,
    pub name: Option<String>,
    pub instrument: Option<Instrument>,
    #[serde(flatten)]
    pub status: ScanStatus,
    /// The file ended before the chunk's declared length.
    pub truncated: bool,
    pub notes: usize,
    pub end_tick: u32,
}

/// Classified binary chart.
#[derive(Debug, Clone, Default)]
pub struct MidiClassification {
    pub instruments: InstrumentMap,
    /// Chunk index holding each instrument.
    pub chunks: BTreeMap<Instrument, usize>,
    pub reports: Vec<ChunkReport>,
}

/// Classified text chart.
#[derive(Debug, Clone, Default)]
pub struct TextClassification {
    pub instruments: InstrumentMap,
    /// Indices of the existing Hard/Medium/Easy sections of each instrument.
    pub derived_sections: BTreeMap<Instrument, Vec<usize>>,
}

fn note_duration(duration: u32, rules: &RuleSet) -> u32 {
    if duration == 0 {
        rules.fallback_duration
    } else {
        duration
    }
}

/// Classify every track chunk of a binary chart.
///
/// Only the first chunk matching an instrument is used; later matches pass
/// through untouched.
pub fn classify_midi(file: &MidiFile, rules: &RuleSet) -> MidiClassification {
    let mut result = MidiClassification::default();

    for (index, chunk) in file.chunks.iter().enumerate() {
        if !chunk.is_track() {
            debug!(
                "Chunk {} has tag {:?}, passing through",
                index,
                String::from_utf8_lossy(&chunk.tag())
            );
            continue;
        }

        let scan = scan_track(chunk.payload(), rules.fallback_duration);
        let instrument = scan
            .name
            .as_deref()
            .and_then(|name| rules.instrument_for_track(name));

        if let ScanStatus::Partial {
            skipped_bytes,
            stopped_at,
        } = scan.status
        {
            warn!(
                "Chunk {} ({}) decoded partially: {} bytes skipped, stopped at {:?}",
                index,
                scan.name.as_deref().unwrap_or("unnamed"),
                skipped_bytes,
                stopped_at
            );
        }

        result.reports.push(ChunkReport {
            index,
            name: scan.name.clone(),
            instrument,
            status: scan.status,
            truncated: chunk.is_truncated(),
            notes: scan.notes.len(),
            end_tick: scan.end_tick,
        });

        let Some(instrument) = instrument else {
            continue;
        };
        if let Some(first) = result.chunks.get(&instrument) {
            warn!(
                "Chunk {} also names {}; keeping chunk {} and passing this one through",
                index, instrument, first
            );
            continue;
        }

        let mut data = InstrumentData::default();
        for note in &scan.notes {
            match rules.bucket(note.pitch) {
                Some((difficulty, lane)) => data.tracks.entry(difficulty).or_default().push(
                    NoteEvent::new(note.tick, lane, note_duration(note.duration, rules)),
                ),
                None => data.special.push(SpecialEvent::new(
                    note.tick,
                    u32::from(note.pitch),
                    note.duration,
                )),
            }
        }
        for notes in data.tracks.values_mut() {
            sort_notes(notes);
        }
        data.special.sort_by_key(|s| (s.tick, s.code));

        info!(
            "Chunk {} is {}: {} Expert notes, {} special events",
            index,
            instrument,
            data.count(Difficulty::Expert),
            data.special.len()
        );
        result.chunks.insert(instrument, index);
        result.instruments.insert(instrument, data);
    }

    result
}

/// Classify the sections of a text chart by name.
///
/// A repeated section name replaces the notes of the earlier one. Special
/// events are taken from the Expert section only.
pub fn classify_text(chart: &ChartText, rules: &RuleSet) -> TextClassification {
    let mut result = TextClassification::default();

    for (index, section) in chart.sections().iter().enumerate() {
        let Some((difficulty, instrument)) = rules.parse_section_name(&section.name) else {
            debug!("Section [{}] is not an instrument track", section.name);
            continue;
        };

        let data = result.instruments.entry(instrument).or_default();
        let mut notes = section.notes.clone();
        sort_notes(&mut notes);
        if data.tracks.insert(difficulty, notes).is_some() {
            warn!("Section [{}] appears more than once", section.name);
        }

        if difficulty.is_derived() {
            result
                .derived_sections
                .entry(instrument)
                .or_default()
                .push(index);
        } else {
            data.special = section.specials.clone();
            data.special.sort_by_key(|s| (s.tick, s.code));
        }

        debug!(
            "Section [{}]: {} notes, {} special events, {} other lines",
            section.name,
            section.notes.len(),
            section.specials.len(),
            section.other_lines
        );
    }

    for (instrument, data) in &result.instruments {
        info!(
            "{}: {} Expert notes, {} special events",
            instrument,
            data.count(Difficulty::Expert),
            data.special.len()
        );
    }

    result
}
