//! One load-regenerate-save run over a chart file.

mod output;

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use strum::IntoStaticStr;
use tracing::{info, warn};

use crate::chart::{Difficulty, Instrument, NoteEvent, SpecialEvent, chord_count};
use crate::classify::{
    ChunkReport, InstrumentMap, MidiClassification, TextClassification, classify_midi,
    classify_text,
};
use crate::config::RuleSet;
use crate::error::{Error, Result};
use crate::midi::MidiFile;
use crate::reduce::reduce;
use crate::summary::{
    DerivedTierSummary, InstrumentSummary, LoadSummary, RegeneratedSummary, RegenerationSummary,
    TierAction, percent,
};
use crate::synth::{build_sections, build_track};
use crate::text::ChartText;

pub use output::{default_output_path, write_atomic};

/// Chart container format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChartFormat {
    /// Chunked binary timeline (`.mid`, `.midi`).
    Midi,
    /// Bracketed text sections (`.chart`).
    Text,
}

impl ChartFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("mid") | Some("midi") => Ok(Self::Midi),
            Some("chart") => Ok(Self::Text),
            _ => Err(Error::UnsupportedFormat(format!(
                "{} (expected .mid, .midi or .chart)",
                path.display()
            ))),
        }
    }
}

impl std::fmt::Display for ChartFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name: &'static str = self.into();
        write!(f, "{}", name)
    }
}

/// A decoded chart and its classification.
#[derive(Debug, Clone)]
pub enum Document {
    Midi {
        file: MidiFile,
        classification: MidiClassification,
    },
    Text {
        chart: ChartText,
        classification: TextClassification,
    },
}

impl Document {
    pub fn instruments(&self) -> &InstrumentMap {
        match self {
            Self::Midi { classification, .. } => &classification.instruments,
            Self::Text { classification, .. } => &classification.instruments,
        }
    }
}

/// The regenerated tiers of one instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegeneratedInstrument {
    /// Expert plus the three derived tiers.
    pub tracks: BTreeMap<Difficulty, Vec<NoteEvent>>,
    pub special: Vec<SpecialEvent>,
    /// Derived tiers that existed in the source and are being replaced.
    pub replaced: BTreeSet<Difficulty>,
}

/// Result of [`Session::regenerate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Regeneration {
    pub instruments: BTreeMap<Instrument, RegeneratedInstrument>,
    /// Instruments present without an Expert sequence, left untouched.
    pub skipped: Vec<Instrument>,
}

pub struct Session {
    source: PathBuf,
    format: ChartFormat,
    rules: RuleSet,
    document: Document,
}

impl Session {
    /// Read and classify a chart file.
    pub fn open<P: AsRef<Path>>(path: P, rules: RuleSet) -> Result<Self> {
        let path = path.as_ref();
        let format = ChartFormat::from_path(path)?;
        let data = fs::read(path)?;
        Self::from_bytes(path, format, &data, rules)
    }

    /// Classify an in-memory chart. `source` is only used for reporting and
    /// the default output path.
    pub fn from_bytes<P: AsRef<Path>>(
        source: P,
        format: ChartFormat,
        data: &[u8],
        rules: RuleSet,
    ) -> Result<Self> {
        rules.validate()?;
        let source = source.as_ref().to_path_buf();

        let document = match format {
            ChartFormat::Midi => {
                let file = MidiFile::parse_with_fallback(data, rules.default_division)?;
                info!(
                    "Loaded {}: format {}, {} chunks, division {}",
                    source.display(),
                    file.header.format,
                    file.chunks.len(),
                    file.header.division
                );
                let classification = classify_midi(&file, &rules);
                Document::Midi {
                    file,
                    classification,
                }
            }
            ChartFormat::Text => {
                let chart = ChartText::from_bytes(data)?;
                info!(
                    "Loaded {}: {} lines, {} sections",
                    source.display(),
                    chart.line_count(),
                    chart.sections().len()
                );
                let classification = classify_text(&chart, &rules);
                Document::Text {
                    chart,
                    classification,
                }
            }
        };

        Ok(Self {
            source,
            format,
            rules,
            document,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn format(&self) -> ChartFormat {
        self.format
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn instruments(&self) -> &InstrumentMap {
        self.document.instruments()
    }

    /// Ticks per beat: the binary header value or the text `Resolution`.
    pub fn division(&self) -> Option<u16> {
        match &self.document {
            Document::Midi { file, .. } => Some(file.header.division),
            Document::Text { chart, .. } => chart.resolution(),
        }
    }

    pub fn chunk_reports(&self) -> &[ChunkReport] {
        match &self.document {
            Document::Midi { classification, .. } => &classification.reports,
            Document::Text { .. } => &[],
        }
    }

    fn container_entries(&self) -> usize {
        match &self.document {
            Document::Midi { file, .. } => file.chunks.len(),
            Document::Text { chart, .. } => chart.sections().len(),
        }
    }

    /// Special-event code marking boost phrases in this format.
    pub fn boost_code(&self) -> u32 {
        match self.format {
            ChartFormat::Midi => u32::from(self.rules.midi_boost_code),
            ChartFormat::Text => self.rules.text_boost_code,
        }
    }

    pub fn summary(&self) -> LoadSummary {
        let boost_code = self.boost_code();
        LoadSummary {
            source: self.source.clone(),
            format: self.format,
            division: self.division(),
            container_entries: self.container_entries(),
            instruments: self
                .instruments()
                .iter()
                .map(|(&instrument, data)| InstrumentSummary::new(instrument, data, boost_code))
                .collect(),
            chunks: self.chunk_reports().to_vec(),
        }
    }

    /// Derive Hard, Medium and Easy for every instrument with Expert notes.
    ///
    /// Existing derived tiers are always replaced, never merged.
    pub fn regenerate(&self) -> Result<Regeneration> {
        let boost_code = self.boost_code();
        let mut regeneration = Regeneration::default();

        for (&instrument, data) in self.instruments() {
            let Some(expert) = data.expert() else {
                warn!("{}: cannot regenerate, no Expert notes", instrument);
                regeneration.skipped.push(instrument);
                continue;
            };

            let forced = data.forced_ticks(boost_code);
            let mut tracks = BTreeMap::new();
            tracks.insert(Difficulty::Expert, expert.to_vec());
            let mut replaced = BTreeSet::new();

            for difficulty in Difficulty::DERIVED {
                let Some(tier) = self.rules.tier(difficulty) else {
                    continue;
                };
                let notes = reduce(expert, tier, &forced);
                info!(
                    "{} {}: {} of {} chords",
                    instrument,
                    difficulty,
                    chord_count(&notes),
                    chord_count(expert)
                );
                if data.tracks.contains_key(&difficulty) {
                    replaced.insert(difficulty);
                }
                tracks.insert(difficulty, notes);
            }

            regeneration.instruments.insert(
                instrument,
                RegeneratedInstrument {
                    tracks,
                    special: data.special.clone(),
                    replaced,
                },
            );
        }

        if regeneration.instruments.is_empty() {
            return Err(Error::NothingToRegenerate);
        }
        Ok(regeneration)
    }

    /// Produce the complete output file in memory.
    pub fn render(&self, regeneration: &Regeneration) -> Vec<u8> {
        match &self.document {
            Document::Midi {
                file,
                classification,
            } => {
                let mut out = file.clone();
                for (instrument, regenerated) in &regeneration.instruments {
                    let (Some(&index), Some(name)) = (
                        classification.chunks.get(instrument),
                        self.rules.track_name(*instrument),
                    ) else {
                        continue;
                    };
                    let chunk = build_track(
                        name,
                        &regenerated.tracks,
                        &regenerated.special,
                        &self.rules,
                    );
                    out.replace_chunk(index, chunk);
                }
                out.to_bytes()
            }
            Document::Text {
                chart,
                classification,
            } => {
                let mut dropped = BTreeSet::new();
                let mut appended = String::new();
                for (instrument, regenerated) in &regeneration.instruments {
                    if let Some(sections) = classification.derived_sections.get(instrument) {
                        dropped.extend(sections.iter().copied());
                    }
                    appended.push_str(&build_sections(
                        *instrument,
                        &regenerated.tracks,
                        &regenerated.special,
                        &self.rules,
                        chart.line_ending(),
                    ));
                }
                chart.render(&dropped, &appended).into_bytes()
            }
        }
    }

    pub fn regeneration_summary(
        &self,
        regeneration: &Regeneration,
        destination: Option<&Path>,
    ) -> RegenerationSummary {
        let instruments = regeneration
            .instruments
            .iter()
            .map(|(&instrument, regenerated)| {
                let expert = regenerated
                    .tracks
                    .get(&Difficulty::Expert)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                let expert_chords = chord_count(expert);
                let tiers = Difficulty::DERIVED
                    .iter()
                    .filter_map(|difficulty| {
                        let notes = regenerated.tracks.get(difficulty)?;
                        let chords = chord_count(notes);
                        Some(DerivedTierSummary {
                            difficulty: *difficulty,
                            notes: notes.len(),
                            chords,
                            percent_of_expert: percent(chords, expert_chords),
                            action: if regenerated.replaced.contains(difficulty) {
                                TierAction::Regenerated
                            } else {
                                TierAction::Generated
                            },
                        })
                    })
                    .collect();
                RegeneratedSummary {
                    instrument,
                    expert_notes: expert.len(),
                    expert_chords,
                    special_events: regenerated.special.len(),
                    tiers,
                }
            })
            .collect();

        RegenerationSummary {
            source: self.source.clone(),
            destination: destination.map(Path::to_path_buf),
            format: self.format,
            division: self.division(),
            container_entries: self.container_entries(),
            instruments,
            skipped: regeneration.skipped.clone(),
        }
    }

    /// Render and write the output atomically to `destination`.
    pub fn save<P: AsRef<Path>>(
        &self,
        regeneration: &Regeneration,
        destination: P,
    ) -> Result<RegenerationSummary> {
        let destination = destination.as_ref();
        let bytes = self.render(regeneration);
        write_atomic(destination, &bytes)?;
        info!("Saved {} ({} bytes)", destination.display(), bytes.len());
        Ok(self.regeneration_summary(regeneration, Some(destination)))
    }
}
