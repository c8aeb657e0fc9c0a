//! Load and regeneration summaries, serialisable and printable.

use std::fmt::Write as _;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use serde::Serialize;
use strum::IntoStaticStr;

use crate::chart::{Difficulty, Instrument, chord_count};
use crate::classify::{ChunkReport, InstrumentData};
use crate::session::ChartFormat;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierCount {
    pub difficulty: Difficulty,
    pub notes: usize,
    pub chords: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstrumentSummary {
    pub instrument: Instrument,
    /// Present tiers, hardest first.
    pub tiers: Vec<TierCount>,
    pub special_events: usize,
    pub boost_phrases: usize,
    pub can_regenerate: bool,
}

impl InstrumentSummary {
    pub fn new(instrument: Instrument, data: &InstrumentData, boost_code: u32) -> Self {
        let tiers = data
            .tracks
            .iter()
            .rev()
            .map(|(&difficulty, notes)| TierCount {
                difficulty,
                notes: notes.len(),
                chords: chord_count(notes),
            })
            .collect();
        Self {
            instrument,
            tiers,
            special_events: data.special.len(),
            boost_phrases: data.special.iter().filter(|s| s.code == boost_code).count(),
            can_regenerate: data.has_expert(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadSummary {
    pub source: PathBuf,
    pub format: ChartFormat,
    pub division: Option<u16>,
    /// Chunks for binary charts, sections for text charts.
    pub container_entries: usize,
    pub instruments: Vec<InstrumentSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chunks: Vec<ChunkReport>,
}

/// Whether a derived tier existed before regeneration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TierAction {
    Generated,
    Regenerated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedTierSummary {
    pub difficulty: Difficulty,
    pub notes: usize,
    pub chords: usize,
    /// Chords kept relative to Expert, 0-100.
    pub percent_of_expert: f64,
    pub action: TierAction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegeneratedSummary {
    pub instrument: Instrument,
    pub expert_notes: usize,
    pub expert_chords: usize,
    pub special_events: usize,
    pub tiers: Vec<DerivedTierSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegenerationSummary {
    pub source: PathBuf,
    pub destination: Option<PathBuf>,
    pub format: ChartFormat,
    pub division: Option<u16>,
    pub container_entries: usize,
    pub instruments: Vec<RegeneratedSummary>,
    /// Instruments present without an Expert sequence.
    pub skipped: Vec<Instrument>,
}

pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

fn format_colored_difficulty(difficulty: Difficulty) -> String {
    let name = difficulty.name();
    match difficulty {
        Difficulty::Easy => name.green().to_string(),
        Difficulty::Medium => name.yellow().to_string(),
        Difficulty::Hard => name.red().to_string(),
        Difficulty::Expert => name.purple().to_string(),
    }
}

fn format_division(division: Option<u16>) -> String {
    division.map_or_else(|| "-".to_string(), |d| d.to_string())
}

/// Format a load summary for the console.
///
/// `only` narrows the instrument list without affecting anything else.
pub fn format_load_console(summary: &LoadSummary, only: Option<Instrument>) -> String {
    let mut output = String::new();
    let border = "━".repeat(50);

    let _ = writeln!(output, "{}", border.dimmed());
    let _ = writeln!(output, "  {}", summary.source.display().bold());
    let _ = writeln!(output, "{}", border.dimmed());
    let _ = writeln!(
        output,
        "  FORMAT   : {}  DIVISION : {}  ENTRIES : {}",
        summary.format,
        format_division(summary.division),
        summary.container_entries
    );

    let instruments = summary
        .instruments
        .iter()
        .filter(|i| only.is_none_or(|o| o == i.instrument));
    let mut shown = 0;
    for instrument in instruments {
        shown += 1;
        let _ = writeln!(output);
        let status = if instrument.can_regenerate {
            "ready".green().to_string()
        } else {
            "cannot regenerate".red().to_string()
        };
        let _ = writeln!(output, "  {} ({})", instrument.instrument.bold(), status);
        for tier in &instrument.tiers {
            let _ = writeln!(
                output,
                "    {:<16} {:>5} notes  {:>5} chords",
                format_colored_difficulty(tier.difficulty),
                tier.notes,
                tier.chords
            );
        }
        let _ = writeln!(
            output,
            "    {:<7} {:>5} events  {:>5} boost",
            "special",
            instrument.special_events,
            instrument.boost_phrases.cyan()
        );
    }
    if shown == 0 {
        let _ = writeln!(output);
        let _ = writeln!(output, "  {}", "no instrument tracks found".dimmed());
    }

    let partial: Vec<_> = summary
        .chunks
        .iter()
        .filter(|c| c.truncated || !c.status.is_complete())
        .collect();
    if !partial.is_empty() {
        let _ = writeln!(output);
        for chunk in partial {
            let problem = if chunk.truncated {
                "is truncated"
            } else {
                "decoded partially"
            };
            let _ = writeln!(
                output,
                "  {} chunk {} ({}) {}",
                "!".yellow(),
                chunk.index,
                chunk.name.as_deref().unwrap_or("unnamed"),
                problem
            );
        }
    }
    let _ = write!(output, "{}", border.dimmed());

    output
}

/// Format a regeneration summary for the console.
pub fn format_regeneration_console(summary: &RegenerationSummary) -> String {
    let mut output = String::new();
    let border = "━".repeat(50);

    let _ = writeln!(output, "{}", border.dimmed());
    let _ = writeln!(output, "  {}", summary.source.display().bold());
    if let Some(destination) = &summary.destination {
        let _ = writeln!(output, "  → {}", destination.display().bold());
    }
    let _ = writeln!(output, "{}", border.dimmed());

    for instrument in &summary.instruments {
        let _ = writeln!(
            output,
            "  {}  {} {} chords",
            instrument.instrument.bold(),
            format_colored_difficulty(Difficulty::Expert),
            instrument.expert_chords
        );
        for tier in &instrument.tiers {
            let action: &'static str = tier.action.into();
            let _ = writeln!(
                output,
                "    {:<16} {:>5} chords  {:>5.1}%  {}",
                format_colored_difficulty(tier.difficulty),
                tier.chords,
                tier.percent_of_expert,
                action.dimmed()
            );
        }
    }
    for skipped in &summary.skipped {
        let _ = writeln!(
            output,
            "  {}  {}",
            skipped.bold(),
            "cannot regenerate: no Expert notes".red()
        );
    }
    let _ = write!(output, "{}", border.dimmed());

    output
}
