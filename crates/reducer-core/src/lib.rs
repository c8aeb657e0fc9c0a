//! # reducer-core
//!
//! Chart codec and difficulty reduction for five-lane rhythm-game charts.
//!
//! This crate provides:
//! - Binary timeline codec (chunk container, variable-length integers, note pairing)
//! - Text section codec (`[ExpertSingle]`-style sections)
//! - Track and section classification into (instrument, difficulty) pairs
//! - Density-adaptive reduction of Expert into Hard, Medium and Easy
//! - Re-synthesis of the regenerated tiers, leaving everything else untouched

pub mod chart;
pub mod classify;
pub mod config;
pub mod error;
pub mod midi;
pub mod reduce;
pub mod session;
pub mod summary;
pub mod synth;
pub mod text;

pub use chart::{Difficulty, Instrument, NoteEvent, SpecialEvent};
pub use classify::{ChunkReport, InstrumentData, InstrumentMap};
pub use config::{RuleSet, TierRule};
pub use error::{Error, Result};
pub use midi::MidiFile;
pub use reduce::{reduce, reduce_chord};
pub use session::{ChartFormat, Regeneration, Session, default_output_path};
pub use summary::{
    LoadSummary, RegenerationSummary, format_load_console, format_regeneration_console,
};
pub use text::ChartText;
