//! Chart-related types shared by both codecs.
//!
//! - `Difficulty` - difficulty tiers (Easy, Medium, Hard, Expert)
//! - `Instrument` - playable instruments (Guitar, Bass, Drums, Keys)
//! - `NoteEvent`, `SpecialEvent` - gameplay notes and carried-through markers
//! - `ChordMap` - notes grouped by tick

mod difficulty;
mod instrument;
mod note;

pub use difficulty::*;
pub use instrument::*;
pub use note::*;
