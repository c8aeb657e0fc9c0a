//! Text chart codec.
//!
//! - `ChartText` - original lines plus a section index, re-rendered with
//!   selected sections removed and new ones appended
//! - `parse_track_line` / `render_section` - the `tick = N lane duration` body format

mod document;
mod line;

pub use document::{ChartText, Section};
pub use line::{TrackLine, parse_track_line, render_section};
