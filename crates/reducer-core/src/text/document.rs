//! Line-preserving model of a text chart.

use std::collections::BTreeSet;

use tracing::debug;

use super::line::{TrackLine, parse_track_line};
use crate::chart::{NoteEvent, SpecialEvent};
use crate::error::{Error, Result};

const BOM: char = '\u{feff}';

/// One bracketed section and the lines it spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    /// Line index of the `[Name]` header.
    pub header_line: usize,
    /// Line index of the closing `}`; `None` when the file ends first.
    pub close_line: Option<usize>,
    pub notes: Vec<NoteEvent>,
    pub specials: Vec<SpecialEvent>,
    /// Body lines that were neither notes nor specials.
    pub other_lines: usize,
}

/// A text chart kept as its original lines plus a derived section index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartText {
    /// Lines including their terminators, so concatenation reproduces the input.
    lines: Vec<String>,
    sections: Vec<Section>,
    /// Terminator of the first line, used for appended sections.
    line_ending: &'static str,
    resolution: Option<u16>,
}

impl ChartText {
    /// Decode UTF-8 bytes, keeping any byte-order mark for output.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(data).map_err(|e| {
            Error::EncodingError(format!(
                "chart text is not valid UTF-8 at byte {}",
                e.valid_up_to()
            ))
        })?;
        Ok(Self::parse(text))
    }

    /// Index sections and parse their body lines. Never fails: unknown
    /// lines are counted and otherwise ignored.
    pub fn parse(text: &str) -> Self {
        let lines: Vec<String> = text.split_inclusive('\n').map(str::to_string).collect();
        let mut sections: Vec<Section> = Vec::new();
        let mut current: Option<Section> = None;
        let mut inside = false;

        for (index, raw) in lines.iter().enumerate() {
            let line = raw.trim_start_matches(BOM).trim();

            if line == "{" {
                inside = true;
                continue;
            }
            if line == "}" {
                inside = false;
                if let Some(mut section) = current.take() {
                    section.close_line = Some(index);
                    sections.push(section);
                }
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                if let Some(unclosed) = current.take() {
                    debug!("Section [{}] has no closing brace", unclosed.name);
                    sections.push(unclosed);
                }
                inside = false;
                current = Some(Section {
                    name: name.to_string(),
                    header_line: index,
                    close_line: None,
                    notes: Vec::new(),
                    specials: Vec::new(),
                    other_lines: 0,
                });
                continue;
            }

            let Some(section) = current.as_mut().filter(|_| inside) else {
                continue;
            };
            match parse_track_line(line) {
                Some(TrackLine::Note(note)) => section.notes.push(note),
                Some(TrackLine::Special(special)) => section.specials.push(special),
                None if line.is_empty() => {}
                None => section.other_lines += 1,
            }
        }
        if let Some(unclosed) = current.take() {
            debug!("Section [{}] runs to the end of the file", unclosed.name);
            sections.push(unclosed);
        }

        let line_ending = match lines.first() {
            Some(first) if first.ends_with("\r\n") => "\r\n",
            _ => "\n",
        };
        let resolution = read_resolution(&lines, &sections);

        Self {
            lines,
            sections,
            line_ending,
            resolution,
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// `Resolution` (ticks per beat) from the `[Song]` section.
    pub fn resolution(&self) -> Option<u16> {
        self.resolution
    }

    /// `"\r\n"` when the document uses CRLF, otherwise `"\n"`.
    pub fn line_ending(&self) -> &'static str {
        self.line_ending
    }

    /// Reassemble the document without the sections at `dropped` (indices
    /// into [`sections`](Self::sections)), then append `appended`.
    ///
    /// With nothing dropped or appended the output equals the input.
    pub fn render(&self, dropped: &BTreeSet<usize>, appended: &str) -> String {
        let mut skip = vec![false; self.lines.len()];
        for section in dropped.iter().filter_map(|&i| self.sections.get(i)) {
            let end = section.close_line.unwrap_or(self.lines.len() - 1);
            for flag in &mut skip[section.header_line..=end] {
                *flag = true;
            }
        }

        let kept: usize = self
            .lines
            .iter()
            .zip(&skip)
            .filter(|(_, s)| !**s)
            .map(|(l, _)| l.len())
            .sum();
        let mut out = String::with_capacity(kept + appended.len());
        for (line, _) in self.lines.iter().zip(&skip).filter(|(_, s)| !**s) {
            out.push_str(line);
        }
        out.push_str(appended);
        out
    }
}

fn read_resolution(lines: &[String], sections: &[Section]) -> Option<u16> {
    let song = sections.iter().find(|s| s.name == "Song")?;
    let end = song.close_line.unwrap_or(lines.len());
    lines[song.header_line..end].iter().find_map(|line| {
        let (key, value) = line.split_once('=')?;
        if key.trim() == "Resolution" {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}
