//! Track event decoding and note pairing.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::bytes::{ByteBuffer, decode_latin1};
use crate::error::Result;

pub const META_EVENT: u8 = 0xFF;
pub const META_TRACK_NAME: u8 = 0x03;
pub const META_END_OF_TRACK: u8 = 0x2F;
pub const SYSEX_START: u8 = 0xF0;
pub const SYSEX_ESCAPE: u8 = 0xF7;

/// A note-on/note-off pair at its raw pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairedNote {
    pub tick: u32,
    pub pitch: u8,
    pub duration: u32,
}

/// How far a track's event stream could be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanStatus {
    Complete,
    /// Some bytes could not be interpreted. `stopped_at` is set when the
    /// stream ended inside an event.
    Partial {
        skipped_bytes: usize,
        stopped_at: Option<usize>,
    },
}

impl ScanStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Result of interpreting one track payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackScan {
    pub name: Option<String>,
    /// Paired notes in closing order.
    pub notes: Vec<PairedNote>,
    pub end_tick: u32,
    pub status: ScanStatus,
}

enum Step {
    Event,
    /// One uninterpretable byte was consumed.
    Skip,
}

struct Scanner<'a> {
    buf: ByteBuffer<'a>,
    tick: u32,
    running_status: Option<u8>,
    name: Option<String>,
    active: BTreeMap<u8, u32>,
    notes: Vec<PairedNote>,
}

impl<'a> Scanner<'a> {
    fn new(payload: &'a [u8]) -> Self {
        Self {
            buf: ByteBuffer::new(payload),
            tick: 0,
            running_status: None,
            name: None,
            active: BTreeMap::new(),
            notes: Vec::new(),
        }
    }

    fn step(&mut self) -> Result<Step> {
        let delta = self.buf.read_vlq()?;
        self.tick = self.tick.saturating_add(delta);

        let Some(byte) = self.buf.peek_u8() else {
            return Ok(Step::Event);
        };
        let status = if byte < 0x80 {
            match self.running_status {
                Some(status) => status,
                None => {
                    self.buf.skip(1)?;
                    return Ok(Step::Skip);
                }
            }
        } else {
            self.buf.skip(1)?;
            // Only channel messages can be repeated by running status.
            if byte < 0xF0 {
                self.running_status = Some(byte);
            }
            byte
        };

        match status {
            0x90..=0x9F => {
                let data = self.buf.read_bytes(2)?;
                let (pitch, velocity) = (data[0], data[1]);
                if velocity > 0 {
                    self.active.insert(pitch, self.tick);
                } else {
                    self.close(pitch);
                }
            }
            0x80..=0x8F => {
                let data = self.buf.read_bytes(2)?;
                self.close(data[0]);
            }
            0xA0..=0xBF | 0xE0..=0xEF => self.buf.skip(2)?,
            0xC0..=0xDF => self.buf.skip(1)?,
            META_EVENT => {
                let kind = self.buf.read_u8()?;
                let length = self.buf.read_vlq()? as usize;
                let data = self.buf.read_bytes(length)?;
                if kind == META_TRACK_NAME && !data.is_empty() {
                    self.name = Some(decode_latin1(data));
                }
            }
            SYSEX_START | SYSEX_ESCAPE => {
                let length = self.buf.read_vlq()? as usize;
                self.buf.skip(length)?;
            }
            _ => return Ok(Step::Skip),
        }
        Ok(Step::Event)
    }

    fn close(&mut self, pitch: u8) {
        if let Some(start) = self.active.remove(&pitch) {
            self.notes.push(PairedNote {
                tick: start,
                pitch,
                duration: self.tick - start,
            });
        }
    }
}

/// Decode a track payload, pairing note-ons with their note-offs.
///
/// Never fails: unknown status bytes are skipped one at a time and a
/// truncated event ends the scan, keeping everything decoded before it.
/// Notes still open at the end are closed with at least `fallback_duration`.
pub fn scan_track(payload: &[u8], fallback_duration: u32) -> TrackScan {
    let mut scanner = Scanner::new(payload);
    let mut skipped_bytes = 0;
    let mut stopped_at = None;

    while !scanner.buf.is_at_end() {
        let event_start = scanner.buf.position();
        match scanner.step() {
            Ok(Step::Event) => {}
            Ok(Step::Skip) => skipped_bytes += 1,
            Err(e) => {
                debug!("Track scan stopped at byte {}: {}", event_start, e);
                stopped_at = Some(event_start);
                break;
            }
        }
    }

    let end_tick = scanner.tick;
    let mut notes = scanner.notes;
    for (pitch, start) in scanner.active {
        notes.push(PairedNote {
            tick: start,
            pitch,
            duration: (end_tick - start).max(fallback_duration),
        });
    }

    let status = if skipped_bytes == 0 && stopped_at.is_none() {
        ScanStatus::Complete
    } else {
        ScanStatus::Partial {
            skipped_bytes,
            stopped_at,
        }
    };

    TrackScan {
        name: scanner.name,
        notes,
        end_tick,
        status,
    }
}
