use super::bytes::encode_latin1;
use super::file::Chunk;
use super::track::{META_END_OF_TRACK, META_EVENT, META_TRACK_NAME};
use super::vlq::write_vlq;

const NOTE_ON: u8 = 0x90;
const NOTE_OFF: u8 = 0x80;

/// Builds a track payload from absolute-tick events on channel 0.
///
/// Events must be pushed in non-decreasing tick order; an earlier tick is
/// clamped to a zero delta.
#[derive(Debug, Default)]
pub struct TrackBuilder {
    events: Vec<u8>,
    last_tick: u32,
}

impl TrackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn delta(&mut self, tick: u32) {
        write_vlq(&mut self.events, tick.saturating_sub(self.last_tick));
        self.last_tick = self.last_tick.max(tick);
    }

    fn meta(&mut self, tick: u32, kind: u8, data: &[u8]) {
        self.delta(tick);
        self.events.extend_from_slice(&[META_EVENT, kind]);
        write_vlq(&mut self.events, data.len() as u32);
        self.events.extend_from_slice(data);
    }

    pub fn track_name(&mut self, name: &str) -> &mut Self {
        let tick = self.last_tick;
        self.meta(tick, META_TRACK_NAME, &encode_latin1(name));
        self
    }

    pub fn note_on(&mut self, tick: u32, pitch: u8, velocity: u8) -> &mut Self {
        self.delta(tick);
        self.events.extend_from_slice(&[NOTE_ON, pitch, velocity]);
        self
    }

    pub fn note_off(&mut self, tick: u32, pitch: u8) -> &mut Self {
        self.delta(tick);
        self.events.extend_from_slice(&[NOTE_OFF, pitch, 0]);
        self
    }

    /// Append the end-of-track marker and wrap the payload in a track chunk.
    pub fn finish(mut self) -> Chunk {
        let tick = self.last_tick;
        self.meta(tick, META_END_OF_TRACK, &[]);
        Chunk::track(&self.events)
    }
}
