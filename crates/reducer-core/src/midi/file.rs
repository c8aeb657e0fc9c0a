//! The chunk container: a fixed header followed by tagged, length-prefixed
//! chunks kept verbatim for pass-through.

use tracing::{debug, warn};

use super::bytes::ByteBuffer;
use crate::error::{Error, Result};

pub const HEADER_TAG: [u8; 4] = *b"MThd";
pub const TRACK_TAG: [u8; 4] = *b"MTrk";
pub const HEADER_LENGTH: u32 = 6;

/// Tag plus length prefix of every chunk.
const CHUNK_PREFIX: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub format: u16,
    pub track_count: u16,
    /// Ticks per beat. Read once and reused for every later computation.
    pub division: u16,
}

/// One chunk exactly as it appeared in the source: tag, declared length and
/// the payload bytes that were actually present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    raw: Vec<u8>,
}

impl Chunk {
    /// Build a chunk from a tag and a complete payload.
    pub fn new(tag: [u8; 4], payload: &[u8]) -> Self {
        let mut raw = Vec::with_capacity(CHUNK_PREFIX + payload.len());
        raw.extend_from_slice(&tag);
        raw.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        raw.extend_from_slice(payload);
        Self { raw }
    }

    pub fn track(payload: &[u8]) -> Self {
        Self::new(TRACK_TAG, payload)
    }

    fn from_raw(raw: Vec<u8>) -> Self {
        Self { raw }
    }

    pub fn tag(&self) -> [u8; 4] {
        [self.raw[0], self.raw[1], self.raw[2], self.raw[3]]
    }

    pub fn is_track(&self) -> bool {
        self.tag() == TRACK_TAG
    }

    pub fn declared_len(&self) -> u32 {
        u32::from_be_bytes([self.raw[4], self.raw[5], self.raw[6], self.raw[7]])
    }

    pub fn payload(&self) -> &[u8] {
        &self.raw[CHUNK_PREFIX..]
    }

    /// True when the source ended before the declared length.
    pub fn is_truncated(&self) -> bool {
        (self.payload().len() as u64) < u64::from(self.declared_len())
    }

    /// The bytes written back out for this chunk.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }
}

/// A parsed binary chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiFile {
    pub header: Header,
    pub chunks: Vec<Chunk>,
    /// Bytes after the last chunk too short to hold a chunk prefix.
    pub trailing: Vec<u8>,
}

impl MidiFile {
    /// Parse the container.
    ///
    /// Header problems are fatal. Chunk problems are not: a chunk whose
    /// declared length runs past the end keeps whatever bytes were present.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::parse_with_fallback(data, Header::DEFAULT_DIVISION)
    }

    /// Parse the container, reporting `fallback_division` on header failure.
    pub fn parse_with_fallback(data: &[u8], fallback_division: u16) -> Result<Self> {
        let (header, header_len) =
            read_header(data).map_err(|reason| Error::MalformedHeader {
                reason,
                fallback_division,
            })?;

        let mut buf = ByteBuffer::new(data);
        buf.skip(CHUNK_PREFIX + header_len)?;

        let mut chunks = Vec::new();
        while buf.remaining() >= CHUNK_PREFIX {
            let start = buf.position();
            buf.skip(4)?;
            let length = buf.read_u32()? as usize;
            let payload = buf.read_up_to(length);
            if payload.len() < length {
                warn!(
                    "Chunk {} at byte {} is truncated: declared {} bytes, {} present",
                    chunks.len(),
                    start,
                    length,
                    payload.len()
                );
            }
            chunks.push(Chunk::from_raw(data[start..buf.position()].to_vec()));
        }

        let trailing = buf.read_up_to(buf.remaining()).to_vec();
        if !trailing.is_empty() {
            debug!("{} trailing bytes after the last chunk", trailing.len());
        }

        Ok(Self {
            header,
            chunks,
            trailing,
        })
    }

    pub fn track_count(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_track()).count()
    }

    /// Replace the chunk at `index`. Out-of-range indices are ignored.
    pub fn replace_chunk(&mut self, index: usize, chunk: Chunk) {
        if let Some(slot) = self.chunks.get_mut(index) {
            *slot = chunk;
        }
    }

    /// Serialize with a fresh 6-byte header carrying the original format and
    /// time division and the current track count.
    pub fn to_bytes(&self) -> Vec<u8> {
        let body: usize = self.chunks.iter().map(|c| c.as_bytes().len()).sum();
        let mut out = Vec::with_capacity(14 + body + self.trailing.len());

        out.extend_from_slice(&HEADER_TAG);
        out.extend_from_slice(&HEADER_LENGTH.to_be_bytes());
        out.extend_from_slice(&self.header.format.to_be_bytes());
        let count = u16::try_from(self.track_count()).unwrap_or(u16::MAX);
        out.extend_from_slice(&count.to_be_bytes());
        out.extend_from_slice(&self.header.division.to_be_bytes());

        for chunk in &self.chunks {
            out.extend_from_slice(chunk.as_bytes());
        }
        out.extend_from_slice(&self.trailing);
        out
    }
}

impl Header {
    pub const DEFAULT_DIVISION: u16 = 192;
}

/// Returns the header and the declared header payload length.
fn read_header(data: &[u8]) -> std::result::Result<(Header, usize), String> {
    let mut buf = ByteBuffer::new(data);
    let tag = buf.read_tag().map_err(|e| e.to_string())?;
    if tag != HEADER_TAG {
        return Err(format!(
            "expected tag {:?}, found {:?}",
            String::from_utf8_lossy(&HEADER_TAG),
            String::from_utf8_lossy(&tag)
        ));
    }
    let length = buf.read_u32().map_err(|e| e.to_string())?;
    if length < HEADER_LENGTH {
        return Err(format!("header length {} is shorter than 6", length));
    }
    let mut fields = || -> Result<Header> {
        Ok(Header {
            format: buf.read_u16()?,
            track_count: buf.read_u16()?,
            division: buf.read_u16()?,
        })
    };
    let header = fields().map_err(|e| e.to_string())?;
    if (length as usize) > data.len() - CHUNK_PREFIX {
        return Err(format!("header length {} exceeds file size", length));
    }
    Ok((header, length as usize))
}
