//! Byte buffer utilities for parsing the big-endian chunk container.
//!
//! This module provides `ByteBuffer`, a position-tracking byte reader used by
//! the container parser and the track event scanner.

use encoding_rs::WINDOWS_1252;
use tracing::debug;

use super::vlq::decode_vlq;
use crate::error::{Error, Result};

/// A position-tracking byte reader.
///
/// # Example
///
/// ```
/// use reducer_core::midi::ByteBuffer;
///
/// let data = [0x00, 0x00, 0x00, 0x06, 0x81, 0x00];
/// let mut buf = ByteBuffer::new(&data);
///
/// assert_eq!(buf.read_u32().unwrap(), 6);
/// assert_eq!(buf.read_vlq().unwrap(), 128);
/// assert_eq!(buf.position(), 6);
/// ```
pub struct ByteBuffer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteBuffer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of bytes remaining from the current position.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.read_bytes(count).map(|_| ())
    }

    /// Returns the next byte without advancing.
    pub fn peek_u8(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let bytes = self.read_bytes(1)?;
        Ok(bytes[0])
    }

    /// Reads an unsigned 16-bit integer (big-endian) and advances the position.
    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Reads an unsigned 32-bit integer (big-endian) and advances the position.
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads a four-byte chunk tag.
    pub fn read_tag(&mut self) -> Result<[u8; 4]> {
        let bytes = self.read_bytes(4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Reads a variable-length quantity and advances past it.
    pub fn read_vlq(&mut self) -> Result<u32> {
        let (value, next) = decode_vlq(self.data, self.pos)?;
        self.pos = next;
        Ok(value)
    }

    /// Reads the specified number of bytes and advances the position.
    ///
    /// # Errors
    ///
    /// Returns an error if there are not enough bytes remaining.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let available = self.remaining();
        if count > available {
            return Err(Error::UnexpectedEof {
                position: self.pos,
                needed: count,
                available,
            });
        }

        let end = self.pos + count;
        let result = &self.data[self.pos..end];
        self.pos = end;
        Ok(result)
    }

    /// Reads up to `count` bytes, returning fewer if the buffer ends first.
    pub fn read_up_to(&mut self, count: usize) -> &'a [u8] {
        let end = self.pos + count.min(self.remaining());
        let result = &self.data[self.pos..end];
        self.pos = end;
        result
    }
}

/// Decodes track-name bytes as latin-1 (windows-1252), dropping nulls.
pub fn decode_latin1(bytes: &[u8]) -> String {
    let (decoded, had_errors) = WINDOWS_1252.decode_without_bom_handling(bytes);
    if had_errors {
        debug!(
            "latin-1 decoding had errors for bytes: {:?}",
            &bytes[..bytes.len().min(20)]
        );
    }
    decoded.chars().filter(|&c| c != '\0').collect()
}

/// Encodes a track name as latin-1 (windows-1252). Unmappable characters are
/// replaced with `?`.
pub fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let mut buf = [0u8; 4];
            let (encoded, _, had_errors) = WINDOWS_1252.encode(c.encode_utf8(&mut buf));
            if had_errors || encoded.len() != 1 {
                b'?'
            } else {
                encoded[0]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_buffer_read_big_endian() {
        let data = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC];
        let mut buf = ByteBuffer::new(&data);

        assert_eq!(buf.read_u32().unwrap(), 0x12345678);
        assert_eq!(buf.read_u16().unwrap(), 0x9ABC);
        assert!(buf.is_at_end());
    }

    #[test]
    fn test_byte_buffer_read_tag() {
        let data = *b"MTrk\x00\x00\x00\x04";
        let mut buf = ByteBuffer::new(&data);

        assert_eq!(&buf.read_tag().unwrap(), b"MTrk");
        assert_eq!(buf.read_u32().unwrap(), 4);
    }

    #[test]
    fn test_byte_buffer_overflow_error() {
        let data = [0x01, 0x02];
        let mut buf = ByteBuffer::new(&data);

        let result = buf.read_u32();
        assert!(matches!(
            result,
            Err(Error::UnexpectedEof {
                position: 0,
                needed: 4,
                available: 2
            })
        ));
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn test_byte_buffer_read_up_to() {
        let data = [1, 2, 3];
        let mut buf = ByteBuffer::new(&data);

        buf.skip(1).unwrap();
        assert_eq!(buf.read_up_to(10), &[2, 3]);
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn test_decode_latin1() {
        assert_eq!(decode_latin1(b"PART GUITAR"), "PART GUITAR");
        assert_eq!(decode_latin1(&[0x43, 0x61, 0x66, 0xE9, 0x00]), "Café");
    }

    #[test]
    fn test_encode_latin1() {
        assert_eq!(encode_latin1("PART BASS"), b"PART BASS");
        assert_eq!(encode_latin1("Café"), vec![0x43, 0x61, 0x66, 0xE9]);
        assert_eq!(encode_latin1("日"), b"?");
    }
}
