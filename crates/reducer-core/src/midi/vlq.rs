//! Variable-length quantities: 7-bit groups, most significant first, every
//! group but the last carrying the continuation bit.

use crate::error::{Error, Result};

const CONTINUATION: u8 = 0x80;
const GROUP_MASK: u8 = 0x7F;

/// Longest encoding of a `u32`.
pub const MAX_VLQ_LEN: usize = 5;

/// Append the encoding of `value` to `buf`.
pub fn write_vlq(buf: &mut Vec<u8>, mut value: u32) {
    let mut bytes = [0u8; MAX_VLQ_LEN];
    let mut i = MAX_VLQ_LEN - 1;
    bytes[i] = (value as u8) & GROUP_MASK;
    value >>= 7;
    while value > 0 {
        i -= 1;
        bytes[i] = ((value as u8) & GROUP_MASK) | CONTINUATION;
        value >>= 7;
    }
    buf.extend_from_slice(&bytes[i..]);
}

pub fn encode_vlq(value: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(MAX_VLQ_LEN);
    write_vlq(&mut buf, value);
    buf
}

/// Decode a quantity starting at `pos`, returning the value and the position
/// just past it.
pub fn decode_vlq(data: &[u8], pos: usize) -> Result<(u32, usize)> {
    let mut value: u32 = 0;
    let mut cursor = pos;
    loop {
        let Some(&byte) = data.get(cursor) else {
            return Err(Error::UnexpectedEof {
                position: cursor,
                needed: 1,
                available: 0,
            });
        };
        if value > u32::MAX >> 7 {
            return Err(Error::VlqOverflow(pos));
        }
        value = (value << 7) | u32::from(byte & GROUP_MASK);
        cursor += 1;
        if byte & CONTINUATION == 0 {
            return Ok((value, cursor));
        }
    }
}
