//! Binary chart codec.
//!
//! - `MidiFile`, `Chunk` - the header and verbatim chunk list
//! - `scan_track` - event decoding and note-on/note-off pairing
//! - `TrackBuilder` - re-encoding of synthesized tracks
//! - variable-length quantity helpers

mod builder;
mod bytes;
mod file;
mod track;
pub mod vlq;

pub use builder::TrackBuilder;
pub use bytes::{ByteBuffer, decode_latin1, encode_latin1};
pub use file::{Chunk, HEADER_TAG, Header, MidiFile, TRACK_TAG};
pub use track::{PairedNote, ScanStatus, TrackScan, scan_track};
pub use vlq::{decode_vlq, encode_vlq, write_vlq};
