use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "Unexpected end of data at position {position}: needed {needed} bytes, {available} available"
    )]
    UnexpectedEof {
        position: usize,
        needed: usize,
        available: usize,
    },

    #[error("Variable-length integer at position {0} does not fit in 32 bits")]
    VlqOverflow(usize),

    #[error("Malformed header: {reason}")]
    MalformedHeader { reason: String, fallback_division: u16 },

    #[error("Unsupported chart file: {0}")]
    UnsupportedFormat(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Invalid rule set: {0}")]
    InvalidRules(String),

    #[error("No instrument has an Expert sequence to regenerate from")]
    NothingToRegenerate,

    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Time division to report when a binary header could not be read.
    pub fn fallback_division(&self) -> Option<u16> {
        match self {
            Self::MalformedHeader {
                fallback_division, ..
            } => Some(*fallback_division),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
