use crate::{
    file::Timing,
    reader::{ReaderError, varlen::VarLenError},
};
use thiserror::Error;

/// Something in the bytes did not follow the SMF layout.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Header chunk problems
    #[error("header: {0}")]
    Header(#[from] HeaderError),
    /// Chunk framing problems
    #[error("chunk: {0}")]
    Chunk(#[from] ChunkError),
    /// Problems with an event inside a track
    #[error("event: {0}")]
    Event(#[from] EventError),
    /// A malformed variable-length quantity
    #[error("{0}")]
    VarLen(#[from] VarLenError),
}

/// Errors in the `MThd` chunk
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// The file did not start with `MThd`
    #[error("expected MThd, found {0:02X?}")]
    InvalidMagic([u8; 4]),
    /// `MThd` declared something other than six bytes
    #[error("header length must be 6, found {0}")]
    InvalidLength(u32),
}

/// Errors while framing chunks
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChunkError {
    /// A chunk's declared length reaches past the end of the buffer
    #[error("{magic} chunk declares {declared} bytes, only {available} remain")]
    LengthOverflow {
        /// The chunk type as ascii
        magic: String,
        /// Declared length
        declared: u32,
        /// Bytes left in the buffer
        available: usize,
    },
}

/// Errors while decoding one event in a track
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EventError {
    /// A data byte appeared before any status byte
    #[error("data byte {0:#04X} with no running status")]
    MissingRunningStatus(u8),
    /// A byte in a data position had its high bit set
    #[error("expected a data byte, found {0:#04X}")]
    InvalidDataByte(u8),
}

#[doc = r#"
The reasons an import can fail outright.

Anything that does not appear here is reported as an
[`ImportWarning`](crate::ImportWarning) instead, and the import carries on.
"#]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// The file's framing is broken
    #[error("structural error: {0}")]
    Structural(#[from] ReaderError),
    /// Format 2 files (or anything above) are not supported
    #[error("unsupported SMF format {0}; only formats 0 and 1 can be imported")]
    UnsupportedFormat(u16),
    /// The header uses SMPTE time division instead of ticks per quarter note
    #[error("unsupported SMPTE time division; a ticks-per-quarter-note division is required")]
    UnsupportedTiming(Timing),
    /// Ticks per quarter note of zero
    #[error("ticks per quarter note must be greater than zero")]
    ZeroDivision,
    /// No `MTrk` chunks were found
    #[error("no track chunks found")]
    NoTracks,
}
