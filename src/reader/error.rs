use crate::ParseError;
use thiserror::Error;

#[doc = r#"
A failed read, located by its byte offset in the input.

Offsets are relative to whatever slice the [`Reader`](super::Reader) was
built over. For track bodies that is the start of the `MTrk` payload.
"#]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("at byte {position}: {kind}")]
pub struct ReaderError {
    position: usize,
    kind: ReaderErrorKind,
}

/// Why a read failed
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReaderErrorKind {
    /// The bytes were there but made no sense
    #[error("{0}")]
    ParseError(#[from] ParseError),
    /// The input ended first
    #[error("unexpected end of data")]
    OutOfBounds,
}

impl ReaderError {
    /// The input ended at `position`
    pub const fn oob(position: usize) -> Self {
        Self {
            position,
            kind: ReaderErrorKind::OutOfBounds,
        }
    }

    /// Malformed data found at `position`
    pub fn parse_error(position: usize, error: impl Into<ParseError>) -> Self {
        Self {
            position,
            kind: error.into().into(),
        }
    }

    /// Whether the input simply ran out
    pub const fn is_out_of_bounds(&self) -> bool {
        matches!(self.kind, ReaderErrorKind::OutOfBounds)
    }

    /// Offset of the failing read
    pub const fn position(&self) -> usize {
        self.position
    }

    /// What went wrong
    pub const fn error_kind(&self) -> &ReaderErrorKind {
        &self.kind
    }
}

/// Result of a [`Reader`](super::Reader) operation
pub type ReadResult<T> = Result<T, ReaderError>;
