#![doc = r#"
Framing of a Standard MIDI File into its header and track payloads
"#]

mod format;
pub use format::*;

mod header;
pub use header::*;

mod timing;
pub use timing::*;

pub mod chunk;
use chunk::{CHUNK_PREAMBLE_LEN, HEADER_MAGIC, RawChunk, TrackChunk};

use crate::{
    HeaderError, ImportError, ImportWarning, Warnings,
    reader::{Reader, ReaderError},
};

/// Required length of the `MThd` payload
pub const HEADER_LEN: u32 = 6;

#[doc = r#"
A framed MIDI file: the header plus one borrowed payload per `MTrk` chunk.

Nothing inside the tracks has been decoded yet.
"#]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmfFile<'a> {
    header: SmfHeader,
    tracks: Vec<TrackChunk<'a>>,
}

impl<'a> SmfFile<'a> {
    /// Frame `bytes` into header and track chunks.
    ///
    /// Recoverable oddities (unknown chunks, a wrong track count, trailing
    /// padding) are pushed to `warnings`.
    pub fn parse(bytes: &'a [u8], warnings: &mut Warnings) -> Result<Self, ImportError> {
        let mut reader = Reader::from_byte_slice(bytes);
        let header = read_header(&mut reader)?;

        let mut tracks = Vec::new();
        while !reader.is_at_end() {
            if reader.remaining() < CHUNK_PREAMBLE_LEN {
                warnings.push(ImportWarning::TrailingBytes(reader.remaining()));
                break;
            }
            let offset = reader.buffer_position() + CHUNK_PREAMBLE_LEN;
            match chunk::read_chunk(&mut reader)? {
                RawChunk::Track(data) => tracks.push(TrackChunk {
                    index: tracks.len(),
                    offset,
                    data,
                }),
                RawChunk::Unknown { magic, data } => {
                    warnings.push(ImportWarning::UnknownChunk {
                        magic: chunk::magic_to_string(magic),
                        len: data.len() as u32,
                    });
                }
            }
        }

        if tracks.is_empty() {
            return Err(ImportError::NoTracks);
        }
        if tracks.len() != header.declared_tracks as usize {
            warnings.push(ImportWarning::TrackCountMismatch {
                declared: header.declared_tracks,
                found: tracks.len(),
            });
        }
        tracing::debug!(
            format = ?header.format,
            tracks = tracks.len(),
            timing = ?header.timing,
            "framed midi file"
        );

        Ok(Self { header, tracks })
    }

    /// Returns header info
    pub fn header(&self) -> &SmfHeader {
        &self.header
    }

    /// Returns the header timing
    pub fn timing(&self) -> Timing {
        self.header.timing
    }

    /// Returns the track chunks in file order
    pub fn tracks(&self) -> &[TrackChunk<'a>] {
        &self.tracks
    }
}

fn read_header(reader: &mut Reader<'_>) -> Result<SmfHeader, ImportError> {
    let magic = reader.read_exact_size::<4>()?;
    if magic != HEADER_MAGIC {
        return Err(ReaderError::parse_error(0, HeaderError::InvalidMagic(magic)).into());
    }
    let len = reader.read_u32()?;
    if len != HEADER_LEN {
        return Err(ReaderError::parse_error(4, HeaderError::InvalidLength(len)).into());
    }

    let raw_format = reader.read_u16()?;
    let format = FormatType::try_from(raw_format)
        .ok()
        .filter(FormatType::is_importable)
        .ok_or(ImportError::UnsupportedFormat(raw_format))?;
    let declared_tracks = reader.read_u16()?;
    let timing = Timing::from_division(reader.read_exact_size()?);

    Ok(SmfHeader::new(format, declared_tracks, timing))
}

#[cfg(test)]
fn header_bytes(format: u16, tracks: u16, division: [u8; 2]) -> Vec<u8> {
    let mut bytes = b"MThd".to_vec();
    bytes.extend_from_slice(&6u32.to_be_bytes());
    bytes.extend_from_slice(&format.to_be_bytes());
    bytes.extend_from_slice(&tracks.to_be_bytes());
    bytes.extend_from_slice(&division);
    bytes
}

#[test]
fn frames_header_and_tracks() {
    let mut bytes = header_bytes(1, 2, [0x01, 0xE0]);
    bytes.extend_from_slice(b"MTrk\x00\x00\x00\x04\x00\xFF\x2F\x00");
    bytes.extend_from_slice(b"MTrk\x00\x00\x00\x04\x00\xFF\x2F\x00");

    let mut warnings = Warnings::new();
    let file = SmfFile::parse(&bytes, &mut warnings).unwrap();
    assert!(warnings.is_empty());
    assert_eq!(file.header().format(), FormatType::Simultaneous);
    assert_eq!(file.timing().ticks_per_quarter_note(), Some(480));
    assert_eq!(file.tracks().len(), 2);
    assert_eq!(file.tracks()[1].index(), 1);
    assert_eq!(file.tracks()[1].offset(), 14 + 12 + 8);
    assert_eq!(file.tracks()[1].data(), &[0x00, 0xFF, 0x2F, 0x00]);
}

#[test]
fn rejects_bad_magic_and_format_two() {
    let mut warnings = Warnings::new();
    let err = SmfFile::parse(b"RIFF\x00\x00\x00\x06\x00\x00\x00\x01\x00\x60", &mut warnings)
        .unwrap_err();
    assert!(matches!(err, ImportError::Structural(_)));

    let bytes = header_bytes(2, 1, [0x00, 0x60]);
    let err = SmfFile::parse(&bytes, &mut warnings).unwrap_err();
    assert_eq!(err, ImportError::UnsupportedFormat(2));
}

#[test]
fn header_only_file_has_no_tracks() {
    let mut warnings = Warnings::new();
    let bytes = header_bytes(0, 1, [0x00, 0x60]);
    assert_eq!(
        SmfFile::parse(&bytes, &mut warnings).unwrap_err(),
        ImportError::NoTracks
    );
}

#[test]
fn reports_unknown_chunks_and_padding() {
    let mut bytes = header_bytes(0, 1, [0x00, 0x60]);
    bytes.extend_from_slice(b"XFIH\x00\x00\x00\x01\x07");
    bytes.extend_from_slice(b"MTrk\x00\x00\x00\x04\x00\xFF\x2F\x00");
    bytes.extend_from_slice(&[0, 0, 0]);

    let mut warnings = Warnings::new();
    let file = SmfFile::parse(&bytes, &mut warnings).unwrap();
    assert_eq!(file.tracks().len(), 1);
    assert_eq!(
        warnings.into_vec(),
        vec![
            ImportWarning::UnknownChunk {
                magic: "XFIH".to_string(),
                len: 1
            },
            ImportWarning::TrailingBytes(3),
        ]
    );
}
