#![doc = r#"
Chunk framing

MIDI files are organized into chunks, each identified by a 4-character ASCII
type identifier followed by a 32-bit big-endian length and then the chunk
data.

```text
[Header Chunk: "MThd"]
[Track Chunk 1: "MTrk"]
[Track Chunk 2: "MTrk"]
...
[Track Chunk N: "MTrk"]
[Optional Unknown Chunks]
```

The reader always advances by the declared length, so a track whose
contents are later found to be damaged never shifts the offsets of the
chunks that follow it.
"#]

use crate::{
    ChunkError,
    reader::{ReadResult, Reader, ReaderError},
};

/// Type identifier of the header chunk
pub const HEADER_MAGIC: [u8; 4] = *b"MThd";
/// Type identifier of a track chunk
pub const TRACK_MAGIC: [u8; 4] = *b"MTrk";
/// Magic plus length
pub const CHUNK_PREAMBLE_LEN: usize = 8;

/// One framed chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawChunk<'a> {
    /// An `MTrk` payload
    Track(&'a [u8]),
    /// Any other chunk type, kept so callers may report it
    Unknown {
        /// Type identifier
        magic: [u8; 4],
        /// Payload
        data: &'a [u8],
    },
}

/// The payload of one `MTrk` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackChunk<'a> {
    pub(crate) index: usize,
    pub(crate) offset: usize,
    pub(crate) data: &'a [u8],
}

impl<'a> TrackChunk<'a> {
    /// Position of this track among the file's track chunks
    pub const fn index(&self) -> usize {
        self.index
    }
    /// Byte offset of the payload within the file
    pub const fn offset(&self) -> usize {
        self.offset
    }
    /// The raw event bytes
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }
}

/// Render a chunk type for messages, replacing non-printable bytes.
pub fn magic_to_string(magic: [u8; 4]) -> String {
    magic
        .iter()
        .map(|b| {
            if b.is_ascii_graphic() {
                *b as char
            } else {
                '?'
            }
        })
        .collect()
}

/// Read one chunk preamble and slice out its payload.
pub(crate) fn read_chunk<'a>(reader: &mut Reader<'a>) -> ReadResult<RawChunk<'a>> {
    let start = reader.buffer_position();
    let magic = reader.read_exact_size::<4>()?;
    let declared = reader.read_u32()?;

    let available = reader.remaining();
    if declared as usize > available {
        return Err(ReaderError::parse_error(
            start,
            ChunkError::LengthOverflow {
                magic: magic_to_string(magic),
                declared,
                available,
            },
        ));
    }
    let data = reader.read_slice(declared as usize)?;

    Ok(if magic == TRACK_MAGIC {
        RawChunk::Track(data)
    } else {
        RawChunk::Unknown { magic, data }
    })
}

#[test]
fn frames_track_and_unknown_chunks() {
    let bytes = [
        b'M', b'T', b'r', b'k', 0, 0, 0, 2, 0xAA, 0xBB, //
        b'X', b'Y', b'Z', b'W', 0, 0, 0, 1, 0xCC,
    ];
    let mut reader = Reader::from_byte_slice(&bytes);
    assert_eq!(read_chunk(&mut reader).unwrap(), RawChunk::Track(&[0xAA, 0xBB]));
    assert_eq!(
        read_chunk(&mut reader).unwrap(),
        RawChunk::Unknown {
            magic: *b"XYZW",
            data: &[0xCC]
        }
    );
    assert!(reader.is_at_end());
}

#[test]
fn declared_length_past_end_is_an_error() {
    let bytes = [b'M', b'T', b'r', b'k', 0, 0, 0, 9, 0x00, 0xFF];
    let mut reader = Reader::from_byte_slice(&bytes);
    let err = read_chunk(&mut reader).unwrap_err();
    assert!(!err.is_out_of_bounds());
    assert_eq!(err.position(), 0);
}
