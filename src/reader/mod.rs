#![doc = r#"
A cursor over the bytes of a MIDI file

[`Reader`] never copies: every slice it hands out borrows from the
original buffer. Reads that would run past the end of the buffer fail with
[`ReaderErrorKind::OutOfBounds`] and leave the cursor where it was.
"#]

mod error;
pub use error::*;

pub mod varlen;

use varlen::VarLenError;

/// Reads big-endian integers, fixed-size arrays, slices and
/// variable-length quantities from a borrowed byte buffer.
#[derive(Debug, Clone)]
pub struct Reader<'slc> {
    data: &'slc [u8],
    position: usize,
}

impl<'slc> Reader<'slc> {
    /// Create a reader positioned at the start of `data`.
    pub const fn from_byte_slice(data: &'slc [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Create a reader positioned at `position` within `data`.
    pub const fn at(data: &'slc [u8], position: usize) -> Self {
        Self { data, position }
    }

    /// The current offset into the buffer.
    pub const fn buffer_position(&self) -> usize {
        self.position
    }

    /// Number of unread bytes.
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// True when every byte has been consumed.
    pub const fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    /// Look at the next byte without consuming it.
    pub fn peek_byte(&self) -> Option<u8> {
        self.data.get(self.position).copied()
    }

    /// Consume one byte.
    pub fn read_byte(&mut self) -> ReadResult<u8> {
        let byte = self
            .peek_byte()
            .ok_or(ReaderError::oob(self.position))?;
        self.position += 1;
        Ok(byte)
    }

    /// Consume exactly `len` bytes.
    pub fn read_slice(&mut self, len: usize) -> ReadResult<&'slc [u8]> {
        let end = self
            .position
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(ReaderError::oob(self.position))?;
        let slice = &self.data[self.position..end];
        self.position = end;
        Ok(slice)
    }

    /// Consume `N` bytes into an array.
    pub fn read_exact_size<const N: usize>(&mut self) -> ReadResult<[u8; N]> {
        let slice = self.read_slice(N)?;
        let mut out = [0; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    /// Consume a big-endian `u16`.
    pub fn read_u16(&mut self) -> ReadResult<u16> {
        self.read_exact_size().map(u16::from_be_bytes)
    }

    /// Consume a big-endian `u32`.
    pub fn read_u32(&mut self) -> ReadResult<u32> {
        self.read_exact_size().map(u32::from_be_bytes)
    }

    /// Consume a variable-length quantity (see [`varlen`]).
    pub fn read_varlen(&mut self) -> ReadResult<u32> {
        match varlen::decode(self.data, self.position) {
            Ok((value, next)) => {
                self.position = next;
                Ok(value)
            }
            Err(VarLenError::Truncated) => Err(ReaderError::oob(self.position)),
            Err(e) => Err(ReaderError::parse_error(self.position, e)),
        }
    }

    /// Consume a variable-length quantity and then that many bytes.
    pub fn read_varlen_slice(&mut self) -> ReadResult<&'slc [u8]> {
        let start = self.position;
        let len = self.read_varlen()?;
        self.read_slice(len as usize).inspect_err(|_| {
            self.position = start;
        })
    }
}

#[test]
fn reads_big_endian_integers() {
    let bytes = [0x00, 0x06, 0x00, 0x00, 0x01, 0xE0];
    let mut reader = Reader::from_byte_slice(&bytes);
    assert_eq!(reader.read_u16().unwrap(), 6);
    assert_eq!(reader.read_u32().unwrap(), 480);
    assert!(reader.is_at_end());
}

#[test]
fn out_of_bounds_read_leaves_cursor() {
    let bytes = [0x01, 0x02];
    let mut reader = Reader::from_byte_slice(&bytes);
    reader.read_byte().unwrap();
    let err = reader.read_u16().unwrap_err();
    assert!(err.is_out_of_bounds());
    assert_eq!(err.position(), 1);
    assert_eq!(reader.buffer_position(), 1);
}

#[test]
fn varlen_slice_rewinds_when_payload_is_short() {
    // length 5, only 2 bytes of payload
    let bytes = [0x05, 0xAA, 0xBB];
    let mut reader = Reader::from_byte_slice(&bytes);
    assert!(reader.read_varlen_slice().unwrap_err().is_out_of_bounds());
    assert_eq!(reader.buffer_position(), 0);

    let bytes = [0x02, 0xAA, 0xBB];
    let mut reader = Reader::from_byte_slice(&bytes);
    assert_eq!(reader.read_varlen_slice().unwrap(), &[0xAA, 0xBB]);
}
