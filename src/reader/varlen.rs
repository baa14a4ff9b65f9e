#![doc = r#"
Variable-length quantities

Delta-times, meta-event lengths and sysex lengths in a Standard MIDI File
are stored as big-endian base-128 numbers. Each byte contributes its low
seven bits; a set high bit means another byte follows.

```text
0x00        -> 0
0x7F        -> 127
0x81 0x00   -> 128
0xFF 0x7F   -> 16_383
0x81 0x80 0x80 0x00 -> 2_097_152
```

Standard MIDI Files cap these at four bytes (`0x0FFF_FFFF`).
"#]

use thiserror::Error;

/// Largest number of bytes a single quantity may span.
pub const MAX_VARLEN_BYTES: usize = 4;

/// Errors produced while decoding a variable-length quantity.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VarLenError {
    /// The buffer ended while the continuation bit was still set.
    #[error("Variable-length quantity runs past the end of the data")]
    Truncated,
    /// More than [`MAX_VARLEN_BYTES`] bytes had the continuation bit set.
    #[error("Variable-length quantity is longer than {MAX_VARLEN_BYTES} bytes")]
    TooLong,
}

/// Decode the quantity starting at `cursor`.
///
/// Returns the value and the position of the first byte after it.
pub fn decode(bytes: &[u8], cursor: usize) -> Result<(u32, usize), VarLenError> {
    let mut value: u32 = 0;
    let mut position = cursor;

    for _ in 0..MAX_VARLEN_BYTES {
        let Some(&byte) = bytes.get(position) else {
            return Err(VarLenError::Truncated);
        };
        position += 1;
        value = (value << 7) | (byte & 0x7F) as u32;
        if byte & 0x80 == 0 {
            return Ok((value, position));
        }
    }

    Err(VarLenError::TooLong)
}

#[test]
fn decodes_single_byte_values() {
    assert_eq!(decode(&[0x00], 0), Ok((0, 1)));
    assert_eq!(decode(&[0x40], 0), Ok((0x40, 1)));
    assert_eq!(decode(&[0x7F], 0), Ok((0x7F, 1)));
}

#[test]
fn decodes_multi_byte_values() {
    assert_eq!(decode(&[0x81, 0x00], 0), Ok((0x80, 2)));
    assert_eq!(decode(&[0xC0, 0x00], 0), Ok((0x2000, 2)));
    assert_eq!(decode(&[0xFF, 0x7F], 0), Ok((0x3FFF, 2)));
    assert_eq!(decode(&[0x81, 0x80, 0x00], 0), Ok((0x4000, 3)));
    assert_eq!(decode(&[0xFF, 0xFF, 0xFF, 0x7F], 0), Ok((0x0FFF_FFFF, 4)));
}

#[test]
fn decodes_from_cursor_and_stops_at_terminator() {
    // 0x83 0x60 = 480, followed by an unrelated status byte
    let bytes = [0x90, 0x83, 0x60, 0x90];
    assert_eq!(decode(&bytes, 1), Ok((480, 3)));
}

#[test]
fn rejects_truncated_and_overlong_values() {
    assert_eq!(decode(&[], 0), Err(VarLenError::Truncated));
    assert_eq!(decode(&[0x81, 0x80], 0), Err(VarLenError::Truncated));
    assert_eq!(
        decode(&[0x80, 0x80, 0x80, 0x80, 0x00], 0),
        Err(VarLenError::TooLong)
    );
}
