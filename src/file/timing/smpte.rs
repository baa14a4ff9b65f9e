#![doc = r#"
SMPTE time division

A header division with its top bit set describes time in SMPTE frames
rather than musical ticks. The high byte holds the negated frame rate
(-24, -25, -29 or -30) and the low byte the ticks per frame.

Notation import needs musical time, so files using this division are
recognized and then rejected with
[`ImportError::UnsupportedTiming`](crate::ImportError::UnsupportedTiming).
"#]

/// The possible FPS (Frames Per Second) of an SMPTE division
///
/// MIDI defines four frame types:
/// - 24 fps: Standard film rate
/// - 25 fps: PAL/SECAM television standard
/// - 29.97 fps: NTSC color television (drop-frame timecode)
/// - 30 fps: NTSC black & white, some digital video formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmpteFps {
    /// 24 frames per second
    TwentyFour,
    /// 25 frames per second
    TwentyFive,
    /// 29.97 frames per second (30000/1001), drop-frame
    TwentyNine,
    /// 30 frames per second
    Thirty,
}

impl SmpteFps {
    /// Identify the frame rate from the high byte of the division.
    ///
    /// Returns `None` for anything other than the four negated rates.
    pub const fn from_division_byte(byte: u8) -> Option<Self> {
        match byte as i8 {
            -24 => Some(Self::TwentyFour),
            -25 => Some(Self::TwentyFive),
            -29 => Some(Self::TwentyNine),
            -30 => Some(Self::Thirty),
            _ => None,
        }
    }
}

#[test]
fn frame_rates_from_twos_complement() {
    assert_eq!(SmpteFps::from_division_byte(0xE8), Some(SmpteFps::TwentyFour));
    assert_eq!(SmpteFps::from_division_byte(0xE7), Some(SmpteFps::TwentyFive));
    assert_eq!(SmpteFps::from_division_byte(0xE3), Some(SmpteFps::TwentyNine));
    assert_eq!(SmpteFps::from_division_byte(0xE2), Some(SmpteFps::Thirty));
    assert_eq!(SmpteFps::from_division_byte(0xE0), None);
}
