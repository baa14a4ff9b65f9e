mod smpte;
pub use smpte::*;

/// The header timing type.
///
/// This is either the number of ticks per quarter note or
/// the alternative SMPTE format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    /// The midi file's delta times are defined using a tick rate per quarter note
    TicksPerQuarterNote(u16),

    /// The midi file's delta times are defined using SMPTE frames
    Smpte {
        /// Frame rate
        fps: Option<SmpteFps>,
        /// Ticks within one frame
        ticks_per_frame: u8,
    },
}

impl Timing {
    /// Decode the two division bytes of the header.
    ///
    /// The leading bit selects the format; for ticks per quarter note the
    /// remaining 15 bits are the tick rate.
    pub const fn from_division(bytes: [u8; 2]) -> Self {
        if bytes[0] & 0x80 == 0 {
            Self::TicksPerQuarterNote(u16::from_be_bytes(bytes) & 0x7FFF)
        } else {
            Self::Smpte {
                fps: SmpteFps::from_division_byte(bytes[0]),
                ticks_per_frame: bytes[1],
            }
        }
    }

    /// Returns Some if the midi timing is defined
    /// as ticks per quarter note
    pub const fn ticks_per_quarter_note(&self) -> Option<u16> {
        match self {
            Self::TicksPerQuarterNote(t) => Some(*t),
            _ => None,
        }
    }
}

#[test]
fn division_selects_timing() {
    assert_eq!(
        Timing::from_division([0x01, 0xE0]),
        Timing::TicksPerQuarterNote(480)
    );
    assert_eq!(
        Timing::from_division([0xE7, 40]),
        Timing::Smpte {
            fps: Some(SmpteFps::TwentyFive),
            ticks_per_frame: 40
        }
    );
    assert_eq!(
        Timing::from_division([0xE2, 40]).ticks_per_quarter_note(),
        None
    );
}
