use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Status byte of a meta event
pub const META_STATUS: u8 = 0xFF;
/// Status byte that opens a System Exclusive event
pub const SYSEX_STATUS: u8 = 0xF0;
/// Status byte of a System Exclusive continuation or escape
pub const SYSEX_ESCAPE_STATUS: u8 = 0xF7;
/// Controller number of the sustain (damper) pedal
pub const SUSTAIN_PEDAL_CONTROLLER: u8 = 64;

#[doc = r#"
The high nibble of a channel status byte.
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum VoiceStatus {
    /// `0x8n`
    NoteOff = 0x8,
    /// `0x9n`
    NoteOn = 0x9,
    /// `0xAn`
    PolyPressure = 0xA,
    /// `0xBn`
    ControlChange = 0xB,
    /// `0xCn`
    ProgramChange = 0xC,
    /// `0xDn`
    ChannelPressure = 0xD,
    /// `0xEn`
    PitchBend = 0xE,
}

impl VoiceStatus {
    /// Identify the message family of a status byte.
    ///
    /// Returns `None` for data bytes and system messages (`0xF0..=0xFF`).
    pub fn from_status(status: u8) -> Option<Self> {
        Self::try_from(status >> 4).ok()
    }

    /// Number of data bytes that follow the status byte
    pub const fn data_len(&self) -> usize {
        match self {
            Self::ProgramChange | Self::ChannelPressure => 1,
            _ => 2,
        }
    }
}

/// Number of data bytes after a system common or realtime status byte.
///
/// These are not valid inside a file, but skipping them by their wire
/// length keeps the rest of the track aligned.
pub const fn system_data_len(status: u8) -> usize {
    match status {
        0xF1 | 0xF3 => 1,
        0xF2 => 2,
        _ => 0,
    }
}

#[test]
fn voice_status_lengths() {
    assert_eq!(VoiceStatus::from_status(0x93), Some(VoiceStatus::NoteOn));
    assert_eq!(VoiceStatus::from_status(0xC0).map(|s| s.data_len()), Some(1));
    assert_eq!(VoiceStatus::from_status(0xD5).map(|s| s.data_len()), Some(1));
    assert_eq!(VoiceStatus::from_status(0xE1).map(|s| s.data_len()), Some(2));
    assert_eq!(VoiceStatus::from_status(0x40), None);
    assert_eq!(VoiceStatus::from_status(0xFF), None);
}
