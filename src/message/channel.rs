use num_enum::{IntoPrimitive, TryFromPrimitive};

#[doc = r#"
One of the sixteen MIDI channels.

Variants are named one-indexed, the way musicians count them; the
underlying value is the zero-indexed nibble from the status byte.
[`Channel::Ten`] is reserved for percussion in General MIDI.
"#]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, IntoPrimitive, TryFromPrimitive,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Channel {
    One = 0,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Eleven,
    Twelve,
    Thirteen,
    Fourteen,
    Fifteen,
    Sixteen,
}

impl Channel {
    /// The General MIDI percussion channel
    pub const PERCUSSION: Channel = Channel::Ten;

    /// Take the channel from the low nibble of a status byte.
    pub const fn from_status(status: u8) -> Self {
        use Channel::*;
        match status & 0x0F {
            0 => One,
            1 => Two,
            2 => Three,
            3 => Four,
            4 => Five,
            5 => Six,
            6 => Seven,
            7 => Eight,
            8 => Nine,
            9 => Ten,
            10 => Eleven,
            11 => Twelve,
            12 => Thirteen,
            13 => Fourteen,
            14 => Fifteen,
            _ => Sixteen,
        }
    }

    /// One-indexed channel number, 1 through 16
    pub fn number(&self) -> u8 {
        u8::from(*self) + 1
    }

    /// True for the General MIDI percussion channel
    pub const fn is_percussion(&self) -> bool {
        matches!(self, Channel::Ten)
    }
}

#[test]
fn channel_from_status_nibble() {
    assert_eq!(Channel::from_status(0x90), Channel::One);
    assert_eq!(Channel::from_status(0x89), Channel::Ten);
    assert_eq!(Channel::from_status(0xBF), Channel::Sixteen);
    assert!(Channel::from_status(0x99).is_percussion());
    assert_eq!(Channel::Ten.number(), 10);
    assert_eq!(u8::from(Channel::Ten), 9);
}
