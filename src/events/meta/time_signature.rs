use core::fmt;

#[doc = r#"
A Time Signature meta event (`FF 58 04 nn dd cc bb`).

The denominator is stored as a power of two: `dd = 3` means eighth notes.
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeSignature {
    numerator: u8,
    denominator_exponent: u8,
    clocks_per_click: u8,
    thirty_seconds_per_quarter: u8,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::COMMON_TIME
    }
}

impl TimeSignature {
    /// 4/4
    pub const COMMON_TIME: TimeSignature = TimeSignature {
        numerator: 4,
        denominator_exponent: 2,
        clocks_per_click: 24,
        thirty_seconds_per_quarter: 8,
    };

    /// Largest supported denominator exponent (1/64)
    pub const MAX_DENOMINATOR_EXPONENT: u8 = 6;

    /// Create a time signature from a numerator and a denominator exponent.
    pub const fn new(numerator: u8, denominator_exponent: u8) -> Option<Self> {
        if numerator == 0 || denominator_exponent > Self::MAX_DENOMINATOR_EXPONENT {
            return None;
        }
        Some(Self {
            numerator,
            denominator_exponent,
            clocks_per_click: 24,
            thirty_seconds_per_quarter: 8,
        })
    }

    /// Decode the payload of a Time Signature event.
    ///
    /// The metronome bytes are optional; some exporters omit them.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [nn, dd, cc, bb, ..] => Self::new(*nn, *dd).map(|sig| Self {
                clocks_per_click: *cc,
                thirty_seconds_per_quarter: *bb,
                ..sig
            }),
            [nn, dd, ..] => Self::new(*nn, *dd),
            _ => None,
        }
    }

    /// Beats per measure
    pub const fn numerator(&self) -> u8 {
        self.numerator
    }

    /// The note value of one beat, `2^exponent`
    pub const fn denominator(&self) -> u8 {
        1 << self.denominator_exponent
    }

    /// The raw exponent
    pub const fn denominator_exponent(&self) -> u8 {
        self.denominator_exponent
    }

    /// MIDI clocks per metronome click
    pub const fn clocks_per_click(&self) -> u8 {
        self.clocks_per_click
    }

    /// Notated 32nd notes per MIDI quarter note
    pub const fn thirty_seconds_per_quarter(&self) -> u8 {
        self.thirty_seconds_per_quarter
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator())
    }
}

#[test]
fn time_signature_payloads() {
    let sig = TimeSignature::from_bytes(&[6, 3, 36, 8]).unwrap();
    assert_eq!(sig.numerator(), 6);
    assert_eq!(sig.denominator(), 8);
    assert_eq!(sig.clocks_per_click(), 36);
    assert_eq!(sig.to_string(), "6/8");

    assert_eq!(TimeSignature::from_bytes(&[3, 2]).unwrap().to_string(), "3/4");
    let short = TimeSignature::from_bytes(&[5, 2, 36]).unwrap();
    assert_eq!(short.to_string(), "5/4");
    assert_eq!(short.clocks_per_click(), 24);
    assert_eq!(TimeSignature::from_bytes(&[0, 2, 24, 8]), None);
    assert_eq!(TimeSignature::from_bytes(&[4, 9, 24, 8]), None);
    assert_eq!(TimeSignature::from_bytes(&[4]), None);
}
