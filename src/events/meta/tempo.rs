use core::fmt;

use thiserror::Error;

const MICROS_PER_MINUTE: u64 = 60_000_000;

#[doc = r#"
A tempo, stored the way a Set Tempo meta event stores it: microseconds per
quarter note.

```rust
# use midiscore::prelude::*;
let tempo = Tempo::from_bytes(&[0x07, 0xA1, 0x20]).unwrap(); // 500_000
assert_eq!(tempo.bpm(), 120.);
```
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub struct Tempo {
    micros_per_quarter_note: u32,
}

impl Default for Tempo {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Tempo {
    /// 120 BPM, the tempo a file has until it says otherwise
    pub const DEFAULT: Tempo = Tempo {
        micros_per_quarter_note: 500_000,
    };

    /// Largest value a three byte payload can carry
    pub const MAX_MICROS: u32 = 0x00FF_FFFF;

    /// Create a tempo. Zero and values above 24 bits are rejected.
    pub const fn new(micros_per_quarter_note: u32) -> Option<Self> {
        if micros_per_quarter_note == 0 || micros_per_quarter_note > Self::MAX_MICROS {
            return None;
        }
        Some(Self {
            micros_per_quarter_note,
        })
    }

    /// Decode the three byte big-endian payload of a Set Tempo event.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let [a, b, c] = bytes else {
            return None;
        };
        Self::new(u32::from_be_bytes([0, *a, *b, *c]))
    }

    /// Microseconds per quarter note
    pub const fn micros_per_quarter_note(&self) -> u32 {
        self.micros_per_quarter_note
    }

    /// Quarter notes per minute, `60_000_000 / µs`
    pub fn bpm(&self) -> f64 {
        MICROS_PER_MINUTE as f64 / self.micros_per_quarter_note as f64
    }

    /// Quarter notes per minute rounded to the nearest whole beat
    pub const fn bpm_rounded(&self) -> u32 {
        let us = self.micros_per_quarter_note as u64;
        ((MICROS_PER_MINUTE + us / 2) / us) as u32
    }
}

/// A tempo of zero, or one wider than 24 bits
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{0} µs per quarter note is not a valid tempo")]
pub struct InvalidTempo(pub u32);

impl TryFrom<u32> for Tempo {
    type Error = InvalidTempo;

    fn try_from(micros_per_quarter_note: u32) -> Result<Self, Self::Error> {
        Self::new(micros_per_quarter_note).ok_or(InvalidTempo(micros_per_quarter_note))
    }
}

impl From<Tempo> for u32 {
    fn from(tempo: Tempo) -> Self {
        tempo.micros_per_quarter_note
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if MICROS_PER_MINUTE % self.micros_per_quarter_note as u64 == 0 {
            write!(f, "{} BPM", self.bpm_rounded())
        } else {
            write!(f, "{:.2} BPM", self.bpm())
        }
    }
}

#[test]
fn set_tempo_payloads() {
    let tempo = Tempo::from_bytes(&[0x07, 0xA1, 0x20]).unwrap();
    assert_eq!(tempo.micros_per_quarter_note(), 500_000);
    assert_eq!(tempo.bpm(), 120.);
    assert_eq!(tempo.to_string(), "120 BPM");

    // 625_000 µs
    let tempo = Tempo::from_bytes(&[0x09, 0x89, 0x68]).unwrap();
    assert_eq!(tempo.bpm_rounded(), 96);
    assert_eq!(tempo.to_string(), "96 BPM");

    assert_eq!(Tempo::from_bytes(&[0, 0, 0]), None);
    assert_eq!(Tempo::from_bytes(&[0x07, 0xA1]), None);
}

#[test]
fn fractional_tempo_display() {
    let tempo = Tempo::new(700_000).unwrap();
    assert_eq!(tempo.bpm_rounded(), 86);
    assert_eq!(tempo.to_string(), "85.71 BPM");
}

#[test]
fn raw_values_are_validated() {
    assert_eq!(Tempo::try_from(500_000), Ok(Tempo::DEFAULT));
    assert_eq!(Tempo::try_from(0), Err(InvalidTempo(0)));
    assert_eq!(Tempo::try_from(0x0100_0000), Err(InvalidTempo(0x0100_0000)));
    assert_eq!(u32::from(Tempo::DEFAULT), 500_000);
}

#[cfg(feature = "serde")]
#[test]
fn deserializing_rejects_zero_tempo() {
    assert_eq!(serde_json::to_string(&Tempo::DEFAULT).unwrap(), "500000");
    assert_eq!(serde_json::from_str::<Tempo>("625000").unwrap().bpm_rounded(), 96);
    assert!(serde_json::from_str::<Tempo>("0").is_err());
}
