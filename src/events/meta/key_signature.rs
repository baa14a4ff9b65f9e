use core::fmt;

use crate::Key;

const MAJOR_NAMES: [&str; 15] = [
    "Cb", "Gb", "Db", "Ab", "Eb", "Bb", "F", "C", "G", "D", "A", "E", "B", "F#", "C#",
];
const MINOR_NAMES: [&str; 15] = [
    "Ab", "Eb", "Bb", "F", "C", "G", "D", "A", "E", "B", "F#", "C#", "G#", "D#", "A#",
];

#[doc = r#"
A Key Signature meta event (`FF 59 02 sf mi`).

`sf` counts sharps when positive and flats when negative; `mi` is 1 for a
minor key.

```rust
# use midiscore::prelude::*;
let key = KeySignature::from_bytes(&[0xFD, 0x01]).unwrap(); // three flats, minor
assert_eq!(key.to_string(), "C minor");
assert_eq!(key.tonic(), Key::C);
```
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeySignature {
    sharps_flats: i8,
    minor: bool,
}

impl KeySignature {
    /// No sharps or flats, major
    pub const C_MAJOR: KeySignature = KeySignature {
        sharps_flats: 0,
        minor: false,
    };

    /// Create a key signature; `sharps_flats` must lie in `-7..=7`.
    pub const fn new(sharps_flats: i8, minor: bool) -> Option<Self> {
        if sharps_flats < -7 || sharps_flats > 7 {
            return None;
        }
        Some(Self {
            sharps_flats,
            minor,
        })
    }

    /// Decode the two byte payload.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [sf, 0] => Self::new(*sf as i8, false),
            [sf, 1] => Self::new(*sf as i8, true),
            _ => None,
        }
    }

    /// Sharps (positive) or flats (negative)
    pub const fn sharps_flats(&self) -> i8 {
        self.sharps_flats
    }

    /// True for a minor key
    pub const fn is_minor(&self) -> bool {
        self.minor
    }

    /// The pitch class of the key's tonic
    pub const fn tonic(&self) -> Key {
        // each sharp moves the tonic up a fifth
        let major = (self.sharps_flats as i16 * 7).rem_euclid(12);
        let semitone = if self.minor { (major + 9) % 12 } else { major };
        Key::from_semitone(semitone as u8)
    }

    /// Spelled tonic name, such as `Eb` or `F#`
    pub const fn tonic_name(&self) -> &'static str {
        let index = (self.sharps_flats + 7) as usize;
        if self.minor {
            MINOR_NAMES[index]
        } else {
            MAJOR_NAMES[index]
        }
    }
}

impl fmt::Display for KeySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.minor { "minor" } else { "major" };
        write!(f, "{} {}", self.tonic_name(), mode)
    }
}

#[test]
fn key_signature_names() {
    assert_eq!(KeySignature::C_MAJOR.to_string(), "C major");
    assert_eq!(KeySignature::new(1, false).unwrap().to_string(), "G major");
    assert_eq!(KeySignature::new(-1, false).unwrap().tonic(), Key::F);
    assert_eq!(KeySignature::new(0, true).unwrap().to_string(), "A minor");
    assert_eq!(KeySignature::new(-7, false).unwrap().to_string(), "Cb major");
    assert_eq!(KeySignature::new(7, true).unwrap().tonic(), Key::ASharp);
}

#[test]
fn rejects_out_of_range_payloads() {
    assert_eq!(KeySignature::from_bytes(&[8, 0]), None);
    assert_eq!(KeySignature::from_bytes(&[0xF8, 0]), None);
    assert_eq!(KeySignature::from_bytes(&[0, 2]), None);
    assert_eq!(KeySignature::from_bytes(&[0]), None);
}
