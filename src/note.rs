use core::fmt;

use crate::EventError;

#[doc = r#"
A MIDI key number, 0 through 127.

Each value corresponds to some [`Key`] and [`Octave`].

[`Pitch`] `0` is `C(-1)`, [`Pitch::MIDDLE_C`] is `60` (`C4`), and [`Pitch`]
`127` is `G9`.

# Example
```rust
# use midiscore::prelude::*;
let e_flat = Pitch::new(63).unwrap();
assert_eq!(e_flat.key(), Key::DSharp);
assert_eq!(e_flat.to_string(), "D#4");
assert!(Pitch::new(0x90).is_err());
```
"#]
#[derive(Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pitch(u8);

impl Pitch {
    /// The lowest key
    pub const MIN: Pitch = Pitch(0);
    /// Middle C, the boundary between the two hands of a piano grand staff
    pub const MIDDLE_C: Pitch = Pitch(60);
    /// The highest key
    pub const MAX: Pitch = Pitch(127);

    /// Create a new pitch.
    ///
    /// Checks for correctness (leading 0 bit).
    pub const fn new(byte: u8) -> Result<Self, EventError> {
        if byte > 0x7F {
            return Err(EventError::InvalidDataByte(byte));
        }
        Ok(Self(byte))
    }

    /// The key number
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Identifies the key of the pitch
    #[inline]
    pub const fn key(&self) -> Key {
        Key::from_semitone(self.0 % 12)
    }

    /// Identifies the octave of the pitch
    #[inline]
    pub const fn octave(&self) -> Octave {
        Octave((self.0 / 12) as i8 - 1)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.key(), self.octave())
    }
}

#[allow(missing_docs)]
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[doc = r#"
One of the twelve pitch classes
"#]
#[repr(u8)]
pub enum Key {
    C = 0,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

const KEYS: [Key; 12] = {
    use Key::*;
    [C, CSharp, D, DSharp, E, F, FSharp, G, GSharp, A, ASharp, B]
};

const NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

impl Key {
    /// Identify the key from a semitone above C. Wraps modulo 12.
    #[inline]
    pub const fn from_semitone(semitone: u8) -> Self {
        KEYS[(semitone % 12) as usize]
    }

    /// Semitones above C
    pub const fn semitone(&self) -> u8 {
        *self as u8
    }

    /// The note name with `#` for sharps
    pub const fn name(&self) -> &'static str {
        NAMES[self.semitone() as usize]
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[doc = r#"
Identifies the octave for a [`Pitch`]. Values range from -1 to 9.
"#]
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct Octave(i8);

impl Octave {
    /// The octave number
    pub const fn value(&self) -> i8 {
        self.0
    }
}

impl fmt::Display for Octave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[test]
fn pitch_rejects_status_bytes() {
    assert!(Pitch::new(127).is_ok());
    assert_eq!(Pitch::new(128), Err(EventError::InvalidDataByte(128)));
}

#[test]
fn keys_name_and_wrap() {
    assert_eq!(Key::from_semitone(13), Key::CSharp);
    assert_eq!(Key::FSharp.name(), "F#");
    assert_eq!(Pitch::MAX.to_string(), "G9");
    assert_eq!(Pitch::MIN.octave().value(), -1);
}

#[test]
fn pitch_key_and_octave() {
    let c = Pitch::new(12).unwrap();
    assert_eq!(Key::C, c.key());
    assert_eq!(0, c.octave().value());

    let a_sharp = Pitch::new(94).unwrap();
    assert_eq!(Key::ASharp, a_sharp.key());
    assert_eq!(6, a_sharp.octave().value());

    assert_eq!(Pitch::MIDDLE_C.to_string(), "C4");
}
