#![doc = r#"
The notation-level score produced by an import

A [`Score`] is a grid of tracks, each split into the same number of
[`Measure`]s, each holding the [`Beat`]s that have notes. Tempo, meter and
key are global to the score.

```rust
# use midiscore::prelude::*;
let note = Note::new(60, Duration::Quarter, 1);
assert_eq!(note.ticks(480), 720);
assert!(Note::rest(Duration::Half).is_rest());
```
"#]

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{KeySignature, Pitch, Tempo};

mod builder;
pub use builder::*;

/// Base note value. The discriminant is the value's denominator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, IntoPrimitive, TryFromPrimitive,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[repr(u8)]
pub enum Duration {
    /// Whole note
    Whole = 1,
    /// Half note
    Half = 2,
    /// Quarter note
    Quarter = 4,
    /// Eighth note
    Eighth = 8,
    /// 16th
    Sixteenth = 16,
    /// 32nd
    ThirtySecond = 32,
}

impl Duration {
    /// Length in 32nd notes, without dots
    pub const fn thirty_seconds(&self) -> u64 {
        32 / *self as u64
    }
}

/// One notated note. Pitch `0` is a rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Note {
    /// MIDI key, or `0` for a rest
    pub pitch: u8,
    /// Base value
    pub duration: Duration,
    /// Augmentation dots, at most 2
    pub dots: u8,
}

impl Note {
    /// Pitch value reserved for rests
    pub const REST: u8 = 0;

    /// A note; `dots` is capped at 2.
    pub const fn new(pitch: u8, duration: Duration, dots: u8) -> Self {
        let dots = if dots > 2 { 2 } else { dots };
        Self {
            pitch,
            duration,
            dots,
        }
    }

    /// A rest of the given value
    pub const fn rest(duration: Duration) -> Self {
        Self::new(Self::REST, duration, 0)
    }

    /// Whether this is a rest
    pub const fn is_rest(&self) -> bool {
        self.pitch == Self::REST
    }

    /// The sounding pitch, `None` for rests
    pub fn midi_pitch(&self) -> Option<Pitch> {
        if self.is_rest() {
            return None;
        }
        Pitch::new(self.pitch).ok()
    }

    /// Notated length in ticks at `ticks_per_quarter_note`
    pub const fn ticks(&self, ticks_per_quarter_note: u16) -> u64 {
        let base = self.duration.thirty_seconds() * ticks_per_quarter_note as u64;
        // each dot adds half of the previous addition
        let total = match self.dots {
            0 => base,
            1 => base * 3 / 2,
            _ => base * 7 / 4,
        };
        total / 8
    }
}

/// The notes starting on one beat of a measure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Beat {
    /// Zero-based beat index, below the score's beats per measure
    pub index: u8,
    /// Notes in the order they were played
    pub notes: Vec<Note>,
}

/// One measure of a track.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measure {
    /// One-based measure number
    pub number: u32,
    /// Beats with notes, sorted by index
    pub beats: Vec<Beat>,
}

impl Measure {
    /// A measure with no notes
    pub const fn empty(number: u32) -> Self {
        Self {
            number,
            beats: Vec::new(),
        }
    }

    /// True when no beat has a note
    pub fn is_empty(&self) -> bool {
        self.beats.iter().all(|b| b.notes.is_empty())
    }

    /// The beat with `index`, if it has notes
    pub fn beat(&self, index: u8) -> Option<&Beat> {
        self.beats.iter().find(|b| b.index == index)
    }
}

/// Staff clef
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Clef {
    /// G clef
    #[default]
    Treble,
    /// F clef
    Bass,
}

impl Clef {
    /// Treble from middle C up, bass below
    pub const fn for_pitch(pitch: u8) -> Self {
        if pitch >= Pitch::MIDDLE_C.value() {
            Self::Treble
        } else {
            Self::Bass
        }
    }
}

/// Which hand plays a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Hand {
    /// Upper staff
    Right,
    /// Lower staff
    Left,
    /// Not a keyboard part
    #[default]
    Unassigned,
}

/// One staff of the score.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Track {
    /// Name from the file, or the hand's name
    pub name: Option<String>,
    /// Clef
    pub clef: Clef,
    /// Hand
    pub hand: Hand,
    /// Measures, as many as every other track in the score
    pub measures: Vec<Measure>,
}

impl Track {
    /// Number of sounding notes
    pub fn note_count(&self) -> usize {
        self.measures
            .iter()
            .flat_map(|m| &m.beats)
            .flat_map(|b| &b.notes)
            .filter(|n| !n.is_rest())
            .count()
    }
}

/// A quantized score.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Score {
    /// Key signature
    pub key: KeySignature,
    /// Time signature numerator
    pub beats_per_measure: u8,
    /// Time signature denominator
    pub beat_unit: u8,
    /// Tempo
    pub tempo: Tempo,
    /// Resolution of the source file
    pub ticks_per_quarter_note: u16,
    /// Staves, all with the same measure count
    pub tracks: Vec<Track>,
}

impl Score {
    /// Measures per track
    pub fn measure_count(&self) -> usize {
        self.tracks.first().map(|t| t.measures.len()).unwrap_or(0)
    }

    /// Tempo in beats per minute
    pub fn bpm(&self) -> f64 {
        self.tempo.bpm()
    }
}

#[test]
fn note_lengths() {
    assert_eq!(Duration::Whole.thirty_seconds(), 32);
    assert_eq!(Duration::ThirtySecond.thirty_seconds(), 1);
    assert_eq!(Note::new(60, Duration::Quarter, 0).ticks(480), 480);
    assert_eq!(Note::new(60, Duration::Half, 2).ticks(480), 1680);
    assert_eq!(Note::new(60, Duration::Quarter, 5).dots, 2);
    assert_eq!(Duration::try_from(8u8).ok(), Some(Duration::Eighth));
}

#[test]
fn rests() {
    let rest = Note::rest(Duration::Eighth);
    assert!(rest.is_rest());
    assert_eq!(rest.midi_pitch(), None);
    assert_eq!(
        Note::new(61, Duration::Eighth, 0).midi_pitch().map(|p| p.to_string()),
        Some("C#4".to_string())
    );
}

#[test]
fn clef_split() {
    assert_eq!(Clef::for_pitch(60), Clef::Treble);
    assert_eq!(Clef::for_pitch(59), Clef::Bass);
}

#[test]
fn score_level_values() {
    let score = Score {
        key: KeySignature::C_MAJOR,
        beats_per_measure: 3,
        beat_unit: 4,
        tempo: Tempo::DEFAULT,
        ticks_per_quarter_note: 480,
        tracks: vec![],
    };
    assert_eq!(score.measure_count(), 0);
    assert_eq!(score.bpm(), 120.0);
}
