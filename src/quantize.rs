#![doc = r#"
Snapping tick-domain notes onto the notation grid

Positions snap to the nearest quarter of a beat (a sixteenth note), and
durations map to the nearest notation value by fixed thresholds. The whole
computation is integer arithmetic, so the same ticks always produce the
same result.

Durations are classified by their length in beats, measured in 32nds of a
beat (`ppq / 32` ticks each):

| class         | beats     | threshold |
|---------------|-----------|-----------|
| whole         | ≥ 3.5     | 112       |
| half          | ≥ 1.75    | 56        |
| quarter       | ≥ 0.875   | 28        |
| eighth        | ≥ 0.4375  | 14        |
| sixteenth     | ≥ 0.21875 | 7         |
| thirty-second | below     |           |
"#]

use crate::{Duration, assemble::NoteInterval};

/// Grid slots per beat
pub const SUBDIVISIONS_PER_BEAT: u64 = 4;

/// Where a note starts on the notation grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridPosition {
    /// Zero-based measure index
    pub measure: u32,
    /// Beat within the measure, `< beats_per_measure`
    pub beat: u8,
    /// Sixteenth slot within the beat, `0..4`
    pub sub_beat: u8,
}

/// A note value with its augmentation dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteValue {
    /// Base value
    pub duration: Duration,
    /// 0, 1 or 2
    pub dots: u8,
}

/// A note placed on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuantizedNote {
    /// Start position
    pub position: GridPosition,
    /// Notated value
    pub value: NoteValue,
    /// The interval it came from
    pub source: NoteInterval,
}

// undotted thresholds in 1/32 beats, longest first
const THRESHOLDS: [(u64, Duration); 5] = [
    (112, Duration::Whole),
    (56, Duration::Half),
    (28, Duration::Quarter),
    (14, Duration::Eighth),
    (7, Duration::Sixteenth),
];

// every representable value in 32nd notes, longest first
const DOTTED_VALUES: [(u64, Duration, u8); 15] = [
    (56, Duration::Whole, 2),
    (48, Duration::Whole, 1),
    (32, Duration::Whole, 0),
    (28, Duration::Half, 2),
    (24, Duration::Half, 1),
    (16, Duration::Half, 0),
    (14, Duration::Quarter, 2),
    (12, Duration::Quarter, 1),
    (8, Duration::Quarter, 0),
    (7, Duration::Eighth, 2),
    (6, Duration::Eighth, 1),
    (4, Duration::Eighth, 0),
    (3, Duration::Sixteenth, 1),
    (2, Duration::Sixteenth, 0),
    (1, Duration::ThirtySecond, 0),
];

/// Maps ticks to grid positions and note values for one score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantizer {
    ppq: u64,
    beats_per_measure: u64,
    dotted: bool,
}

impl Quantizer {
    /// A quantizer for `ppq` ticks per quarter and the given meter numerator.
    ///
    /// Zero values are raised to one so every division is defined.
    pub fn new(ticks_per_quarter_note: u16, beats_per_measure: u8) -> Self {
        Self {
            ppq: ticks_per_quarter_note.max(1) as u64,
            beats_per_measure: beats_per_measure.max(1) as u64,
            dotted: false,
        }
    }

    /// Choose the nearest dotted or undotted value instead of thresholds.
    pub const fn with_dotted_durations(mut self, dotted: bool) -> Self {
        self.dotted = dotted;
        self
    }

    /// Ticks in one measure
    pub const fn ticks_per_measure(&self) -> u64 {
        self.ppq * self.beats_per_measure
    }

    /// Grid position of `start_tick`.
    pub fn position(&self, start_tick: u64) -> GridPosition {
        let per_measure = self.ticks_per_measure();
        let measure = start_tick / per_measure;
        let within = start_tick % per_measure;

        let grid = (self.ppq / SUBDIVISIONS_PER_BEAT).max(1);
        // round half up to the nearest grid line
        let snapped = (within + grid / 2) / grid * grid;
        let beat = (snapped / self.ppq).min(self.beats_per_measure - 1);
        let sub_beat = ((snapped - beat * self.ppq) / grid).min(SUBDIVISIONS_PER_BEAT - 1);

        GridPosition {
            measure: u32::try_from(measure).unwrap_or(u32::MAX),
            beat: beat as u8,
            sub_beat: sub_beat as u8,
        }
    }

    /// Notated value of a duration in ticks.
    pub fn value(&self, duration_ticks: u64) -> NoteValue {
        if self.dotted {
            // in 32nd notes, scaled by ppq to stay integral
            return self.nearest_value(duration_ticks.saturating_mul(8));
        }
        let scaled = duration_ticks.saturating_mul(32);
        let duration = THRESHOLDS
            .iter()
            .find(|(threshold, _)| scaled >= threshold * self.ppq)
            .map(|(_, d)| *d)
            .unwrap_or(Duration::ThirtySecond);
        NoteValue { duration, dots: 0 }
    }

    fn nearest_value(&self, scaled: u64) -> NoteValue {
        let mut best = (u64::MAX, Duration::ThirtySecond, 0);
        for (thirty_seconds, duration, dots) in DOTTED_VALUES {
            let distance = scaled.abs_diff(thirty_seconds * self.ppq);
            if distance < best.0 {
                best = (distance, duration, dots);
            }
        }
        NoteValue {
            duration: best.1,
            dots: best.2,
        }
    }

    /// Place one note.
    pub fn quantize(&self, note: &NoteInterval) -> QuantizedNote {
        QuantizedNote {
            position: self.position(note.start_tick),
            value: self.value(note.duration_ticks),
            source: *note,
        }
    }
}

#[cfg(test)]
use crate::{Channel, Pitch};

#[test]
fn quarter_note_at_downbeat() {
    let q = Quantizer::new(480, 4);
    let note = NoteInterval {
        pitch: Pitch::MIDDLE_C,
        start_tick: 0,
        duration_ticks: 480,
        velocity: 80,
        channel: Channel::One,
    };
    let placed = q.quantize(&note);
    assert_eq!(
        placed.position,
        GridPosition {
            measure: 0,
            beat: 0,
            sub_beat: 0
        }
    );
    assert_eq!(
        placed.value,
        NoteValue {
            duration: Duration::Quarter,
            dots: 0
        }
    );
}

#[test]
fn positions_snap_to_sixteenths() {
    let q = Quantizer::new(480, 4);
    assert_eq!(q.ticks_per_measure(), 1920);
    // measure 1, beat 2
    assert_eq!(q.position(1920 + 960).measure, 1);
    assert_eq!(q.position(1920 + 960).beat, 2);
    // 5 ticks late still snaps to beat 1
    let p = q.position(485);
    assert_eq!((p.beat, p.sub_beat), (1, 0));
    // 59 ticks rounds down, 60 rounds up to the second sixteenth
    assert_eq!(q.position(59).sub_beat, 0);
    assert_eq!(q.position(60).sub_beat, 1);
    assert_eq!(q.position(360).sub_beat, 3);
}

#[test]
fn rounding_past_the_bar_clamps_to_last_beat() {
    let q = Quantizer::new(480, 4);
    let p = q.position(1919);
    assert_eq!(p.measure, 0);
    assert_eq!(p.beat, 3);
    assert_eq!(p.sub_beat, 3);
}

#[test]
fn duration_thresholds() {
    let q = Quantizer::new(480, 4);
    let d = |ticks| q.value(ticks).duration;
    assert_eq!(d(1920), Duration::Whole);
    assert_eq!(d(1680), Duration::Whole); // 3.5 beats
    assert_eq!(d(1679), Duration::Half);
    assert_eq!(d(840), Duration::Half); // 1.75 beats
    assert_eq!(d(839), Duration::Quarter);
    assert_eq!(d(420), Duration::Quarter); // 0.875 beats
    assert_eq!(d(419), Duration::Eighth);
    assert_eq!(d(210), Duration::Eighth); // 0.4375 beats
    assert_eq!(d(105), Duration::Sixteenth); // 0.21875 beats
    assert_eq!(d(104), Duration::ThirtySecond);
    assert_eq!(d(1), Duration::ThirtySecond);
    assert_eq!(q.value(1440).dots, 0);
}

#[test]
fn dotted_values_are_opt_in() {
    let q = Quantizer::new(480, 4).with_dotted_durations(true);
    let v = q.value(720);
    assert_eq!((v.duration, v.dots), (Duration::Quarter, 1));
    let v = q.value(1440);
    assert_eq!((v.duration, v.dots), (Duration::Half, 1));
    let v = q.value(480);
    assert_eq!((v.duration, v.dots), (Duration::Quarter, 0));
    let v = q.value(10_000);
    assert_eq!((v.duration, v.dots), (Duration::Whole, 2));
}

#[test]
fn tiny_resolution_does_not_divide_by_zero() {
    let q = Quantizer::new(2, 0);
    assert_eq!(q.ticks_per_measure(), 2);
    assert_eq!(q.position(3).measure, 1);
}
