use std::collections::BTreeMap;

use crate::{
    KeySignature, Tempo, TimeSignature,
    ImportWarning, Warnings,
    group::GroupedTrack,
    quantize::Quantizer,
    resolve::GlobalMeta,
    score::{Beat, Measure, Note, Score, Track},
};

// measure index -> beat index -> notes in event order
type Grid = BTreeMap<u32, BTreeMap<u8, Vec<Note>>>;

#[doc = r#"
Lays grouped tracks out as measures and beats.

Every track receives the same number of measures: one past the last measure
any track reaches. Measures without notes are kept as empty measures.

Scores hold at most [`ScoreBuilder::MAX_MEASURES`] measures. Notes starting
later are dropped with [`ImportWarning::MeasureLimitExceeded`].
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBuilder {
    quantizer: Quantizer,
    key: KeySignature,
    time_signature: TimeSignature,
    tempo: Tempo,
    ticks_per_quarter_note: u16,
}

impl ScoreBuilder {
    /// Measures per track beyond which notes are dropped
    pub const MAX_MEASURES: u32 = 10_000;

    /// A builder for a file with the given resolution and resolved meta.
    pub fn new(meta: &GlobalMeta, ticks_per_quarter_note: u16) -> Self {
        let time_signature = meta.time_signature.value;
        Self {
            quantizer: Quantizer::new(ticks_per_quarter_note, time_signature.numerator()),
            key: meta.key_signature.value,
            time_signature,
            tempo: meta.tempo.value,
            ticks_per_quarter_note,
        }
    }

    /// Allow dotted note values
    pub const fn with_dotted_durations(mut self, dotted: bool) -> Self {
        self.quantizer = self.quantizer.with_dotted_durations(dotted);
        self
    }

    /// The quantizer used for every note
    pub const fn quantizer(&self) -> &Quantizer {
        &self.quantizer
    }

    fn grid(&self, track: &GroupedTrack, dropped: &mut usize) -> Grid {
        let mut grid = Grid::new();
        for interval in &track.notes {
            let placed = self.quantizer.quantize(interval);
            if placed.position.measure >= Self::MAX_MEASURES {
                *dropped += 1;
                continue;
            }
            let note = Note::new(
                interval.pitch.value(),
                placed.value.duration,
                placed.value.dots,
            );
            grid.entry(placed.position.measure)
                .or_default()
                .entry(placed.position.beat)
                .or_default()
                .push(note);
        }
        grid
    }

    /// Quantize and lay out every track.
    pub fn build(&self, tracks: Vec<GroupedTrack>, warnings: &mut Warnings) -> Score {
        let mut dropped = 0;
        let grids: Vec<Grid> = tracks.iter().map(|t| self.grid(t, &mut dropped)).collect();
        if dropped > 0 {
            warnings.push(ImportWarning::MeasureLimitExceeded {
                limit: Self::MAX_MEASURES,
                dropped,
            });
        }
        let measure_count = if tracks.is_empty() {
            0
        } else {
            grids
                .iter()
                .filter_map(|g| g.keys().next_back())
                .max()
                .map(|last| last + 1)
                .unwrap_or(1)
        };

        let tracks: Vec<Track> = tracks
            .into_iter()
            .zip(grids)
            .map(|(track, grid)| Track {
                name: track.name,
                clef: track.clef,
                hand: track.hand,
                measures: lay_out(grid, measure_count),
            })
            .collect();

        tracing::debug!(
            tracks = tracks.len(),
            measures = measure_count,
            "built score"
        );

        Score {
            key: self.key,
            beats_per_measure: self.time_signature.numerator(),
            beat_unit: self.time_signature.denominator(),
            tempo: self.tempo,
            ticks_per_quarter_note: self.ticks_per_quarter_note,
            tracks,
        }
    }
}

fn lay_out(mut grid: Grid, measure_count: u32) -> Vec<Measure> {
    (0..measure_count)
        .map(|index| match grid.remove(&index) {
            Some(beats) => Measure {
                number: index + 1,
                beats: beats
                    .into_iter()
                    .map(|(index, notes)| Beat { index, notes })
                    .collect(),
            },
            None => Measure::empty(index + 1),
        })
        .collect()
}

#[cfg(test)]
use crate::{
    Channel, Duration, Pitch,
    assemble::NoteInterval,
    resolve,
    score::{Clef, Hand},
};
#[cfg(test)]
use pretty_assertions::assert_eq;

#[cfg(test)]
fn interval(pitch: u8, start_tick: u64, duration_ticks: u64) -> NoteInterval {
    NoteInterval {
        pitch: Pitch::new(pitch).unwrap(),
        start_tick,
        duration_ticks,
        velocity: 90,
        channel: Channel::One,
    }
}

#[cfg(test)]
fn staff(notes: Vec<NoteInterval>) -> GroupedTrack {
    GroupedTrack {
        name: None,
        clef: Clef::Treble,
        hand: Hand::Right,
        notes,
    }
}

#[cfg(test)]
fn builder() -> ScoreBuilder {
    ScoreBuilder::new(&resolve::resolve(&[]), 480)
}

#[test]
fn notes_land_in_beats() {
    let score = builder().build(
        vec![staff(vec![
            interval(60, 0, 480),
            interval(64, 0, 480),
            interval(67, 960, 240),
        ])],
        &mut Warnings::new(),
    );
    assert_eq!(score.beats_per_measure, 4);
    assert_eq!(score.beat_unit, 4);
    assert_eq!(score.measure_count(), 1);
    assert_eq!(
        score.tracks[0].measures[0],
        Measure {
            number: 1,
            beats: vec![
                Beat {
                    index: 0,
                    notes: vec![
                        Note::new(60, Duration::Quarter, 0),
                        Note::new(64, Duration::Quarter, 0),
                    ],
                },
                Beat {
                    index: 2,
                    notes: vec![Note::new(67, Duration::Eighth, 0)],
                },
            ],
        }
    );
}

#[test]
fn tracks_are_padded_to_the_same_length() {
    let score = builder().build(
        vec![
            staff(vec![interval(60, 0, 480)]),
            staff(vec![interval(48, 1920 * 2, 480)]),
            staff(vec![]),
        ],
        &mut Warnings::new(),
    );
    assert_eq!(score.measure_count(), 3);
    for track in &score.tracks {
        let numbers: Vec<u32> = track.measures.iter().map(|m| m.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }
    assert!(score.tracks[0].measures[1].is_empty());
    assert!(score.tracks[1].measures[0].is_empty());
    assert_eq!(score.tracks[1].measures[2].beat(0).map(|b| b.notes.len()), Some(1));
}

#[test]
fn far_off_notes_are_dropped_at_the_measure_limit() {
    let limit = u64::from(ScoreBuilder::MAX_MEASURES);
    let mut warnings = Warnings::new();
    let score = builder().build(
        vec![
            staff(vec![
                interval(60, 0, 480),
                interval(62, (limit - 1) * 1920, 480),
                interval(64, limit * 1920, 480),
            ]),
            staff(vec![interval(48, 0x0FFF_FFFF, 480)]),
        ],
        &mut warnings,
    );
    assert_eq!(score.measure_count(), ScoreBuilder::MAX_MEASURES as usize);
    assert_eq!(score.tracks[0].note_count(), 2);
    assert_eq!(score.tracks[1].note_count(), 0);
    assert_eq!(
        warnings.into_vec(),
        vec![ImportWarning::MeasureLimitExceeded {
            limit: ScoreBuilder::MAX_MEASURES,
            dropped: 2,
        }]
    );
}

#[test]
fn empty_staves_still_get_one_measure() {
    let score = builder().build(vec![staff(vec![])], &mut Warnings::new());
    assert_eq!(score.measure_count(), 1);
    assert!(builder().build(vec![], &mut Warnings::new()).tracks.is_empty());
}
