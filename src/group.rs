#![doc = r#"
Turning assembled tracks into output staves

Filtering runs first (percussion, then empty tracks), then the
[`ImportMode`] decides the staves, then the result is cut down to
`max_tracks`. In smart mode only non-percussion tracks count towards the
two-track median split; percussion tracks kept alongside such a pair get
their own unassigned staves. Pooling merges all notes in Note On order and splits them at
middle C into a right-hand treble staff and a left-hand bass staff.
"#]

use crate::{
    ImportMode, ImportWarning, MidiImportOptions, Pitch, Warnings,
    assemble::{AssembledTrack, NoteInterval},
    score::{Clef, Hand},
};

/// Name given to the pooled upper staff
pub const RIGHT_HAND_NAME: &str = "Right Hand";
/// Name given to the pooled lower staff
pub const LEFT_HAND_NAME: &str = "Left Hand";

/// A staff's notes before quantization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedTrack {
    /// Staff name
    pub name: Option<String>,
    /// Clef
    pub clef: Clef,
    /// Hand
    pub hand: Hand,
    /// Notes in Note On order
    pub notes: Vec<NoteInterval>,
}

/// Median MIDI key of the notes; the lower middle for even counts.
pub fn median_pitch(notes: &[NoteInterval]) -> Option<u8> {
    if notes.is_empty() {
        return None;
    }
    let mut pitches: Vec<u8> = notes.iter().map(|n| n.pitch.value()).collect();
    pitches.sort_unstable();
    Some(pitches[(pitches.len() - 1) / 2])
}

/// Filter, group and limit the tracks of one import.
pub fn group_tracks(
    tracks: Vec<AssembledTrack>,
    options: &MidiImportOptions,
    warnings: &mut Warnings,
) -> Vec<GroupedTrack> {
    let mut tracks = tracks;
    if options.skip_percussion {
        tracks = drop_percussion(tracks, warnings);
    }
    if options.skip_empty_tracks {
        let before = tracks.len();
        tracks.retain(|t| !t.notes.is_empty());
        let skipped = before - tracks.len();
        if skipped > 0 {
            warnings.push(ImportWarning::EmptyTracksSkipped(skipped));
        }
    }

    let mut grouped = match options.mode {
        ImportMode::PreserveOriginal => tracks.into_iter().map(preserve).collect(),
        ImportMode::ForcePiano => pool(tracks),
        ImportMode::Smart => smart(tracks),
    };

    if grouped.len() > options.max_tracks {
        let dropped = grouped.len() - options.max_tracks;
        grouped.truncate(options.max_tracks);
        warnings.push(ImportWarning::TracksTruncated {
            kept: options.max_tracks,
            dropped,
        });
    }

    tracing::debug!(
        mode = ?options.mode,
        staves = grouped.len(),
        "grouped tracks"
    );
    grouped
}

fn is_percussion(track: &AssembledTrack) -> bool {
    track.channel.is_some_and(|c| c.is_percussion())
}

fn drop_percussion(tracks: Vec<AssembledTrack>, warnings: &mut Warnings) -> Vec<AssembledTrack> {
    let mut kept = Vec::with_capacity(tracks.len());
    for mut track in tracks {
        if is_percussion(&track) {
            warnings.push(ImportWarning::PercussionTrackSkipped { track: track.index });
            continue;
        }
        let before = track.notes.len();
        track.notes.retain(|n| !n.channel.is_percussion());
        let count = before - track.notes.len();
        if count > 0 {
            warnings.push(ImportWarning::PercussionNotesSkipped {
                track: track.index,
                count,
            });
        }
        kept.push(track);
    }
    kept
}

fn preserve(track: AssembledTrack) -> GroupedTrack {
    let clef = median_pitch(&track.notes)
        .map(Clef::for_pitch)
        .unwrap_or_default();
    GroupedTrack {
        name: track.name,
        clef,
        hand: Hand::Unassigned,
        notes: track.notes,
    }
}

fn pool(tracks: Vec<AssembledTrack>) -> Vec<GroupedTrack> {
    let mut notes: Vec<NoteInterval> = tracks.into_iter().flat_map(|t| t.notes).collect();
    if notes.is_empty() {
        return Vec::new();
    }
    // stable, so simultaneous notes keep track order
    notes.sort_by_key(|n| n.start_tick);
    let (right, left): (Vec<_>, Vec<_>) = notes
        .into_iter()
        .partition(|n| n.pitch >= Pitch::MIDDLE_C);

    vec![
        GroupedTrack {
            name: Some(RIGHT_HAND_NAME.to_string()),
            clef: Clef::Treble,
            hand: Hand::Right,
            notes: right,
        },
        GroupedTrack {
            name: Some(LEFT_HAND_NAME.to_string()),
            clef: Clef::Bass,
            hand: Hand::Left,
            notes: left,
        },
    ]
}

fn smart(tracks: Vec<AssembledTrack>) -> Vec<GroupedTrack> {
    if tracks.iter().filter(|t| !is_percussion(t)).count() != 2 {
        return pool(tracks);
    }
    let (percussion, pitched): (Vec<_>, Vec<_>) = tracks.into_iter().partition(is_percussion);
    let mut grouped = split_by_median(pitched);
    grouped.extend(percussion.into_iter().map(preserve));
    grouped
}

fn split_by_median(tracks: Vec<AssembledTrack>) -> Vec<GroupedTrack> {
    let mut iter = tracks.into_iter();
    let (Some(first), Some(second)) = (iter.next(), iter.next()) else {
        return Vec::new();
    };
    let middle = Pitch::MIDDLE_C.value();
    let first_median = median_pitch(&first.notes).unwrap_or(middle);
    let second_median = median_pitch(&second.notes).unwrap_or(middle);

    // the first track takes the right hand on a tie
    let (right, left) = if second_median > first_median {
        (second, first)
    } else {
        (first, second)
    };
    vec![
        GroupedTrack {
            name: right.name,
            clef: Clef::Treble,
            hand: Hand::Right,
            notes: right.notes,
        },
        GroupedTrack {
            name: left.name,
            clef: Clef::Bass,
            hand: Hand::Left,
            notes: left.notes,
        },
    ]
}

#[cfg(test)]
use crate::Channel;
#[cfg(test)]
use pretty_assertions::assert_eq;

#[cfg(test)]
fn note(p: u8, start_tick: u64, channel: Channel) -> NoteInterval {
    NoteInterval {
        pitch: Pitch::new(p).unwrap(),
        start_tick,
        duration_ticks: 240,
        velocity: 64,
        channel,
    }
}

#[cfg(test)]
fn track(index: usize, name: &str, pitches: &[u8]) -> AssembledTrack {
    AssembledTrack {
        index,
        name: Some(name.to_string()),
        channel: Some(Channel::One),
        notes: pitches
            .iter()
            .enumerate()
            .map(|(i, p)| note(*p, i as u64 * 240, Channel::One))
            .collect(),
    }
}

#[cfg(test)]
fn pitches(track: &GroupedTrack) -> Vec<u8> {
    track.notes.iter().map(|n| n.pitch.value()).collect()
}

#[test]
fn median_of_even_count_takes_lower_middle() {
    let t = track(0, "a", &[72, 40, 60, 50]);
    assert_eq!(median_pitch(&t.notes), Some(50));
    assert_eq!(median_pitch(&[]), None);
}

#[test]
fn smart_two_tracks_by_median() {
    let bass = track(0, "bass", &[40, 43, 47]);
    let melody = track(1, "melody", &[72, 74, 76]);
    let mut warnings = Warnings::new();
    let grouped = group_tracks(
        vec![bass, melody],
        &MidiImportOptions::default(),
        &mut warnings,
    );
    assert!(warnings.is_empty());
    assert_eq!(grouped.len(), 2);
    assert_eq!(grouped[0].name.as_deref(), Some("melody"));
    assert_eq!((grouped[0].hand, grouped[0].clef), (Hand::Right, Clef::Treble));
    assert_eq!(grouped[1].name.as_deref(), Some("bass"));
    assert_eq!((grouped[1].hand, grouped[1].clef), (Hand::Left, Clef::Bass));
}

#[test]
fn smart_median_tie_keeps_first_track_on_top() {
    let a = track(0, "a", &[60]);
    let b = track(1, "b", &[60]);
    let grouped = group_tracks(vec![a, b], &MidiImportOptions::default(), &mut Warnings::new());
    assert_eq!(grouped[0].name.as_deref(), Some("a"));
    assert_eq!(grouped[0].hand, Hand::Right);
}

#[test]
fn smart_does_not_give_drums_a_hand() {
    let options = MidiImportOptions::default().with_skip_percussion(false);
    let piano = track(0, "piano", &[72]);
    let mut drums = track(1, "drums", &[36]);
    drums.channel = Some(Channel::Ten);

    let grouped = group_tracks(vec![piano.clone(), drums.clone()], &options, &mut Warnings::new());
    assert_eq!(grouped.len(), 2);
    assert_eq!(grouped[0].name.as_deref(), Some(RIGHT_HAND_NAME));
    assert_eq!(grouped[1].name.as_deref(), Some(LEFT_HAND_NAME));

    let bass = track(2, "bass", &[40]);
    let grouped = group_tracks(vec![piano, drums, bass], &options, &mut Warnings::new());
    let staves: Vec<_> = grouped
        .iter()
        .map(|g| (g.name.as_deref(), g.hand))
        .collect();
    assert_eq!(
        staves,
        vec![
            (Some("piano"), Hand::Right),
            (Some("bass"), Hand::Left),
            (Some("drums"), Hand::Unassigned),
        ]
    );
}

#[test]
fn smart_with_other_counts_pools() {
    let tracks = vec![
        track(0, "a", &[48, 64]),
        track(1, "b", &[59, 60]),
        track(2, "c", &[80]),
    ];
    let grouped = group_tracks(tracks, &MidiImportOptions::default(), &mut Warnings::new());
    assert_eq!(grouped.len(), 2);
    assert_eq!(grouped[0].name.as_deref(), Some(RIGHT_HAND_NAME));
    // merged by start tick, track order on ties
    assert_eq!(pitches(&grouped[0]), vec![80, 64, 60]);
    assert_eq!(pitches(&grouped[1]), vec![48, 59]);
}

#[test]
fn force_piano_with_no_notes_is_empty() {
    let options = MidiImportOptions::default()
        .with_mode(ImportMode::ForcePiano)
        .with_skip_empty_tracks(false);
    let grouped = group_tracks(vec![track(0, "a", &[])], &options, &mut Warnings::new());
    assert!(grouped.is_empty());
}

#[test]
fn preserve_picks_clef_per_track() {
    let options = MidiImportOptions::default().with_mode(ImportMode::PreserveOriginal);
    let tracks = vec![track(0, "low", &[36, 40]), track(1, "high", &[70])];
    let grouped = group_tracks(tracks, &options, &mut Warnings::new());
    assert_eq!(grouped[0].clef, Clef::Bass);
    assert_eq!(grouped[1].clef, Clef::Treble);
    assert!(grouped.iter().all(|g| g.hand == Hand::Unassigned));
}

#[test]
fn percussion_is_removed() {
    let options = MidiImportOptions::default().with_mode(ImportMode::PreserveOriginal);
    let mut drums = track(0, "drums", &[36, 38]);
    drums.channel = Some(Channel::Ten);
    let mut mixed = track(1, "mixed", &[60, 62]);
    mixed.notes[1].channel = Channel::Ten;

    let mut warnings = Warnings::new();
    let grouped = group_tracks(vec![drums, mixed], &options, &mut warnings);
    assert_eq!(grouped.len(), 1);
    assert_eq!(pitches(&grouped[0]), vec![60]);
    assert_eq!(
        warnings.into_vec(),
        vec![
            ImportWarning::PercussionTrackSkipped { track: 0 },
            ImportWarning::PercussionNotesSkipped { track: 1, count: 1 },
        ]
    );
}

#[test]
fn empty_tracks_are_skipped_with_a_count() {
    let options = MidiImportOptions::default().with_mode(ImportMode::PreserveOriginal);
    let tracks = vec![track(0, "a", &[]), track(1, "b", &[60]), track(2, "c", &[])];
    let mut warnings = Warnings::new();
    let grouped = group_tracks(tracks, &options, &mut warnings);
    assert_eq!(grouped.len(), 1);
    assert_eq!(warnings.into_vec(), vec![ImportWarning::EmptyTracksSkipped(2)]);
}

#[test]
fn truncates_to_max_tracks() {
    let options = MidiImportOptions::default()
        .with_mode(ImportMode::PreserveOriginal)
        .with_max_tracks(3);
    let tracks = (0..5).map(|i| track(i, "t", &[60])).collect();
    let mut warnings = Warnings::new();
    let grouped = group_tracks(tracks, &options, &mut warnings);
    assert_eq!(grouped.len(), 3);
    assert_eq!(
        warnings.into_vec(),
        vec![ImportWarning::TracksTruncated {
            kept: 3,
            dropped: 2
        }]
    );
}
