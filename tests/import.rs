mod common;

use common::{SmfBuilder, TrackBytes};
use midiscore::prelude::*;
use pretty_assertions::assert_eq;

fn preserve() -> MidiImportOptions {
    MidiImportOptions::default().with_mode(ImportMode::PreserveOriginal)
}

fn import(bytes: &[u8], options: &MidiImportOptions) -> Imported {
    match try_import(bytes, options) {
        Ok(imported) => imported,
        Err(e) => panic!("import failed: {e}"),
    }
}

fn messages(imported: &Imported) -> Vec<String> {
    imported.warnings.iter().map(|w| w.to_string()).collect()
}

#[test]
fn non_midi_input_always_fails() {
    let inputs: [&[u8]; 4] = [
        b"",
        b"MTh",
        b"RIFF\0\0\0\x06\0\x01\0\x01\x01\xE0",
        b"MThd\0\0\0\x07",
    ];
    for bytes in inputs {
        let result = import_smf(bytes, &MidiImportOptions::default());
        assert!(result.score().is_none());
        assert!(matches!(result, ImportResult::Failure { .. }));
    }
}

#[test]
fn quarter_note_from_velocity_zero() {
    let smf = SmfBuilder::new(480)
        .track(
            TrackBytes::new()
                .note_on(0, 0, 60, 80)
                .note_on(480, 0, 60, 0)
                .end(),
        )
        .build();
    let imported = import(&smf, &preserve());
    let score = &imported.score;
    assert_eq!(score.ticks_per_quarter_note, 480);
    assert_eq!(score.tracks.len(), 1);
    assert_eq!(
        score.tracks[0].measures,
        vec![Measure {
            number: 1,
            beats: vec![Beat {
                index: 0,
                notes: vec![Note::new(60, Duration::Quarter, 0)],
            }],
        }]
    );
}

#[test]
fn global_meta_is_detected() {
    let smf = SmfBuilder::new(96)
        .track(
            TrackBytes::new()
                .tempo(0, 500_000)
                .time_signature(0, 3, 2)
                .key_signature(0, -3, true)
                .end(),
        )
        .track(TrackBytes::new().note(0, 0, 72, 96).end())
        .build();
    let imported = import(&smf, &preserve());
    let score = &imported.score;
    assert_eq!(score.bpm(), 120.0);
    assert_eq!(score.tempo.micros_per_quarter_note(), 500_000);
    assert_eq!(score.beats_per_measure, 3);
    assert_eq!(score.beat_unit, 4);
    assert_eq!(score.key.to_string(), "C minor");
    assert_eq!(
        messages(&imported),
        vec![
            "detected tempo: 120 BPM",
            "detected time signature: 3/4",
            "detected key signature: C minor",
            "skipped 1 empty tracks",
        ]
    );
}

#[test]
fn defaults_when_no_meta_events() {
    let smf = SmfBuilder::new(480)
        .track(TrackBytes::new().note(0, 0, 64, 480).end())
        .build();
    let imported = import(&smf, &preserve());
    assert_eq!(imported.score.tempo, Tempo::default());
    assert_eq!(imported.score.key, KeySignature::C_MAJOR);
    assert_eq!(imported.score.beats_per_measure, 4);
    assert!(messages(&imported).contains(&"no tempo found, assuming 120 BPM".to_string()));
}

#[test]
fn running_status_matches_explicit_status() {
    let explicit = TrackBytes::new()
        .raw(0, &[0x90, 60, 80])
        .raw(0, &[0x90, 64, 80])
        .raw(0, &[0x90, 67, 80])
        .raw(480, &[0x90, 60, 0])
        .raw(0, &[0x90, 64, 0])
        .raw(0, &[0x90, 67, 0])
        .end();
    let running = TrackBytes::new()
        .raw(0, &[0x90, 60, 80])
        .raw(0, &[64, 80])
        .raw(0, &[67, 80])
        .raw(480, &[60, 0])
        .raw(0, &[64, 0])
        .raw(0, &[67, 0])
        .end();

    let a = import(&SmfBuilder::new(480).track(explicit).build(), &preserve());
    let b = import(&SmfBuilder::new(480).track(running).build(), &preserve());
    assert_eq!(a, b);
    assert_eq!(a.score.tracks[0].measures[0].beats[0].notes.len(), 3);
}

#[test]
fn parsing_is_deterministic() {
    let smf = SmfBuilder::new(480)
        .track(TrackBytes::new().tempo(0, 600_000).end())
        .track(
            TrackBytes::new()
                .note(0, 0, 72, 480)
                .note(0, 0, 76, 240)
                .note(1000, 0, 79, 100)
                .end(),
        )
        .track(TrackBytes::new().note(0, 1, 40, 1920).note(0, 1, 43, 960).end())
        .build();
    for options in [MidiImportOptions::default(), preserve()] {
        let first = import(&smf, &options);
        let second = import(&smf, &options);
        assert_eq!(first.score, second.score);
    }
}

#[test]
fn track_count_is_limited() {
    let mut builder = SmfBuilder::new(480);
    for key in 0..20 {
        builder = builder.track(TrackBytes::new().note(0, 0, 50 + key, 480).end());
    }
    let result = import_smf(&builder.build(), &preserve().with_max_tracks(16));
    let ImportResult::Success { score, warnings } = result else {
        panic!("expected success");
    };
    assert_eq!(score.tracks.len(), 16);
    assert!(warnings.iter().any(|w| w.contains("truncated")), "{warnings:?}");
}

#[test]
fn percussion_is_skipped() {
    let smf = SmfBuilder::new(480)
        .track(TrackBytes::new().name("Drums").note(0, 9, 36, 240).note(0, 9, 38, 240).end())
        .track(TrackBytes::new().name("Piano").note(0, 0, 60, 480).end())
        .build();

    let imported = import(&smf, &preserve());
    assert_eq!(imported.score.tracks.len(), 1);
    assert_eq!(imported.score.tracks[0].name.as_deref(), Some("Piano"));
    assert!(messages(&imported).contains(&"skipped percussion track 0".to_string()));

    let kept = import(&smf, &preserve().with_skip_percussion(false));
    assert_eq!(kept.score.tracks.len(), 2);
    assert_eq!(kept.score.tracks[0].note_count(), 2);
}

#[test]
fn smart_mode_assigns_hands_by_median() {
    let smf = SmfBuilder::new(480)
        .track(TrackBytes::new().name("Bass").note(0, 0, 43, 480).note(0, 0, 50, 480).end())
        .track(TrackBytes::new().name("Melody").note(0, 1, 72, 480).note(0, 1, 55, 480).end())
        .build();
    let score = import(&smf, &MidiImportOptions::default()).score;
    assert_eq!(score.tracks.len(), 2);
    assert_eq!(score.tracks[0].name.as_deref(), Some("Melody"));
    assert_eq!(score.tracks[0].hand, Hand::Right);
    assert_eq!(score.tracks[0].clef, Clef::Treble);
    assert_eq!(score.tracks[1].name.as_deref(), Some("Bass"));
    assert_eq!(score.tracks[1].hand, Hand::Left);
    assert_eq!(score.tracks[1].clef, Clef::Bass);
}

#[test]
fn smart_mode_keeps_kept_drums_out_of_the_hands() {
    let smf = SmfBuilder::new(480)
        .track(TrackBytes::new().name("Piano").note(0, 0, 72, 480).end())
        .track(TrackBytes::new().name("Drums").note(0, 9, 36, 480).end())
        .build();
    let options = MidiImportOptions::default().with_skip_percussion(false);
    let score = import(&smf, &options).score;

    let staves: Vec<_> = score
        .tracks
        .iter()
        .map(|t| (t.name.as_deref(), t.hand, t.note_count()))
        .collect();
    // one pitched track, so everything is pooled at middle C
    assert_eq!(
        staves,
        vec![
            (Some("Right Hand"), Hand::Right, 1),
            (Some("Left Hand"), Hand::Left, 1),
        ]
    );
}

#[test]
fn force_piano_splits_at_middle_c() {
    let smf = SmfBuilder::new(480)
        .track(TrackBytes::new().note(0, 0, 59, 480).note(0, 0, 60, 480).note(0, 0, 84, 480).end())
        .build();
    let options = MidiImportOptions::default().with_mode(ImportMode::ForcePiano);
    let score = import(&smf, &options).score;
    assert_eq!(score.tracks.len(), 2);
    assert_eq!(score.tracks[0].hand, Hand::Right);
    assert_eq!(score.tracks[0].note_count(), 2);
    assert_eq!(score.tracks[1].hand, Hand::Left);
    assert_eq!(score.tracks[1].note_count(), 1);
}

#[test]
fn measures_are_aligned_across_tracks() {
    let smf = SmfBuilder::new(480)
        .track(TrackBytes::new().note(0, 0, 60, 480).end())
        .track(TrackBytes::new().note(1920 * 3 + 480, 0, 48, 480).end())
        .build();
    let score = import(&smf, &preserve()).score;
    assert_eq!(score.measure_count(), 4);
    for track in &score.tracks {
        let numbers: Vec<u32> = track.measures.iter().map(|m| m.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }
    let last = &score.tracks[1].measures[3];
    assert_eq!(last.beats[0].index, 1);
}

#[test]
fn far_off_note_does_not_blow_up_the_score() {
    let smf = SmfBuilder::new(96)
        .track(TrackBytes::new().note(0, 0, 60, 96).end())
        .track(TrackBytes::new().note(0x0FFF_FFFF, 0, 62, 96).end())
        .build();
    let imported = import(&smf, &preserve());
    let score = &imported.score;
    assert_eq!(score.tracks.len(), 2);
    assert_eq!(score.measure_count(), 1);
    assert_eq!(score.tracks[1].note_count(), 0);
    assert!(
        imported.warnings.contains(&ImportWarning::MeasureLimitExceeded {
            limit: 10_000,
            dropped: 1,
        }),
        "{:?}",
        messages(&imported)
    );
}

#[test]
fn unsupported_headers_fail() {
    let track = TrackBytes::new().note(0, 0, 60, 480).end();

    let format_2 = SmfBuilder::new(480).format(2).track(track.clone()).build();
    assert!(matches!(
        try_import(&format_2, &MidiImportOptions::default()),
        Err(ImportError::UnsupportedFormat(2))
    ));

    let smpte = SmfBuilder::new(480).division([0xE7, 40]).track(track.clone()).build();
    assert!(matches!(
        try_import(&smpte, &MidiImportOptions::default()),
        Err(ImportError::UnsupportedTiming(_))
    ));

    let zero = SmfBuilder::new(0).track(track).build();
    assert!(matches!(
        try_import(&zero, &MidiImportOptions::default()),
        Err(ImportError::ZeroDivision)
    ));

    let no_tracks = SmfBuilder::new(480).build();
    assert!(matches!(
        try_import(&no_tracks, &MidiImportOptions::default()),
        Err(ImportError::NoTracks)
    ));
}

#[test]
fn chunk_longer_than_file_fails() {
    let mut smf = SmfBuilder::new(480)
        .track(TrackBytes::new().note(0, 0, 60, 480).end())
        .build();
    smf.truncate(smf.len() - 2);
    let result = import_smf(&smf, &MidiImportOptions::default());
    assert!(!result.is_success());
}

#[test]
fn truncated_track_keeps_earlier_notes() {
    let payload = TrackBytes::new()
        .note(0, 0, 60, 480)
        .raw(0, &[0x90, 62])
        .unterminated();
    let smf = SmfBuilder::new(480).track(payload).build();
    let imported = import(&smf, &preserve());
    assert_eq!(imported.score.tracks[0].note_count(), 1);
    assert!(
        imported
            .warnings
            .iter()
            .any(|w| matches!(w, ImportWarning::TruncatedTrack { track: 0, kept: 2, .. })),
        "{:?}",
        imported.warnings
    );
}

#[test]
fn anomalies_become_warnings() {
    let smf = SmfBuilder::new(480)
        .declared_tracks(3)
        .track(
            TrackBytes::new()
                .note_off(0, 0, 50)
                .note_on(0, 0, 60, 80)
                .note_on(240, 0, 60, 80)
                .note_off(240, 0, 60)
                .note_on(0, 0, 64, 80)
                .meta(0, 0x60, &[1, 2, 3])
                .raw(480, &[0xFF, 0x2F, 0x00])
                .unterminated(),
        )
        .build();
    let imported = import(&smf, &preserve());
    assert_eq!(
        imported.warnings[..5].to_vec(),
        vec![
            ImportWarning::TrackCountMismatch {
                declared: 3,
                found: 1
            },
            ImportWarning::UnknownMeta {
                track: 0,
                count: 1,
                types: "0x60".to_string()
            },
            ImportWarning::OrphanNoteOff { track: 0, count: 1 },
            ImportWarning::RetriggeredNotes { track: 0, count: 1 },
            ImportWarning::HangingNotes {
                track: 0,
                count: 1,
                end_tick: 960
            },
        ]
    );
    assert_eq!(imported.score.tracks[0].note_count(), 3);
}

#[test]
fn sustain_pedal_and_dotted_values() {
    let smf = SmfBuilder::new(480)
        .track(
            TrackBytes::new()
                .raw(0, &[0xB0, 64, 127])
                .note(0, 0, 60, 240)
                .raw(480, &[0xB0, 64, 0])
                .end(),
        )
        .build();

    let dry = import(&smf, &preserve()).score;
    assert_eq!(
        dry.tracks[0].measures[0].beats[0].notes,
        vec![Note::new(60, Duration::Eighth, 0)]
    );

    let options = preserve().with_sustain_pedal(true).with_dotted_durations(true);
    let held = import(&smf, &options).score;
    assert_eq!(
        held.tracks[0].measures[0].beats[0].notes,
        vec![Note::new(60, Duration::Quarter, 1)]
    );
}
