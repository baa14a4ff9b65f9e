#![doc = r#"
Resolving one tempo, meter and key for the whole score

Format 1 files put their global meta events on the first track at tick 0,
but some exporters scatter them. Every tempo, time signature and key
signature event from every track is gathered, each kind is ordered by tick
(ties go to the earlier track, then the earlier event), and the first one
wins. Kinds that never appear fall back to 120 BPM, 4/4 and C major.
"#]

use core::fmt;

use crate::{
    ImportWarning, Warnings,
    events::{DecodedTrack, KeySignature, RawEventKind, Tempo, TimeSignature},
};

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaSource {
    /// Found in a track
    Detected {
        /// Track index
        track: usize,
        /// Absolute tick
        tick: u64,
    },
    /// Nothing was found; the SMF default applies
    Default,
}

/// A score-wide value with a description of how it was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    /// The value
    pub value: T,
    /// Its origin
    pub source: MetaSource,
    /// Number of later, differing values that were ignored
    pub ignored_changes: usize,
    /// Human readable account
    pub diagnostic: String,
}

/// The resolved tempo, meter and key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalMeta {
    /// Tempo
    pub tempo: Resolved<Tempo>,
    /// Time signature
    pub time_signature: Resolved<TimeSignature>,
    /// Key signature
    pub key_signature: Resolved<KeySignature>,
}

impl GlobalMeta {
    /// Record the diagnostics, then a note for every kind with ignored
    /// later changes.
    pub fn report(&self, warnings: &mut Warnings) {
        warnings.push(ImportWarning::Meta(self.tempo.diagnostic.clone()));
        warnings.push(ImportWarning::Meta(self.time_signature.diagnostic.clone()));
        warnings.push(ImportWarning::Meta(self.key_signature.diagnostic.clone()));

        for (kind, count) in [
            ("tempo", self.tempo.ignored_changes),
            ("time signature", self.time_signature.ignored_changes),
            ("key signature", self.key_signature.ignored_changes),
        ] {
            if count > 0 {
                warnings.push(ImportWarning::MetaChangesIgnored {
                    kind: kind.to_string(),
                    count,
                });
            }
        }
    }
}

/// Scan all tracks and pick the first value of each kind.
pub fn resolve(tracks: &[DecodedTrack]) -> GlobalMeta {
    let mut tempos = Vec::new();
    let mut meters = Vec::new();
    let mut keys = Vec::new();

    for track in tracks {
        for event in &track.events {
            let at = (event.tick, track.index);
            match event.kind {
                RawEventKind::Tempo(t) => tempos.push((at, t)),
                RawEventKind::TimeSignature(t) => meters.push((at, t)),
                RawEventKind::KeySignature(k) => keys.push((at, k)),
                _ => {}
            }
        }
    }

    let meta = GlobalMeta {
        tempo: first_of(tempos, Tempo::DEFAULT, "tempo"),
        time_signature: first_of(meters, TimeSignature::COMMON_TIME, "time signature"),
        key_signature: first_of(keys, KeySignature::C_MAJOR, "key signature"),
    };
    tracing::debug!(
        tempo = %meta.tempo.value,
        time_signature = %meta.time_signature.value,
        key = %meta.key_signature.value,
        "resolved global meta"
    );
    meta
}

fn first_of<T>(mut found: Vec<((u64, usize), T)>, default: T, kind: &str) -> Resolved<T>
where
    T: Copy + PartialEq + fmt::Display,
{
    // stable, so events within one track keep their order
    found.sort_by_key(|(at, _)| *at);

    let Some(&((tick, track), value)) = found.first() else {
        return Resolved {
            value: default,
            source: MetaSource::Default,
            ignored_changes: 0,
            diagnostic: format!("no {kind} found, assuming {default}"),
        };
    };

    let mut ignored_changes = 0;
    let mut previous = value;
    for (_, next) in found.iter().skip(1) {
        if *next != previous {
            ignored_changes += 1;
            previous = *next;
        }
    }

    Resolved {
        value,
        source: MetaSource::Detected { track, tick },
        ignored_changes,
        diagnostic: format!("detected {kind}: {value}"),
    }
}

#[cfg(test)]
use crate::events::RawEvent;
#[cfg(test)]
use pretty_assertions::assert_eq;

#[cfg(test)]
fn track(index: usize, events: Vec<RawEvent>) -> DecodedTrack {
    DecodedTrack {
        index,
        events,
        ..Default::default()
    }
}

#[test]
fn defaults_when_nothing_is_present() {
    let meta = resolve(&[track(0, vec![])]);
    assert_eq!(meta.tempo.value, Tempo::DEFAULT);
    assert_eq!(meta.tempo.source, MetaSource::Default);
    assert_eq!(meta.tempo.diagnostic, "no tempo found, assuming 120 BPM");
    assert_eq!(meta.time_signature.value.to_string(), "4/4");
    assert_eq!(meta.key_signature.value, KeySignature::C_MAJOR);
    assert_eq!(
        meta.key_signature.diagnostic,
        "no key signature found, assuming C major"
    );
}

#[test]
fn earliest_event_wins_across_tracks() {
    let slow = Tempo::new(1_000_000).unwrap();
    let fast = Tempo::new(625_000).unwrap();
    let tracks = [
        track(0, vec![RawEvent::new(480, RawEventKind::Tempo(slow))]),
        track(
            1,
            vec![
                RawEvent::new(0, RawEventKind::Tempo(fast)),
                RawEvent::new(
                    0,
                    RawEventKind::TimeSignature(TimeSignature::new(3, 2).unwrap()),
                ),
            ],
        ),
    ];
    let meta = resolve(&tracks);
    assert_eq!(meta.tempo.value, fast);
    assert_eq!(meta.tempo.source, MetaSource::Detected { track: 1, tick: 0 });
    assert_eq!(meta.tempo.diagnostic, "detected tempo: 96 BPM");
    assert_eq!(meta.tempo.ignored_changes, 1);
    assert_eq!(meta.time_signature.value.numerator(), 3);

    let mut warnings = Warnings::new();
    meta.report(&mut warnings);
    let messages: Vec<String> = warnings.iter().map(|w| w.to_string()).collect();
    assert_eq!(
        messages,
        [
            "detected tempo: 96 BPM",
            "detected time signature: 3/4",
            "no key signature found, assuming C major",
            "ignored 1 later tempo changes; the first one applies to the whole score",
        ]
    );
}

#[test]
fn same_tick_tie_goes_to_earlier_track() {
    let a = KeySignature::new(2, false).unwrap();
    let b = KeySignature::new(-2, false).unwrap();
    let tracks = [
        track(0, vec![RawEvent::new(0, RawEventKind::KeySignature(a))]),
        track(1, vec![RawEvent::new(0, RawEventKind::KeySignature(b))]),
    ];
    assert_eq!(resolve(&tracks).key_signature.value, a);
}

#[test]
fn repeated_identical_values_are_not_changes() {
    let t = Tempo::DEFAULT;
    let tracks = [track(
        0,
        vec![
            RawEvent::new(0, RawEventKind::Tempo(t)),
            RawEvent::new(960, RawEventKind::Tempo(t)),
        ],
    )];
    assert_eq!(resolve(&tracks).tempo.ignored_changes, 0);
}
