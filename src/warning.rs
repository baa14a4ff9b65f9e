#![doc = r#"
Non-fatal import diagnostics

Every anomaly that does not abort an import becomes an [`ImportWarning`].
They are collected in the order the pipeline meets them and handed back
alongside the score. Pushing a warning also emits it through `tracing`.
"#]

use thiserror::Error;

/// A recoverable anomaly, or an informational note about a value the
/// importer detected or assumed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ImportWarning {
    /// A chunk other than `MThd`/`MTrk`
    #[error("skipped unknown chunk {magic:?} ({len} bytes)")]
    UnknownChunk {
        /// Chunk type
        magic: String,
        /// Payload length
        len: u32,
    },
    /// Bytes after the last chunk that are too few to form another one
    #[error("ignored {0} trailing bytes after the last chunk")]
    TrailingBytes(usize),
    /// Header track count disagrees with the chunks present
    #[error("header declares {declared} tracks but {found} track chunks were found")]
    TrackCountMismatch {
        /// From the header
        declared: u16,
        /// Actually framed
        found: usize,
    },
    /// Decoding of a track stopped early
    #[error("track {track}: decoding stopped at byte {offset} ({reason}); kept {kept} events")]
    TruncatedTrack {
        /// Track index
        track: usize,
        /// Offset within the track payload
        offset: usize,
        /// What went wrong
        reason: String,
        /// Events decoded before the problem
        kept: usize,
    },
    /// Meta events whose type is not part of the SMF standard
    #[error("track {track}: skipped {count} unrecognized meta events (types {types})")]
    UnknownMeta {
        /// Track index
        track: usize,
        /// How many were skipped
        count: usize,
        /// The distinct type bytes, hex formatted
        types: String,
    },
    /// A recognized meta event with an unusable payload
    #[error("track {track}: ignored invalid {kind} event at tick {tick}")]
    InvalidMeta {
        /// Track index
        track: usize,
        /// Absolute tick
        tick: u64,
        /// Which meta event
        kind: String,
    },
    /// Note Offs with no matching Note On
    #[error("track {track}: dropped {count} note-off events with no active note")]
    OrphanNoteOff {
        /// Track index
        track: usize,
        /// How many
        count: usize,
    },
    /// Note Ons for a key that was already sounding
    #[error("track {track}: closed {count} overlapping notes retriggered on the same key")]
    RetriggeredNotes {
        /// Track index
        track: usize,
        /// How many
        count: usize,
    },
    /// Notes still sounding when the track ended
    #[error("track {track}: closed {count} hanging notes at end of track (tick {end_tick})")]
    HangingNotes {
        /// Track index
        track: usize,
        /// How many
        count: usize,
        /// Where they were closed
        end_tick: u64,
    },
    /// Notes whose on and off fall on the same tick
    #[error("track {track}: dropped {count} zero-length notes")]
    ZeroLengthNotes {
        /// Track index
        track: usize,
        /// How many
        count: usize,
    },
    /// MIDI key 0 collides with the rest marker
    #[error("track {track}: dropped {count} notes on MIDI key 0")]
    KeyZeroNotes {
        /// Track index
        track: usize,
        /// How many
        count: usize,
    },
    /// Description of a resolved tempo, meter or key
    #[error("{0}")]
    Meta(String),
    /// Later meta values that were not applied
    #[error("ignored {count} later {kind} changes; the first one applies to the whole score")]
    MetaChangesIgnored {
        /// Tempo, time signature or key signature
        kind: String,
        /// How many were ignored
        count: usize,
    },
    /// Percussion track removed
    #[error("skipped percussion track {track}")]
    PercussionTrackSkipped {
        /// Track index
        track: usize,
    },
    /// Percussion notes removed from a mixed-channel track
    #[error("track {track}: removed {count} percussion notes")]
    PercussionNotesSkipped {
        /// Track index
        track: usize,
        /// How many
        count: usize,
    },
    /// Tracks removed because they had no notes
    #[error("skipped {0} empty tracks")]
    EmptyTracksSkipped(usize),
    /// Notes starting past the last measure a score may hold
    #[error("dropped {dropped} notes starting after measure {limit}")]
    MeasureLimitExceeded {
        /// Highest measure number kept
        limit: u32,
        /// Notes dropped across all tracks
        dropped: usize,
    },
    /// Result trimmed by `max_tracks`
    #[error("truncated to {kept} tracks; dropped {dropped}")]
    TracksTruncated {
        /// Tracks kept
        kept: usize,
        /// Tracks dropped
        dropped: usize,
    },
}

/// An ordered collection of [`ImportWarning`]s.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Warnings {
    inner: Vec<ImportWarning>,
}

impl Warnings {
    /// An empty list
    pub const fn new() -> Self {
        Self { inner: Vec::new() }
    }

    /// Record a warning and log it.
    pub fn push(&mut self, warning: ImportWarning) {
        match &warning {
            ImportWarning::Meta(_) => tracing::info!("{warning}"),
            _ => tracing::warn!("{warning}"),
        }
        self.inner.push(warning);
    }

    /// Append warnings that were already logged elsewhere.
    pub fn append(&mut self, other: Warnings) {
        self.inner.extend(other.inner);
    }

    /// Number of warnings
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate in recorded order
    pub fn iter(&self) -> impl Iterator<Item = &ImportWarning> {
        self.inner.iter()
    }

    /// Take the recorded warnings
    pub fn into_vec(self) -> Vec<ImportWarning> {
        self.inner
    }
}

impl From<Warnings> for Vec<ImportWarning> {
    fn from(value: Warnings) -> Self {
        value.inner
    }
}

#[test]
fn warnings_keep_insertion_order() {
    let mut first = Warnings::new();
    first.push(ImportWarning::TrailingBytes(3));
    let mut second = Warnings::new();
    second.push(ImportWarning::EmptyTracksSkipped(2));
    first.append(second);

    let messages: Vec<String> = first.iter().map(|w| w.to_string()).collect();
    assert_eq!(
        messages,
        [
            "ignored 3 trailing bytes after the last chunk",
            "skipped 2 empty tracks"
        ]
    );
}
