#![doc = r#"
Decoding the events inside a track chunk

A track is decoded into a flat list of [`RawEvent`]s carrying absolute
ticks. Only the events later stages consume are kept: notes, the sustain
pedal, and the meta events that describe tempo, meter, key and name.
"#]

pub mod meta;
pub use meta::{KeySignature, MetaKind, MetaMessage, Tempo, TimeSignature};

mod decoder;
pub use decoder::*;

use crate::{Channel, Pitch};

/// One event at an absolute tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    /// Ticks since the start of the track
    pub tick: u64,
    /// What happened
    pub kind: RawEventKind,
}

impl RawEvent {
    /// Pair a kind with its tick
    pub const fn new(tick: u64, kind: RawEventKind) -> Self {
        Self { tick, kind }
    }
}

/// The retained event families.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEventKind {
    /// A key went down
    NoteOn {
        /// Channel
        channel: Channel,
        /// Key
        pitch: Pitch,
        /// Always non-zero
        velocity: u8,
    },
    /// A key came up. Note On with velocity zero is normalized to this.
    NoteOff {
        /// Channel
        channel: Channel,
        /// Key
        pitch: Pitch,
    },
    /// Controller 64
    Pedal {
        /// Channel
        channel: Channel,
        /// 0-127, values of 64 and above hold the pedal down
        value: u8,
    },
    /// Set tempo
    Tempo(Tempo),
    /// Time signature
    TimeSignature(TimeSignature),
    /// Key signature
    KeySignature(KeySignature),
    /// Sequence/track name
    TrackName(String),
}

impl RawEventKind {
    /// The channel of a channel event
    pub const fn channel(&self) -> Option<Channel> {
        match self {
            Self::NoteOn { channel, .. }
            | Self::NoteOff { channel, .. }
            | Self::Pedal { channel, .. } => Some(*channel),
            _ => None,
        }
    }
}

/// The decoded contents of one track chunk.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedTrack {
    /// Position among the file's track chunks
    pub index: usize,
    /// Events in tick order
    pub events: Vec<RawEvent>,
    /// The first track name event, if any
    pub name: Option<String>,
    /// The channel most note events use
    pub channel: Option<Channel>,
    /// Tick of the last decoded event, end of track included
    pub end_tick: u64,
}

impl DecodedTrack {
    /// Number of Note On events
    pub fn note_on_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, RawEventKind::NoteOn { .. }))
            .count()
    }
}
