#![doc = r#"
Meta events (`FF type len data`)

Only the events that shape a score are decoded; the rest of the standard
set is recognized and skipped so it is not reported as unknown.
"#]

mod tempo;
pub use tempo::*;

mod time_signature;
pub use time_signature::*;

mod key_signature;
pub use key_signature::*;

/// Sequence number
pub const SEQUENCE_NUMBER: u8 = 0x00;
/// First of the text-like events (text, copyright, name, instrument, ...)
pub const TEXT_FIRST: u8 = 0x01;
/// Sequence/track name
pub const TRACK_NAME: u8 = 0x03;
/// Last of the text-like events
pub const TEXT_LAST: u8 = 0x0F;
/// MIDI channel prefix
pub const CHANNEL_PREFIX: u8 = 0x20;
/// MIDI port
pub const PORT: u8 = 0x21;
/// End of track
pub const END_OF_TRACK: u8 = 0x2F;
/// Set tempo
pub const SET_TEMPO: u8 = 0x51;
/// SMPTE offset
pub const SMPTE_OFFSET: u8 = 0x54;
/// Time signature
pub const TIME_SIGNATURE: u8 = 0x58;
/// Key signature
pub const KEY_SIGNATURE: u8 = 0x59;
/// Sequencer specific
pub const SEQUENCER_SPECIFIC: u8 = 0x7F;

/// A decoded meta event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaMessage {
    /// `0x03`
    TrackName(String),
    /// `0x51`
    Tempo(Tempo),
    /// `0x58`
    TimeSignature(TimeSignature),
    /// `0x59`
    KeySignature(KeySignature),
    /// `0x2F`
    EndOfTrack,
    /// A standard meta event with no bearing on the score
    Ignored(u8),
    /// A type byte outside the SMF standard
    Unknown(u8),
    /// A recognized type whose payload could not be used
    Invalid(MetaKind),
}

/// The meta events that carry score-wide values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaKind {
    /// Set tempo
    Tempo,
    /// Time signature
    TimeSignature,
    /// Key signature
    KeySignature,
}

impl MetaKind {
    /// Human readable name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Tempo => "tempo",
            Self::TimeSignature => "time signature",
            Self::KeySignature => "key signature",
        }
    }
}

impl MetaMessage {
    /// Interpret a meta event from its type byte and payload.
    pub fn parse(meta_type: u8, payload: &[u8]) -> Self {
        match meta_type {
            TRACK_NAME => Self::TrackName(decode_text(payload)),
            SET_TEMPO => Tempo::from_bytes(payload)
                .map(Self::Tempo)
                .unwrap_or(Self::Invalid(MetaKind::Tempo)),
            TIME_SIGNATURE => TimeSignature::from_bytes(payload)
                .map(Self::TimeSignature)
                .unwrap_or(Self::Invalid(MetaKind::TimeSignature)),
            KEY_SIGNATURE => KeySignature::from_bytes(payload)
                .map(Self::KeySignature)
                .unwrap_or(Self::Invalid(MetaKind::KeySignature)),
            END_OF_TRACK => Self::EndOfTrack,
            SEQUENCE_NUMBER
            | TEXT_FIRST..=TEXT_LAST
            | CHANNEL_PREFIX
            | PORT
            | SMPTE_OFFSET
            | SEQUENCER_SPECIFIC => Self::Ignored(meta_type),
            other => Self::Unknown(other),
        }
    }
}

/// Text events are nominally ASCII; anything that is not valid UTF-8 is
/// replaced rather than rejected.
fn decode_text(payload: &[u8]) -> String {
    String::from_utf8_lossy(payload)
        .trim_end_matches(['\0', ' ', '\r', '\n'])
        .to_string()
}

#[test]
fn dispatches_meta_types() {
    assert_eq!(
        MetaMessage::parse(TRACK_NAME, b"Piano\0"),
        MetaMessage::TrackName("Piano".to_string())
    );
    assert_eq!(
        MetaMessage::parse(SET_TEMPO, &[0x07, 0xA1, 0x20]),
        MetaMessage::Tempo(Tempo::DEFAULT)
    );
    assert_eq!(
        MetaMessage::parse(SET_TEMPO, &[0x07]),
        MetaMessage::Invalid(MetaKind::Tempo)
    );
    assert_eq!(MetaMessage::parse(0x01, b"hello"), MetaMessage::Ignored(0x01));
    assert_eq!(MetaMessage::parse(END_OF_TRACK, &[]), MetaMessage::EndOfTrack);
    assert_eq!(MetaMessage::parse(0x60, &[1, 2]), MetaMessage::Unknown(0x60));
}
