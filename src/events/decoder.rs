use std::collections::BTreeSet;

use crate::{
    Channel, EventError, ImportWarning, Pitch, Warnings,
    events::{DecodedTrack, MetaKind, MetaMessage, RawEvent, RawEventKind},
    file::chunk::TrackChunk,
    message::{
        META_STATUS, SUSTAIN_PEDAL_CONTROLLER, SYSEX_ESCAPE_STATUS, SYSEX_STATUS, VoiceStatus,
        system_data_len,
    },
    reader::{ReadResult, Reader, ReaderError},
};

#[doc = r#"
Everything the decoder carries from one event to the next.

The state is a plain value: [`next_event`] takes one and returns the next,
so several tracks can be decoded at once without sharing anything.
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecoderState {
    /// Offset of the next unread byte in the track payload
    pub cursor: usize,
    /// Absolute tick of the last decoded event
    pub tick: u64,
    /// The last channel status byte read explicitly
    pub running_status: Option<u8>,
}

/// The outcome of decoding one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// An event later stages use
    Event(RawEvent),
    /// A meta event of interest with an unusable payload
    InvalidMeta(MetaKind),
    /// A meta event type outside the SMF standard
    UnknownMeta(u8),
    /// Anything the score does not need
    Skipped,
    /// `FF 2F 00`
    EndOfTrack,
}

/// Decode the event starting at `state.cursor`.
///
/// On error the caller still holds the previous state, which points at
/// the start of the event that could not be read.
pub fn next_event(bytes: &[u8], state: DecoderState) -> ReadResult<(Step, DecoderState)> {
    let mut reader = Reader::at(bytes, state.cursor);
    let delta = reader.read_varlen()?;
    let tick = state.tick + delta as u64;

    let first = reader
        .peek_byte()
        .ok_or(ReaderError::oob(reader.buffer_position()))?;
    let status = if first & 0x80 != 0 {
        reader.read_byte()?
    } else {
        state.running_status.ok_or(ReaderError::parse_error(
            reader.buffer_position(),
            EventError::MissingRunningStatus(first),
        ))?
    };

    let mut running_status = state.running_status;
    let step = match status {
        META_STATUS => {
            let meta_type = reader.read_byte()?;
            let payload = reader.read_varlen_slice()?;
            match MetaMessage::parse(meta_type, payload) {
                MetaMessage::TrackName(name) => {
                    Step::Event(RawEvent::new(tick, RawEventKind::TrackName(name)))
                }
                MetaMessage::Tempo(t) => Step::Event(RawEvent::new(tick, RawEventKind::Tempo(t))),
                MetaMessage::TimeSignature(t) => {
                    Step::Event(RawEvent::new(tick, RawEventKind::TimeSignature(t)))
                }
                MetaMessage::KeySignature(k) => {
                    Step::Event(RawEvent::new(tick, RawEventKind::KeySignature(k)))
                }
                MetaMessage::EndOfTrack => Step::EndOfTrack,
                MetaMessage::Ignored(_) => Step::Skipped,
                MetaMessage::Unknown(t) => Step::UnknownMeta(t),
                MetaMessage::Invalid(kind) => Step::InvalidMeta(kind),
            }
        }
        SYSEX_STATUS | SYSEX_ESCAPE_STATUS => {
            reader.read_varlen_slice()?;
            Step::Skipped
        }
        0xF1..=0xFE => {
            reader.read_slice(system_data_len(status))?;
            Step::Skipped
        }
        _ => {
            // 0x80..=0xEF, always a voice status
            let Some(voice) = VoiceStatus::from_status(status) else {
                return Err(ReaderError::parse_error(
                    reader.buffer_position(),
                    EventError::InvalidDataByte(status),
                ));
            };
            running_status = Some(status);
            let data_start = reader.buffer_position();
            let data = reader.read_slice(voice.data_len())?;
            if let Some(bad) = data.iter().find(|b| **b & 0x80 != 0) {
                return Err(ReaderError::parse_error(
                    data_start,
                    EventError::InvalidDataByte(*bad),
                ));
            }
            voice_step(tick, voice, Channel::from_status(status), data)
        }
    };

    Ok((
        step,
        DecoderState {
            cursor: reader.buffer_position(),
            tick,
            running_status,
        },
    ))
}

fn voice_step(tick: u64, voice: VoiceStatus, channel: Channel, data: &[u8]) -> Step {
    let kind = match (voice, data) {
        (VoiceStatus::NoteOn, [key, 0]) | (VoiceStatus::NoteOff, [key, _]) => {
            Pitch::new(*key).map(|pitch| RawEventKind::NoteOff { channel, pitch })
        }
        (VoiceStatus::NoteOn, [key, velocity]) => {
            Pitch::new(*key).map(|pitch| RawEventKind::NoteOn {
                channel,
                pitch,
                velocity: *velocity,
            })
        }
        (VoiceStatus::ControlChange, [SUSTAIN_PEDAL_CONTROLLER, value]) => {
            Ok(RawEventKind::Pedal {
                channel,
                value: *value,
            })
        }
        _ => return Step::Skipped,
    };
    match kind {
        Ok(kind) => Step::Event(RawEvent::new(tick, kind)),
        Err(_) => Step::Skipped,
    }
}

#[doc = r#"
Decode every event of a track chunk.

Decoding stops at the end-of-track event, at the end of the payload, or at
the first event that cannot be read; in the last case a warning records
where, and the events decoded so far are kept.
"#]
pub fn decode_track(chunk: &TrackChunk<'_>) -> (DecodedTrack, Warnings) {
    let bytes = chunk.data();
    let track = chunk.index();
    let mut warnings = Warnings::new();
    let mut events = Vec::new();
    let mut unknown_meta = BTreeSet::new();
    let mut unknown_count = 0;
    let mut state = DecoderState::default();

    while state.cursor < bytes.len() {
        let (step, next) = match next_event(bytes, state) {
            Ok(decoded) => decoded,
            Err(e) => {
                warnings.push(ImportWarning::TruncatedTrack {
                    track,
                    offset: e.position(),
                    reason: e.error_kind().to_string(),
                    kept: events.len(),
                });
                break;
            }
        };
        state = next;
        match step {
            Step::Event(event) => events.push(event),
            Step::InvalidMeta(kind) => warnings.push(ImportWarning::InvalidMeta {
                track,
                tick: state.tick,
                kind: kind.name().to_string(),
            }),
            Step::UnknownMeta(meta_type) => {
                unknown_count += 1;
                unknown_meta.insert(meta_type);
            }
            Step::Skipped => {}
            Step::EndOfTrack => break,
        }
    }

    if unknown_count > 0 {
        warnings.push(ImportWarning::UnknownMeta {
            track,
            count: unknown_count,
            types: unknown_meta
                .iter()
                .map(|t| format!("{t:#04X}"))
                .collect::<Vec<_>>()
                .join(", "),
        });
    }

    let name = events.iter().find_map(|e| match &e.kind {
        RawEventKind::TrackName(name) if !name.is_empty() => Some(name.clone()),
        _ => None,
    });
    let channel = dominant_channel(&events);
    let decoded = DecodedTrack {
        index: track,
        events,
        name,
        channel,
        end_tick: state.tick,
    };
    tracing::debug!(
        track,
        events = decoded.events.len(),
        notes = decoded.note_on_count(),
        end_tick = decoded.end_tick,
        ?channel,
        "decoded track"
    );

    (decoded, warnings)
}

/// The channel with the most Note Ons, lowest channel on a tie. Falls back
/// to the first channel event when the track has no notes.
fn dominant_channel(events: &[RawEvent]) -> Option<Channel> {
    let mut counts = [0usize; 16];
    for event in events {
        if let RawEventKind::NoteOn { channel, .. } = event.kind {
            counts[u8::from(channel) as usize] += 1;
        }
    }
    let (best, count) = counts
        .iter()
        .enumerate()
        .fold((0, 0), |acc, (i, c)| if *c > acc.1 { (i, *c) } else { acc });
    if count > 0 {
        return Some(Channel::from_status(best as u8));
    }
    events.iter().find_map(|e| e.kind.channel())
}

#[cfg(test)]
fn chunk(data: &[u8]) -> TrackChunk<'_> {
    TrackChunk {
        index: 0,
        offset: 0,
        data,
    }
}

#[test]
fn note_on_velocity_zero_is_note_off() {
    let bytes = [0x00, 0x91, 60, 80, 0x83, 0x60, 0x91, 60, 0, 0x00, 0xFF, 0x2F, 0x00];
    let (track, warnings) = decode_track(&chunk(&bytes));
    assert!(warnings.is_empty());
    let pitch = Pitch::new(60).unwrap();
    assert_eq!(
        track.events,
        vec![
            RawEvent::new(
                0,
                RawEventKind::NoteOn {
                    channel: Channel::Two,
                    pitch,
                    velocity: 80
                }
            ),
            RawEvent::new(
                480,
                RawEventKind::NoteOff {
                    channel: Channel::Two,
                    pitch
                }
            ),
        ]
    );
    assert_eq!(track.end_tick, 480);
    assert_eq!(track.channel, Some(Channel::Two));
}

#[test]
fn running_status_matches_explicit_status() {
    let explicit = [
        0x00, 0x90, 60, 80, //
        0x10, 0x90, 64, 80, //
        0x10, 0x90, 67, 80, //
        0x60, 0x80, 60, 0, //
        0x00, 0xFF, 0x2F, 0x00,
    ];
    let running = [
        0x00, 0x90, 60, 80, //
        0x10, 64, 80, //
        0x10, 67, 80, //
        0x60, 0x80, 60, 0, //
        0x00, 0xFF, 0x2F, 0x00,
    ];
    let (a, _) = decode_track(&chunk(&explicit));
    let (b, _) = decode_track(&chunk(&running));
    assert_eq!(a.events.len(), 4);
    assert_eq!(a, b);
}

#[test]
fn meta_events_do_not_reset_running_status() {
    let bytes = [
        0x00, 0x90, 60, 80, //
        0x00, 0xFF, 0x01, 0x02, b'h', b'i', //
        0x60, 60, 0, //
    ];
    let (track, warnings) = decode_track(&chunk(&bytes));
    assert!(warnings.is_empty());
    assert_eq!(track.events.len(), 2);
    assert!(matches!(track.events[1].kind, RawEventKind::NoteOff { .. }));
}

#[test]
fn skips_other_channel_messages_by_length() {
    let bytes = [
        0x00, 0xC0, 5, // program change: 1 data byte
        0x00, 0xD0, 40, // channel pressure: 1 data byte
        0x00, 0xE0, 0, 64, // pitch bend: 2 data bytes
        0x00, 0xB0, 7, 100, // volume: ignored controller
        0x00, 0xB0, 64, 127, // sustain pedal
        0x00, 0xF0, 0x03, 0x43, 0x12, 0xF7, // sysex skipped by length
        0x00, 0x90, 62, 90,
    ];
    let (track, warnings) = decode_track(&chunk(&bytes));
    assert!(warnings.is_empty());
    assert_eq!(
        track.events.iter().map(|e| &e.kind).collect::<Vec<_>>(),
        vec![
            &RawEventKind::Pedal {
                channel: Channel::One,
                value: 127
            },
            &RawEventKind::NoteOn {
                channel: Channel::One,
                pitch: Pitch::new(62).unwrap(),
                velocity: 90
            },
        ]
    );
}

#[test]
fn truncated_event_keeps_earlier_events() {
    let bytes = [0x00, 0x90, 60, 80, 0x60, 0x80, 60];
    let (track, warnings) = decode_track(&chunk(&bytes));
    assert_eq!(track.events.len(), 1);
    assert_eq!(track.end_tick, 0);
    assert!(matches!(
        warnings.into_vec().as_slice(),
        [ImportWarning::TruncatedTrack {
            offset: 6,
            kept: 1,
            ..
        }]
    ));
}

#[test]
fn data_byte_without_status_stops_decoding() {
    let bytes = [0x00, 60, 80];
    let (track, warnings) = decode_track(&chunk(&bytes));
    assert!(track.events.is_empty());
    assert_eq!(warnings.len(), 1);
}

#[test]
fn unknown_meta_is_skipped_and_reported_once() {
    let bytes = [
        0x00, 0xFF, 0x60, 0x01, 0xAA, //
        0x00, 0xFF, 0x61, 0x00, //
        0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, //
        0x00, 0xFF, 0x58, 0x01, 0x04, // invalid time signature payload
    ];
    let (track, warnings) = decode_track(&chunk(&bytes));
    assert_eq!(
        track.events,
        vec![RawEvent::new(0, RawEventKind::Tempo(crate::Tempo::DEFAULT))]
    );
    let messages: Vec<String> = warnings.iter().map(|w| w.to_string()).collect();
    assert_eq!(
        messages,
        [
            "track 0: ignored invalid time signature event at tick 0",
            "track 0: skipped 2 unrecognized meta events (types 0x60, 0x61)",
        ]
    );
}

#[test]
fn track_name_and_dominant_channel() {
    let bytes = [
        0x00, 0xFF, 0x03, 0x04, b'L', b'e', b'f', b't', //
        0x00, 0x92, 48, 70, //
        0x00, 0x93, 50, 70, //
        0x00, 0x93, 52, 70, //
    ];
    let (track, _) = decode_track(&chunk(&bytes));
    assert_eq!(track.name.as_deref(), Some("Left"));
    assert_eq!(track.channel, Some(Channel::Four));
    assert_eq!(track.note_on_count(), 3);
}
