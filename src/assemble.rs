#![doc = r#"
Pairing Note On and Note Off events into [`NoteInterval`]s

Each `(channel, pitch)` key can hold one open note. A second Note On for an
open key closes the first at the new tick before opening the new one, so no
interval is ever left unbounded. Note Offs with nothing to close are
dropped, and notes still open when the track ends are closed at the
track's last tick. Intervals that come out with zero length are dropped,
and so are notes on MIDI key 0, which the score reserves for rests.

With the sustain pedal applied, a Note Off that arrives while controller 64
is held only marks the note as released; it ends when the pedal lifts or
the same key is struck again.
"#]

use std::collections::BTreeMap;

use crate::{
    Channel, ImportWarning, Pitch, Warnings,
    events::{DecodedTrack, RawEventKind},
    score::Note,
};

/// A sounded note in the tick domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteInterval {
    /// Key
    pub pitch: Pitch,
    /// Absolute tick of the Note On
    pub start_tick: u64,
    /// Ticks until the note was released
    pub duration_ticks: u64,
    /// Note On velocity
    pub velocity: u8,
    /// Channel
    pub channel: Channel,
}

/// A track after note assembly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssembledTrack {
    /// Position among the file's track chunks
    pub index: usize,
    /// Track name, if the file gave one
    pub name: Option<String>,
    /// The track's main channel
    pub channel: Option<Channel>,
    /// Notes ordered by their Note On
    pub notes: Vec<NoteInterval>,
}

#[derive(Debug, Clone, Copy)]
struct OpenNote {
    start: u64,
    velocity: u8,
    seq: u64,
}

type NoteKey = (Channel, Pitch);

#[derive(Debug, Default)]
struct Counters {
    orphans: usize,
    retriggers: usize,
    hanging: usize,
    zero_length: usize,
}

/// Incremental note pairing for one track.
#[derive(Debug)]
pub struct NoteAssembler {
    apply_sustain: bool,
    active: BTreeMap<NoteKey, OpenNote>,
    sustained: BTreeMap<NoteKey, OpenNote>,
    pedal_down: [bool; 16],
    closed: Vec<(u64, NoteInterval)>,
    next_seq: u64,
    counters: Counters,
}

impl NoteAssembler {
    /// A fresh assembler. With `apply_sustain`, releases are held while
    /// the pedal is down.
    pub fn new(apply_sustain: bool) -> Self {
        Self {
            apply_sustain,
            active: BTreeMap::new(),
            sustained: BTreeMap::new(),
            pedal_down: [false; 16],
            closed: Vec::new(),
            next_seq: 0,
            counters: Counters::default(),
        }
    }

    /// Feed one event. Events must arrive in tick order.
    pub fn handle(&mut self, tick: u64, kind: &RawEventKind) {
        match *kind {
            RawEventKind::NoteOn {
                channel,
                pitch,
                velocity,
            } => self.note_on(tick, (channel, pitch), velocity),
            RawEventKind::NoteOff { channel, pitch } => self.note_off(tick, (channel, pitch)),
            RawEventKind::Pedal { channel, value } => self.pedal(tick, channel, value),
            _ => {}
        }
    }

    fn note_on(&mut self, tick: u64, key: NoteKey, velocity: u8) {
        if let Some(open) = self.active.remove(&key) {
            self.counters.retriggers += 1;
            self.close(key, open, tick);
        } else if let Some(open) = self.sustained.remove(&key) {
            self.close(key, open, tick);
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.active.insert(
            key,
            OpenNote {
                start: tick,
                velocity,
                seq,
            },
        );
    }

    fn note_off(&mut self, tick: u64, key: NoteKey) {
        let Some(open) = self.active.remove(&key) else {
            self.counters.orphans += 1;
            return;
        };
        if self.apply_sustain && self.pedal_down[u8::from(key.0) as usize] {
            self.sustained.insert(key, open);
        } else {
            self.close(key, open, tick);
        }
    }

    fn pedal(&mut self, tick: u64, channel: Channel, value: u8) {
        let slot = u8::from(channel) as usize;
        let down = value >= 64;
        let lifted = self.pedal_down[slot] && !down;
        self.pedal_down[slot] = down;
        if !(self.apply_sustain && lifted) {
            return;
        }
        let released: Vec<NoteKey> = self
            .sustained
            .keys()
            .filter(|(ch, _)| *ch == channel)
            .copied()
            .collect();
        for key in released {
            if let Some(open) = self.sustained.remove(&key) {
                self.close(key, open, tick);
            }
        }
    }

    fn close(&mut self, (channel, pitch): NoteKey, open: OpenNote, tick: u64) {
        let duration_ticks = tick.saturating_sub(open.start);
        if duration_ticks == 0 {
            self.counters.zero_length += 1;
            return;
        }
        self.closed.push((
            open.seq,
            NoteInterval {
                pitch,
                start_tick: open.start,
                duration_ticks,
                velocity: open.velocity,
                channel,
            },
        ));
    }

    /// Close everything still open at `end_tick` and return the notes in
    /// Note On order.
    pub fn finish(
        mut self,
        track: usize,
        end_tick: u64,
        warnings: &mut Warnings,
    ) -> Vec<NoteInterval> {
        let hanging = std::mem::take(&mut self.active);
        self.counters.hanging = hanging.len();
        for (key, open) in hanging {
            self.close(key, open, end_tick);
        }
        for (key, open) in std::mem::take(&mut self.sustained) {
            self.close(key, open, end_tick);
        }

        let Counters {
            orphans,
            retriggers,
            hanging,
            zero_length,
        } = self.counters;
        if orphans > 0 {
            warnings.push(ImportWarning::OrphanNoteOff {
                track,
                count: orphans,
            });
        }
        if retriggers > 0 {
            warnings.push(ImportWarning::RetriggeredNotes {
                track,
                count: retriggers,
            });
        }
        if hanging > 0 {
            warnings.push(ImportWarning::HangingNotes {
                track,
                count: hanging,
                end_tick,
            });
        }
        if zero_length > 0 {
            warnings.push(ImportWarning::ZeroLengthNotes {
                track,
                count: zero_length,
            });
        }

        self.closed.sort_by_key(|(seq, _)| *seq);
        self.closed.into_iter().map(|(_, note)| note).collect()
    }
}

/// Assemble every note of a decoded track.
pub fn assemble_track(track: &DecodedTrack, apply_sustain: bool) -> (AssembledTrack, Warnings) {
    let mut warnings = Warnings::new();
    let mut assembler = NoteAssembler::new(apply_sustain);
    for event in &track.events {
        assembler.handle(event.tick, &event.kind);
    }
    let mut notes = assembler.finish(track.index, track.end_tick, &mut warnings);

    // key 0 is the rest marker in the score
    let before = notes.len();
    notes.retain(|n| n.pitch.value() != Note::REST);
    if notes.len() < before {
        warnings.push(ImportWarning::KeyZeroNotes {
            track: track.index,
            count: before - notes.len(),
        });
    }
    tracing::debug!(track = track.index, notes = notes.len(), "assembled notes");

    (
        AssembledTrack {
            index: track.index,
            name: track.name.clone(),
            channel: track.channel,
            notes,
        },
        warnings,
    )
}

#[cfg(test)]
use crate::events::RawEvent;
#[cfg(test)]
use pretty_assertions::assert_eq;

#[cfg(test)]
fn pitch(p: u8) -> Pitch {
    Pitch::new(p).unwrap()
}
#[cfg(test)]
fn on(tick: u64, p: u8, velocity: u8) -> RawEvent {
    RawEvent::new(
        tick,
        RawEventKind::NoteOn {
            channel: Channel::One,
            pitch: pitch(p),
            velocity,
        },
    )
}
#[cfg(test)]
fn off(tick: u64, p: u8) -> RawEvent {
    RawEvent::new(
        tick,
        RawEventKind::NoteOff {
            channel: Channel::One,
            pitch: pitch(p),
        },
    )
}
#[cfg(test)]
fn pedal(tick: u64, value: u8) -> RawEvent {
    RawEvent::new(
        tick,
        RawEventKind::Pedal {
            channel: Channel::One,
            value,
        },
    )
}
#[cfg(test)]
fn track(events: Vec<RawEvent>) -> DecodedTrack {
    let end_tick = events.last().map(|e| e.tick).unwrap_or(0);
    DecodedTrack {
        index: 3,
        events,
        name: None,
        channel: Some(Channel::One),
        end_tick,
    }
}
#[cfg(test)]
fn interval(p: u8, start_tick: u64, duration_ticks: u64, velocity: u8) -> NoteInterval {
    NoteInterval {
        pitch: pitch(p),
        start_tick,
        duration_ticks,
        velocity,
        channel: Channel::One,
    }
}

#[test]
fn pairs_on_and_off() {
    let events = vec![on(0, 60, 80), off(480, 60)];
    let (assembled, warnings) = assemble_track(&track(events), false);
    assert!(warnings.is_empty());
    assert_eq!(assembled.notes, vec![interval(60, 0, 480, 80)]);
    assert_eq!(assembled.index, 3);
}

#[test]
fn notes_keep_note_on_order() {
    let events = vec![
        on(0, 60, 80),
        on(0, 64, 81),
        off(240, 64),
        on(240, 67, 82),
        off(480, 60),
        off(480, 67),
    ];
    let (assembled, _) = assemble_track(&track(events), false);
    assert_eq!(
        assembled.notes,
        vec![
            interval(60, 0, 480, 80),
            interval(64, 0, 240, 81),
            interval(67, 240, 240, 82),
        ]
    );
}

#[test]
fn retrigger_closes_previous_note() {
    let events = vec![on(0, 60, 80), on(120, 60, 90), off(480, 60)];
    let (assembled, warnings) = assemble_track(&track(events), false);
    assert_eq!(
        assembled.notes,
        vec![interval(60, 0, 120, 80), interval(60, 120, 360, 90)]
    );
    assert_eq!(
        warnings.into_vec(),
        vec![ImportWarning::RetriggeredNotes { track: 3, count: 1 }]
    );
}

#[test]
fn orphan_hanging_and_zero_length() {
    let mut t = track(vec![
        off(0, 50),
        on(0, 62, 70),
        off(0, 62),
        on(100, 64, 70),
    ]);
    t.end_tick = 960;
    let (assembled, warnings) = assemble_track(&t, false);
    assert_eq!(assembled.notes, vec![interval(64, 100, 860, 70)]);
    assert_eq!(
        warnings.into_vec(),
        vec![
            ImportWarning::OrphanNoteOff { track: 3, count: 1 },
            ImportWarning::HangingNotes {
                track: 3,
                count: 1,
                end_tick: 960
            },
            ImportWarning::ZeroLengthNotes { track: 3, count: 1 },
        ]
    );
}

#[test]
fn sustain_pedal_extends_releases() {
    let events = vec![
        pedal(0, 127),
        on(0, 60, 80),
        off(100, 60),
        on(200, 64, 80),
        off(300, 64),
        pedal(480, 0),
        on(480, 67, 80),
        off(600, 67),
    ];
    let (held, warnings) = assemble_track(&track(events.clone()), true);
    assert!(warnings.is_empty());
    assert_eq!(
        held.notes,
        vec![
            interval(60, 0, 480, 80),
            interval(64, 200, 280, 80),
            interval(67, 480, 120, 80),
        ]
    );

    let (dry, _) = assemble_track(&track(events), false);
    assert_eq!(dry.notes[0], interval(60, 0, 100, 80));
}

#[test]
fn restrike_under_pedal_closes_sustained_note() {
    let events = vec![
        pedal(0, 127),
        on(0, 60, 80),
        off(100, 60),
        on(240, 60, 90),
        off(300, 60),
        pedal(480, 0),
    ];
    let (assembled, warnings) = assemble_track(&track(events), true);
    assert!(warnings.is_empty());
    assert_eq!(
        assembled.notes,
        vec![interval(60, 0, 240, 80), interval(60, 240, 240, 90)]
    );
}

#[test]
fn key_zero_is_dropped() {
    let events = vec![on(0, 0, 80), off(240, 0), on(240, 60, 80), off(480, 60)];
    let (assembled, warnings) = assemble_track(&track(events), false);
    assert_eq!(assembled.notes, vec![interval(60, 240, 240, 80)]);
    assert_eq!(
        warnings.into_vec(),
        vec![ImportWarning::KeyZeroNotes { track: 3, count: 1 }]
    );
}
