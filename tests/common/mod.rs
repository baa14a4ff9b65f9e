#![allow(dead_code)]

/// Encode `value` as a MIDI variable-length quantity
pub fn varlen(value: u32) -> Vec<u8> {
    let mut bytes = vec![(value & 0x7F) as u8];
    let mut rest = value >> 7;
    while rest > 0 {
        bytes.insert(0, (rest & 0x7F) as u8 | 0x80);
        rest >>= 7;
    }
    bytes
}

/// Event bytes of one `MTrk` chunk
#[derive(Default, Clone)]
pub struct TrackBytes {
    bytes: Vec<u8>,
}

impl TrackBytes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Any event, with its delta time
    pub fn raw(mut self, delta: u32, event: &[u8]) -> Self {
        self.bytes.extend(varlen(delta));
        self.bytes.extend_from_slice(event);
        self
    }

    /// `channel` is zero based
    pub fn note_on(self, delta: u32, channel: u8, key: u8, velocity: u8) -> Self {
        self.raw(delta, &[0x90 | channel, key, velocity])
    }

    pub fn note_off(self, delta: u32, channel: u8, key: u8) -> Self {
        self.raw(delta, &[0x80 | channel, key, 0x40])
    }

    pub fn meta(self, delta: u32, meta_type: u8, payload: &[u8]) -> Self {
        let mut event = vec![0xFF, meta_type];
        event.extend(varlen(payload.len() as u32));
        event.extend_from_slice(payload);
        self.raw(delta, &event)
    }

    pub fn name(self, name: &str) -> Self {
        self.meta(0, 0x03, name.as_bytes())
    }

    pub fn tempo(self, delta: u32, micros_per_quarter: u32) -> Self {
        self.meta(delta, 0x51, &micros_per_quarter.to_be_bytes()[1..])
    }

    pub fn time_signature(self, delta: u32, numerator: u8, denominator_exponent: u8) -> Self {
        self.meta(delta, 0x58, &[numerator, denominator_exponent, 24, 8])
    }

    pub fn key_signature(self, delta: u32, sharps_flats: i8, minor: bool) -> Self {
        self.meta(delta, 0x59, &[sharps_flats as u8, minor as u8])
    }

    /// A note of `length` ticks starting `delta` ticks after the previous event
    pub fn note(self, delta: u32, channel: u8, key: u8, length: u32) -> Self {
        self.note_on(delta, channel, key, 80)
            .note_off(length, channel, key)
    }

    /// Append end of track
    pub fn end(self) -> Vec<u8> {
        self.meta(0, 0x2F, &[]).bytes
    }

    /// The bytes so far, without an end of track
    pub fn unterminated(self) -> Vec<u8> {
        self.bytes
    }
}

/// Builds a whole file out of header fields and track payloads
pub struct SmfBuilder {
    format: u16,
    division: [u8; 2],
    declared_tracks: Option<u16>,
    tracks: Vec<Vec<u8>>,
}

impl SmfBuilder {
    pub fn new(ticks_per_quarter_note: u16) -> Self {
        Self {
            format: 1,
            division: ticks_per_quarter_note.to_be_bytes(),
            declared_tracks: None,
            tracks: Vec::new(),
        }
    }

    pub fn format(mut self, format: u16) -> Self {
        self.format = format;
        self
    }

    pub fn division(mut self, division: [u8; 2]) -> Self {
        self.division = division;
        self
    }

    pub fn declared_tracks(mut self, count: u16) -> Self {
        self.declared_tracks = Some(count);
        self
    }

    pub fn track(mut self, payload: Vec<u8>) -> Self {
        self.tracks.push(payload);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"MThd");
        bytes.extend_from_slice(&6u32.to_be_bytes());
        bytes.extend_from_slice(&self.format.to_be_bytes());
        let declared = self
            .declared_tracks
            .unwrap_or(self.tracks.len() as u16);
        bytes.extend_from_slice(&declared.to_be_bytes());
        bytes.extend_from_slice(&self.division);
        for track in &self.tracks {
            bytes.extend_from_slice(b"MTrk");
            bytes.extend_from_slice(&(track.len() as u32).to_be_bytes());
            bytes.extend_from_slice(track);
        }
        bytes
    }
}

#[test]
fn varlen_encoding() {
    assert_eq!(varlen(0), vec![0x00]);
    assert_eq!(varlen(0x7F), vec![0x7F]);
    assert_eq!(varlen(480), vec![0x83, 0x60]);
    assert_eq!(varlen(0x0FFF_FFFF), vec![0xFF, 0xFF, 0xFF, 0x7F]);
}
