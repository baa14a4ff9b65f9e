#![doc = r#"
The import entry points

[`try_import`] runs the whole pipeline and returns typed errors;
[`import_smf`] wraps it into the two-armed [`ImportResult`] that callers
outside Rust usually want.

```rust
# use midiscore::prelude::*;
let result = import_smf(b"not a midi file", &MidiImportOptions::default());
assert!(matches!(result, ImportResult::Failure { .. }));
```
"#]

use crate::{
    ImportError, ImportWarning, MidiImportOptions, Warnings,
    assemble::{AssembledTrack, assemble_track},
    events::{DecodedTrack, decode_track},
    file::{SmfFile, chunk::TrackChunk},
    group::group_tracks,
    resolve,
    score::{Score, ScoreBuilder},
};

/// A finished import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Imported {
    /// The score
    pub score: Score,
    /// Everything that was recovered from or ignored along the way
    pub warnings: Vec<ImportWarning>,
}

/// Outcome of [`import_smf`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "status", rename_all = "camelCase"))]
pub enum ImportResult {
    /// The file was imported
    Success {
        /// The score
        score: Score,
        /// Non-fatal diagnostics, in pipeline order
        warnings: Vec<String>,
    },
    /// The file could not be imported
    Failure {
        /// Why
        message: String,
    },
}

impl ImportResult {
    /// True for [`ImportResult::Success`]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The score, if the import succeeded
    pub fn score(&self) -> Option<&Score> {
        match self {
            Self::Success { score, .. } => Some(score),
            Self::Failure { .. } => None,
        }
    }
}

impl From<Result<Imported, ImportError>> for ImportResult {
    fn from(value: Result<Imported, ImportError>) -> Self {
        match value {
            Ok(Imported { score, warnings }) => Self::Success {
                score,
                warnings: warnings.iter().map(ToString::to_string).collect(),
            },
            Err(e) => Self::Failure {
                message: e.to_string(),
            },
        }
    }
}

/// Import a Standard MIDI File held in memory.
pub fn import_smf(bytes: &[u8], options: &MidiImportOptions) -> ImportResult {
    try_import(bytes, options).into()
}

/// Import a Standard MIDI File, failing with the first structural error.
pub fn try_import(bytes: &[u8], options: &MidiImportOptions) -> Result<Imported, ImportError> {
    let span = tracing::debug_span!("import", len = bytes.len(), mode = ?options.mode);
    let _guard = span.enter();

    let mut warnings = Warnings::new();
    let file = SmfFile::parse(bytes, &mut warnings)?;

    let timing = file.timing();
    let ticks_per_quarter_note = timing
        .ticks_per_quarter_note()
        .ok_or(ImportError::UnsupportedTiming(timing))?;
    if ticks_per_quarter_note == 0 {
        return Err(ImportError::ZeroDivision);
    }

    let (decoded, assembled) =
        decode_all(file.tracks(), options.apply_sustain_pedal, &mut warnings);

    let meta = resolve::resolve(&decoded);
    meta.report(&mut warnings);

    let grouped = group_tracks(assembled, options, &mut warnings);
    let score = ScoreBuilder::new(&meta, ticks_per_quarter_note)
        .with_dotted_durations(options.dotted_durations)
        .build(grouped, &mut warnings);

    tracing::debug!(
        tracks = score.tracks.len(),
        warnings = warnings.len(),
        "import finished"
    );
    Ok(Imported {
        score,
        warnings: warnings.into_vec(),
    })
}

type TrackOutput = (DecodedTrack, AssembledTrack, Warnings);

fn process_track(chunk: &TrackChunk<'_>, apply_sustain: bool) -> TrackOutput {
    let (decoded, mut warnings) = decode_track(chunk);
    let (assembled, assembly_warnings) = assemble_track(&decoded, apply_sustain);
    warnings.append(assembly_warnings);
    (decoded, assembled, warnings)
}

fn decode_all(
    chunks: &[TrackChunk<'_>],
    apply_sustain: bool,
    warnings: &mut Warnings,
) -> (Vec<DecodedTrack>, Vec<AssembledTrack>) {
    #[cfg(feature = "parallel")]
    let outputs: Vec<TrackOutput> = {
        use rayon::prelude::*;
        chunks
            .par_iter()
            .map(|chunk| process_track(chunk, apply_sustain))
            .collect()
    };
    #[cfg(not(feature = "parallel"))]
    let outputs: Vec<TrackOutput> = chunks
        .iter()
        .map(|chunk| process_track(chunk, apply_sustain))
        .collect();

    let mut decoded = Vec::with_capacity(outputs.len());
    let mut assembled = Vec::with_capacity(outputs.len());
    // collected in track order, so warnings stay in track order
    for (d, a, w) in outputs {
        decoded.push(d);
        assembled.push(a);
        warnings.append(w);
    }
    (decoded, assembled)
}

#[test]
fn failure_carries_the_error_message() {
    let result = import_smf(b"RIFF\0\0\0\x06", &MidiImportOptions::default());
    match result {
        ImportResult::Failure { message } => assert!(message.contains("MThd"), "{message}"),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(!import_smf(&[], &MidiImportOptions::default()).is_success());
}

#[cfg(test)]
fn smf(tracks: &[&[u8]]) -> Vec<u8> {
    let mut bytes = b"MThd\0\0\0\x06\0\x01".to_vec();
    bytes.extend_from_slice(&(tracks.len() as u16).to_be_bytes());
    bytes.extend_from_slice(&480u16.to_be_bytes());
    for track in tracks {
        bytes.extend_from_slice(b"MTrk");
        bytes.extend_from_slice(&(track.len() as u32).to_be_bytes());
        bytes.extend_from_slice(track);
    }
    bytes
}

#[test]
fn decode_all_keeps_track_order() {
    let paired: &[u8] = &[
        0x00, 0x90, 0x3C, 0x40, 0x83, 0x60, 0x80, 0x3C, 0x00, 0x00, 0xFF, 0x2F, 0x00,
    ];
    let orphan: &[u8] = &[0x00, 0x80, 0x40, 0x00, 0x00, 0xFF, 0x2F, 0x00];
    let hanging: &[u8] = &[0x00, 0x90, 0x30, 0x40, 0x60, 0xFF, 0x2F, 0x00];
    let tracks: Vec<&[u8]> = [paired, orphan, hanging].into_iter().cycle().take(9).collect();
    let bytes = smf(&tracks);
    let file = SmfFile::parse(&bytes, &mut Warnings::new()).unwrap();

    let mut warnings = Warnings::new();
    let (decoded, assembled) = decode_all(file.tracks(), false, &mut warnings);

    let mut expected = Warnings::new();
    for (i, chunk) in file.tracks().iter().enumerate() {
        let (d, a, w) = process_track(chunk, false);
        assert_eq!(decoded[i], d);
        assert_eq!(assembled[i], a);
        expected.append(w);
    }
    assert_eq!(warnings, expected);
    assert_eq!(warnings.len(), 6);
}
