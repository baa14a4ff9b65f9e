#![doc = r#"
Standard MIDI File import into a quantized notation score

Bytes go through a forward-only pipeline:

```text
 SmfFile::parse ─► decode_track ─► assemble_track ─► resolve ─► group_tracks ─► ScoreBuilder
  (framing)        (per track)     (per track)      (global)   (staves)         (quantize, lay out)
```

Structural problems stop the import with an [`ImportError`]. Everything
else is repaired or skipped and reported as an [`ImportWarning`].

# Example
```rust
# use midiscore::prelude::*;
let mut smf = b"MThd\x00\x00\x00\x06\x00\x00\x00\x01\x01\xE0".to_vec();
let track = [
    0x00, 0x90, 60, 80, // note on
    0x83, 0x60, 0x90, 60, 0, // 480 ticks later, note on with velocity 0
    0x00, 0xFF, 0x2F, 0x00, // end of track
];
smf.extend_from_slice(b"MTrk");
smf.extend_from_slice(&(track.len() as u32).to_be_bytes());
smf.extend_from_slice(&track);

let imported = try_import(&smf, &MidiImportOptions::default()).unwrap();
let beat = &imported.score.tracks[0].measures[0].beats[0];
assert_eq!(beat.notes, vec![Note::new(60, Duration::Quarter, 0)]);
```

# Features
- `serde`: `Serialize`/`Deserialize` for the score model and options
- `parallel`: decode tracks on the rayon thread pool
- `cli`: the `smf2score` binary
"#]
#![warn(missing_docs)]

pub mod reader;

pub mod file;

pub mod events;
pub use events::{KeySignature, Tempo, TimeSignature};

pub mod message;
pub use message::Channel;

mod note;
pub use note::*;

mod error;
pub use error::*;

mod warning;
pub use warning::*;

mod options;
pub use options::*;

pub mod assemble;

pub mod resolve;

pub mod quantize;

pub mod group;

pub mod score;
pub use score::Duration;

mod import;
pub use import::*;

/// Everything needed to run an import and read the result
pub mod prelude {
    pub use crate::{
        Channel, ImportError, ImportMode, ImportResult, ImportWarning, Imported, Key,
        KeySignature, MidiImportOptions, Octave, Pitch, Tempo, TimeSignature, import_smf,
        score::{Beat, Clef, Duration, Hand, Measure, Note, Score, Track},
        try_import,
    };
}
