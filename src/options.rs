use num_enum::{IntoPrimitive, TryFromPrimitive};

#[doc = r#"
How decoded tracks become output staves.
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[repr(u8)]
pub enum ImportMode {
    /// Two tracks are assigned to hands by their median pitch; any other
    /// number of tracks is pooled and split like [`ImportMode::ForcePiano`].
    Smart = 0,
    /// Every track becomes its own staff, with no hand assigned.
    PreserveOriginal = 1,
    /// All notes are pooled and split at middle C into two hands.
    ForcePiano = 2,
}

impl Default for ImportMode {
    fn default() -> Self {
        Self::Smart
    }
}

#[doc = r#"
Configuration for a MIDI import.

```rust
# use midiscore::prelude::*;
let options = MidiImportOptions::default()
    .with_mode(ImportMode::PreserveOriginal)
    .with_max_tracks(4);
assert!(options.skip_percussion);
```
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct MidiImportOptions {
    /// Track grouping policy
    pub mode: ImportMode,
    /// Drop tracks that end up with no notes
    pub skip_empty_tracks: bool,
    /// Drop channel 10 tracks and notes
    pub skip_percussion: bool,
    /// Keep at most this many output tracks
    pub max_tracks: usize,
    /// Hold notes while the sustain pedal is down
    pub apply_sustain_pedal: bool,
    /// Allow dotted and double-dotted durations
    pub dotted_durations: bool,
}

impl Default for MidiImportOptions {
    fn default() -> Self {
        Self {
            mode: ImportMode::Smart,
            skip_empty_tracks: true,
            skip_percussion: true,
            max_tracks: Self::DEFAULT_MAX_TRACKS,
            apply_sustain_pedal: false,
            dotted_durations: false,
        }
    }
}

impl MidiImportOptions {
    /// Default value of [`MidiImportOptions::max_tracks`]
    pub const DEFAULT_MAX_TRACKS: usize = 16;

    /// Set the grouping mode
    pub const fn with_mode(mut self, mode: ImportMode) -> Self {
        self.mode = mode;
        self
    }
    /// Set whether empty tracks are dropped
    pub const fn with_skip_empty_tracks(mut self, skip: bool) -> Self {
        self.skip_empty_tracks = skip;
        self
    }
    /// Set whether percussion is dropped
    pub const fn with_skip_percussion(mut self, skip: bool) -> Self {
        self.skip_percussion = skip;
        self
    }
    /// Set the track limit
    pub const fn with_max_tracks(mut self, max_tracks: usize) -> Self {
        self.max_tracks = max_tracks;
        self
    }
    /// Set whether the sustain pedal lengthens notes
    pub const fn with_sustain_pedal(mut self, apply: bool) -> Self {
        self.apply_sustain_pedal = apply;
        self
    }
    /// Set whether durations may be dotted
    pub const fn with_dotted_durations(mut self, dotted: bool) -> Self {
        self.dotted_durations = dotted;
        self
    }
}

#[test]
fn defaults() {
    let options = MidiImportOptions::default();
    assert_eq!(options.mode, ImportMode::Smart);
    assert!(options.skip_empty_tracks);
    assert!(options.skip_percussion);
    assert_eq!(options.max_tracks, 16);
    assert!(!options.apply_sustain_pedal);
    assert!(!options.dotted_durations);
    assert_eq!(ImportMode::try_from(2u8).ok(), Some(ImportMode::ForcePiano));
    assert!(ImportMode::try_from(3u8).is_err());
}
