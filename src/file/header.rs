use super::{FormatType, Timing};

#[doc = r#"
The contents of the `MThd` chunk
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmfHeader {
    pub(crate) format: FormatType,
    pub(crate) declared_tracks: u16,
    pub(crate) timing: Timing,
}

impl SmfHeader {
    /// Create a new header
    pub const fn new(format: FormatType, declared_tracks: u16, timing: Timing) -> Self {
        Self {
            format,
            declared_tracks,
            timing,
        }
    }
    /// The format word
    pub const fn format(&self) -> FormatType {
        self.format
    }
    /// The number of tracks the header claims the file holds
    pub const fn declared_tracks(&self) -> u16 {
        self.declared_tracks
    }
    /// Get the timing props
    pub const fn timing(&self) -> &Timing {
        &self.timing
    }
}
