use num_enum::{IntoPrimitive, TryFromPrimitive};

#[doc = r#"
The SMF format word from the header chunk.

- Format 0 holds a single multi-channel track.
- Format 1 holds simultaneous tracks sharing one timeline.
- Format 2 holds sequentially independent patterns and cannot be imported.
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u16)]
pub enum FormatType {
    /// Format 0
    SingleMultiChannel = 0,
    /// Format 1
    Simultaneous = 1,
    /// Format 2
    SequentiallyIndependent = 2,
}

impl FormatType {
    /// True for the formats whose tracks share one timeline.
    pub const fn is_importable(&self) -> bool {
        matches!(self, Self::SingleMultiChannel | Self::Simultaneous)
    }
}

#[test]
fn format_words() {
    assert_eq!(FormatType::try_from(0u16).ok(), Some(FormatType::SingleMultiChannel));
    assert_eq!(FormatType::try_from(1u16).ok(), Some(FormatType::Simultaneous));
    assert!(!FormatType::try_from(2u16).unwrap().is_importable());
    assert!(FormatType::try_from(3u16).is_err());
    assert_eq!(u16::from(FormatType::Simultaneous), 1);
}
