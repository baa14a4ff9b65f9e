#![doc = r#"
Channel voice message primitives

# Hierarchy
```text
         |----------------|
         |  Status byte   |
         |----------------|
          /              \
|---------------|   |---------|
| VoiceStatus   |   | Channel |
| (high nibble) |   | (low)   |
|---------------|   |---------|
```
"#]

mod channel;
pub use channel::*;

mod status;
pub use status::*;
