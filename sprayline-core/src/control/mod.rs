//! Cross-cutting operator intent and timing helpers

pub mod flags;
pub mod timer;

pub use flags::{AbortKind, Control, RuntimeFlags};
pub use timer::Deadline;
