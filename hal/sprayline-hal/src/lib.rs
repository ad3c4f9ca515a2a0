//! Sprayline hardware abstraction layer
//!
//! Chip-independent pieces shared by the board crates. Motion, inputs and
//! outputs are abstracted in `sprayline-core`; this crate only covers what
//! the core never sees, which is persistent storage.
//!
//! ```text
//! sprayline-firmware ──► sprayline-hal (traits) ◄── sprayline-hal-rp2040
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod flash;

pub use flash::{FlashError, FlashStorage, StorageKey};
