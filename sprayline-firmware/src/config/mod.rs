//! Settings persistence
//!
//! Operator settings live in flash as one postcard blob. A blank or
//! unreadable partition falls back to the factory settings.

pub mod persistence;

pub use persistence::{ConfigError, SettingsStore};
