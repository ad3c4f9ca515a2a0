//! Machine constants and operator settings
//!
//! Fixed mechanical parameters live in [`machine`] as constants. Values the
//! operator can tune from the console live in [`Settings`], which is stored
//! in flash as postcard-serialized binary data.

pub mod machine;
pub mod settings;

pub use settings::{PnpSettings, Settings, SettingsError, SideSettings, SETTINGS_VERSION};
