//! RP2040 support for the Sprayline firmware
//!
//! - PIO step pulse generation, one state machine per motor
//! - [`axis::PioAxis`], the core's `MotorAxis` over a PIO stepper
//! - Settings storage in the last 64 KB of flash

#![no_std]

pub mod axis;
pub mod flash;
pub mod pio;
pub mod stepper;

pub use axis::{PioAxis, StepOutput};
pub use sprayline_hal::{FlashStorage as FlashStorageTrait, StorageKey};
