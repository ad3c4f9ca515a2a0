//! Pick-and-place
//!
//! Parts arrive one at a time at a fixed pick location and are placed into
//! a tray of `PNP_ROWS` x `PNP_COLS` cells.

pub mod cycle;
pub mod grid;

pub use cycle::{pick_location, PnpCycleEngine, PnpOutcome};
pub use grid::{GridCell, PnpSequence, GRID_CELLS};

/// Pick-and-place faults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PnpError {
    /// Grid index outside the tray; the cycle is completed early
    InvalidGridIndex,
    /// No part arrived in time; the head is made safe and the machine idles
    SensorTimeout,
}

impl PnpError {
    pub fn name(self) -> &'static str {
        match self {
            PnpError::InvalidGridIndex => "PNP_INVALID_GRID_INDEX",
            PnpError::SensorTimeout => "PNP_SENSOR_TIMEOUT",
        }
    }
}
