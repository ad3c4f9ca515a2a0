//! Debounced digital input trait

/// Electrical level that means "active" for a given input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchPolarity {
    /// Active when the pin reads high
    ActiveHigh,
    /// Active when the pin reads low (pull-up inputs)
    ActiveLow,
}

impl SwitchPolarity {
    /// Interpret a stable pin level
    pub fn is_active(self, level_high: bool) -> bool {
        match self {
            SwitchPolarity::ActiveHigh => level_high,
            SwitchPolarity::ActiveLow => !level_high,
        }
    }
}

/// A filtered digital input
///
/// The input only reports a level once it has been stable for the
/// debounce interval. Edge queries refer to the most recent `update`.
pub trait DebouncedSwitch {
    /// Sample the pin; returns true if the stable level changed
    fn update(&mut self, now_ms: u32) -> bool;

    /// Stable level (true = high)
    fn read(&self) -> bool;

    /// Stable level went low -> high during the last update
    fn rose(&self) -> bool;

    /// Stable level went high -> low during the last update
    fn fell(&self) -> bool;
}
