//! Debounced GPIO input
//!
//! A sampled level becomes the stable level once it has held for the
//! debounce interval. Read errors are treated as "no new sample".

use embedded_hal::digital::InputPin;
use sprayline_core::traits::DebouncedSwitch;

/// Time-based debouncer over any `embedded-hal` input pin
pub struct Debouncer<P> {
    pin: P,
    interval_ms: u32,
    /// Level being timed and when it was first seen
    candidate: bool,
    candidate_since: u32,
    stable: bool,
    rose: bool,
    fell: bool,
}

impl<P: InputPin> Debouncer<P> {
    /// Start from the pin's current level
    pub fn new(mut pin: P, interval_ms: u32, now_ms: u32) -> Self {
        let level = pin.is_high().unwrap_or(false);
        Self {
            pin,
            interval_ms,
            candidate: level,
            candidate_since: now_ms,
            stable: level,
            rose: false,
            fell: false,
        }
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub fn set_interval_ms(&mut self, interval_ms: u32) {
        self.interval_ms = interval_ms;
    }
}

impl<P: InputPin> DebouncedSwitch for Debouncer<P> {
    fn update(&mut self, now_ms: u32) -> bool {
        self.rose = false;
        self.fell = false;

        let Ok(level) = self.pin.is_high() else {
            return false;
        };
        if level != self.candidate {
            self.candidate = level;
            self.candidate_since = now_ms;
        }

        let held = now_ms.wrapping_sub(self.candidate_since);
        if self.candidate == self.stable || held < self.interval_ms {
            return false;
        }

        self.stable = self.candidate;
        self.rose = self.stable;
        self.fell = !self.stable;
        true
    }

    fn read(&self) -> bool {
        self.stable
    }

    fn rose(&self) -> bool {
        self.rose
    }

    fn fell(&self) -> bool {
        self.fell
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    /// Mock input whose level is shared with the test
    struct MockPin<'a> {
        level: &'a Cell<bool>,
    }

    impl ErrorType for MockPin<'_> {
        type Error = Infallible;
    }

    impl InputPin for MockPin<'_> {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.level.get())
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.level.get())
        }
    }

    #[test]
    fn test_starts_at_pin_level() {
        let level = Cell::new(true);
        let switch = Debouncer::new(MockPin { level: &level }, 10, 0);
        assert!(switch.read());
        assert!(!switch.rose());
    }

    #[test]
    fn test_level_must_hold_for_interval() {
        let level = Cell::new(true);
        let mut switch = Debouncer::new(MockPin { level: &level }, 10, 0);

        level.set(false);
        for t in 1..11 {
            assert!(!switch.update(t));
        }
        assert!(switch.read());

        assert!(switch.update(11));
        assert!(!switch.read());
        assert!(switch.fell());
        assert!(!switch.rose());

        // Edge reported for one update only
        switch.update(12);
        assert!(!switch.fell());
    }

    #[test]
    fn test_bounce_restarts_timer() {
        let level = Cell::new(false);
        let mut switch = Debouncer::new(MockPin { level: &level }, 10, 0);

        level.set(true);
        switch.update(1);
        level.set(false);
        switch.update(5);
        level.set(true);
        switch.update(6);

        assert!(!switch.update(15));
        assert!(switch.update(16));
        assert!(switch.rose());
    }

    #[test]
    fn test_survives_clock_wrap() {
        let level = Cell::new(false);
        let start = u32::MAX - 3;
        let mut switch = Debouncer::new(MockPin { level: &level }, 10, start);

        level.set(true);
        switch.update(start + 1);
        assert!(switch.update(start.wrapping_add(11)));
    }
}
