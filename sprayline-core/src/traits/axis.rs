//! Stepper axis trait
//!
//! This trait abstracts over the step generator behind one motor. Moves are
//! non-blocking: a call starts the motion and `is_running` reports when the
//! axis has come to rest. Positions are absolute step counts.

/// Command surface of one open-loop stepper axis
pub trait MotorAxis {
    /// Set the cruise speed for subsequent moves (steps/s)
    fn set_speed_hz(&mut self, hz: u32);

    /// Set the acceleration used to ramp up and down (steps/s²)
    fn set_acceleration(&mut self, steps_per_s2: u32);

    /// Start a move to an absolute position
    fn move_to(&mut self, target: i32);

    /// Start a move relative to the current position
    fn move_by(&mut self, delta: i32) {
        let target = self.position().wrapping_add(delta);
        self.move_to(target);
    }

    /// Run continuously toward increasing positions
    fn run_forward(&mut self);

    /// Run continuously toward decreasing positions
    fn run_backward(&mut self);

    /// Check if a move or continuous run is in progress
    fn is_running(&self) -> bool;

    /// Current logical position in steps
    fn position(&self) -> i32;

    /// Redefine the current position without moving
    fn set_position(&mut self, steps: i32);

    /// Stop immediately (no deceleration) and redefine the position
    fn force_stop_and_set_position(&mut self, steps: i32);

    /// Stop immediately, keeping the current position
    fn force_stop(&mut self) {
        let here = self.position();
        self.force_stop_and_set_position(here);
    }

    /// Advance software-timed state
    ///
    /// Called once per controller tick before any state logic runs.
    /// Implementations that generate steps in hardware can ignore it.
    fn poll(&mut self, _now_ms: u32) {}
}
