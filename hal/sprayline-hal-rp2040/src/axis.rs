//! Ramped, position-tracking axis over a PIO stepper
//!
//! The PIO only knows a frequency, so acceleration and position live in a
//! [`RampProfile`] advanced on every controller tick. The position is the
//! profile's integral of the commanded rate: open loop, like every stepper
//! position the machine keeps.

use embassy_rp::pio::Instance;
use sprayline_core::motion::RampProfile;
use sprayline_core::traits::MotorAxis;

use crate::stepper::PioStepper;

/// What an axis needs from a step generator
///
/// Lets every motor share one axis type regardless of which PIO block and
/// state machine drives it.
pub trait StepOutput {
    fn set_direction(&mut self, forward: bool);

    /// Pulse at `hz`; zero stops
    fn set_frequency(&mut self, hz: u32);

    fn stop(&mut self);
}

impl<PIO: Instance, const SM: usize> StepOutput for PioStepper<'_, PIO, SM> {
    fn set_direction(&mut self, forward: bool) {
        PioStepper::set_direction(self, forward);
    }

    fn set_frequency(&mut self, hz: u32) {
        PioStepper::set_frequency(self, hz);
    }

    fn stop(&mut self) {
        PioStepper::stop(self);
    }
}

pub struct PioAxis<'d> {
    output: &'d mut dyn StepOutput,
    ramp: RampProfile,
    last_poll_ms: Option<u32>,
}

impl<'d> PioAxis<'d> {
    pub fn new(output: &'d mut dyn StepOutput) -> Self {
        Self {
            output,
            ramp: RampProfile::new(),
            last_poll_ms: None,
        }
    }

    /// Push the profile's current rate to the step generator
    fn apply(&mut self) {
        let rate = self.ramp.step_rate_hz();
        if self.ramp.is_running() && rate > 0 {
            self.output.set_direction(self.ramp.direction() > 0);
            self.output.set_frequency(rate);
        } else {
            self.output.stop();
        }
    }
}

impl MotorAxis for PioAxis<'_> {
    fn set_speed_hz(&mut self, hz: u32) {
        self.ramp.set_max_speed(hz);
    }

    fn set_acceleration(&mut self, steps_per_s2: u32) {
        self.ramp.set_acceleration(steps_per_s2);
    }

    fn move_to(&mut self, target: i32) {
        self.ramp.move_to(target);
    }

    fn run_forward(&mut self) {
        self.ramp.run(true);
    }

    fn run_backward(&mut self) {
        self.ramp.run(false);
    }

    fn is_running(&self) -> bool {
        self.ramp.is_running()
    }

    fn position(&self) -> i32 {
        self.ramp.position()
    }

    fn set_position(&mut self, steps: i32) {
        self.ramp.set_position(steps);
    }

    fn force_stop_and_set_position(&mut self, steps: i32) {
        self.ramp.stop_now();
        self.ramp.set_position(steps);
        self.output.stop();
    }

    fn poll(&mut self, now_ms: u32) {
        let delta = match self.last_poll_ms {
            Some(last) => now_ms.wrapping_sub(last),
            None => 0,
        };
        self.last_poll_ms = Some(now_ms);
        self.ramp.update(delta);
        self.apply();
    }
}
