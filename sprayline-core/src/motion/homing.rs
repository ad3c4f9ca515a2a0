//! Multi-axis homing
//!
//! Sequence:
//! 1. Settle so switch bounce from the previous operation dies out.
//! 2. Turn the fixture back to 0° along the shortest path and zero it.
//! 3. Seek all four linear motors at once (X and both Y motors backward,
//!    Z forward). Each motor is stopped and zeroed the moment its own switch
//!    trips; the others keep running. A motor already on its switch is
//!    zeroed immediately.
//! 4. Back every motor off its switch at reduced acceleration.
//! 5. Re-zero, restore the default accelerations.
//! 6. Park at the fixed park position.
//!
//! Every phase has its own timeout. A timeout hard-stops everything and ends
//! the run with a [`HomingFailure`]; the caller decides whether to retry.
//! Homing does not honour pause or abort: it is what aborts lead to.

use core::task::Poll;

use crate::config::machine::{
    DEFAULT_ROT_ACCEL, DEFAULT_ROT_SPEED, DEFAULT_X_ACCEL, DEFAULT_X_SPEED, DEFAULT_Y_ACCEL,
    DEFAULT_Y_SPEED, DEFAULT_Z_ACCEL, DEFAULT_Z_SPEED, HOMING_ACCEL_XY, HOMING_ACCEL_Z,
    HOMING_MOVE_AWAY_ACCEL, HOMING_MOVE_AWAY_IN, HOMING_MOVE_AWAY_TIMEOUT_MS, HOMING_SETTLE_MS,
    HOMING_SPEED_HZ, HOMING_TIMEOUT_MS, PARK_TIMEOUT_MS, PARK_X_IN, PARK_Y_IN,
    ROTATION_HOME_TIMEOUT_MS, STEPS_PER_REV,
};
use crate::control::Deadline;
use crate::hardware::{Hardware, LinearAxis, Platform};
use crate::traits::MotorAxis;

use super::units::inches_to_steps;
use super::MoveTo;

/// Why a homing run gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingFailure {
    /// Fixture did not return to 0°
    RotationTimeout,
    /// At least one linear axis never reached its switch
    SwitchTimeout,
    /// Back-off move did not finish
    MoveAwayTimeout,
    /// Park move did not finish
    ParkTimeout,
}

impl HomingFailure {
    pub fn name(self) -> &'static str {
        match self {
            HomingFailure::RotationTimeout => "HOMING_ROTATION_TIMEOUT",
            HomingFailure::SwitchTimeout => "HOMING_SWITCH_TIMEOUT",
            HomingFailure::MoveAwayTimeout => "HOMING_MOVE_AWAY_TIMEOUT",
            HomingFailure::ParkTimeout => "HOMING_PARK_TIMEOUT",
        }
    }
}

/// Outcome of one homing run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HomingReport {
    /// Per linear motor, indexed by [`LinearAxis::index`]
    pub homed: [bool; 4],
    pub failure: Option<HomingFailure>,
}

impl HomingReport {
    pub fn success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn is_homed(&self, axis: LinearAxis) -> bool {
        self.homed[axis.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum HomingPhase {
    Idle,
    Settle,
    Rotation,
    Seek,
    MoveAway,
    Park,
    Done,
}

/// Poll-driven homing sequence
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HomingController {
    phase: HomingPhase,
    deadline: Deadline,
    homed: [bool; 4],
    failure: Option<HomingFailure>,
}

impl Default for HomingController {
    fn default() -> Self {
        Self::new()
    }
}

impl HomingController {
    pub const fn new() -> Self {
        Self {
            phase: HomingPhase::Idle,
            deadline: Deadline::start(0, 0),
            homed: [false; 4],
            failure: None,
        }
    }

    /// Begin a new run
    pub fn start<P: Platform>(&mut self, hw: &mut Hardware<P>, now_ms: u32) {
        hw.force_stop_all();
        self.homed = [false; 4];
        self.failure = None;
        self.phase = HomingPhase::Settle;
        self.deadline = Deadline::start(now_ms, HOMING_SETTLE_MS);
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.phase, HomingPhase::Idle | HomingPhase::Done)
    }

    fn report(&self) -> HomingReport {
        HomingReport {
            homed: self.homed,
            failure: self.failure,
        }
    }

    fn fail<P: Platform>(
        &mut self,
        hw: &mut Hardware<P>,
        failure: HomingFailure,
    ) -> Poll<HomingReport> {
        hw.force_stop_all();
        restore_default_accels(hw);
        self.failure = Some(failure);
        self.phase = HomingPhase::Done;
        Poll::Ready(self.report())
    }

    /// Advance the run by one tick
    pub fn poll<P: Platform>(&mut self, hw: &mut Hardware<P>, now_ms: u32) -> Poll<HomingReport> {
        match self.phase {
            HomingPhase::Idle | HomingPhase::Done => Poll::Ready(self.report()),

            HomingPhase::Settle => {
                if self.deadline.is_done(now_ms) {
                    self.start_rotation(hw, now_ms);
                }
                Poll::Pending
            }

            HomingPhase::Rotation => {
                if hw.rotation.is_running() {
                    if self.deadline.is_done(now_ms) {
                        return self.fail(hw, HomingFailure::RotationTimeout);
                    }
                    return Poll::Pending;
                }
                hw.rotation.set_position(0);
                hw.rotation.set_speed_hz(DEFAULT_ROT_SPEED);
                hw.rotation.set_acceleration(DEFAULT_ROT_ACCEL);
                self.start_seek(hw, now_ms);
                Poll::Pending
            }

            HomingPhase::Seek => {
                for axis in LinearAxis::ALL {
                    if !self.homed[axis.index()] && hw.home_switch_active(axis) {
                        hw.linear_axis(axis).force_stop_and_set_position(0);
                        self.homed[axis.index()] = true;
                    }
                }

                if self.homed.iter().all(|&h| h) {
                    self.start_move_away(hw, now_ms);
                } else if self.deadline.is_done(now_ms) {
                    return self.fail(hw, HomingFailure::SwitchTimeout);
                }
                Poll::Pending
            }

            HomingPhase::MoveAway => {
                if hw.any_running() {
                    if self.deadline.is_done(now_ms) {
                        return self.fail(hw, HomingFailure::MoveAwayTimeout);
                    }
                    return Poll::Pending;
                }

                for axis in LinearAxis::ALL {
                    hw.linear_axis(axis).set_position(0);
                }
                restore_default_accels(hw);

                MoveTo::new()
                    .x(inches_to_steps(PARK_X_IN), DEFAULT_X_SPEED)
                    .y(inches_to_steps(PARK_Y_IN), DEFAULT_Y_SPEED)
                    .z(0, DEFAULT_Z_SPEED)
                    .start(hw);
                self.phase = HomingPhase::Park;
                self.deadline = Deadline::start(now_ms, PARK_TIMEOUT_MS);
                Poll::Pending
            }

            HomingPhase::Park => {
                if hw.any_running() {
                    if self.deadline.is_done(now_ms) {
                        return self.fail(hw, HomingFailure::ParkTimeout);
                    }
                    return Poll::Pending;
                }
                self.phase = HomingPhase::Done;
                Poll::Ready(self.report())
            }
        }
    }

    fn start_rotation<P: Platform>(&mut self, hw: &mut Hardware<P>, now_ms: u32) {
        let here = hw.rotation.position();
        let within_turn = here.rem_euclid(STEPS_PER_REV);
        let target = if within_turn > STEPS_PER_REV / 2 {
            here + (STEPS_PER_REV - within_turn)
        } else {
            here - within_turn
        };

        hw.rotation.set_speed_hz((DEFAULT_ROT_SPEED / 2).max(1));
        hw.rotation.set_acceleration((DEFAULT_ROT_ACCEL / 2).max(1));
        hw.rotation.move_to(target);
        self.phase = HomingPhase::Rotation;
        self.deadline = Deadline::start(now_ms, ROTATION_HOME_TIMEOUT_MS);
    }

    fn start_seek<P: Platform>(&mut self, hw: &mut Hardware<P>, now_ms: u32) {
        for axis in LinearAxis::ALL {
            if hw.home_switch_active(axis) {
                hw.linear_axis(axis).force_stop_and_set_position(0);
                self.homed[axis.index()] = true;
                continue;
            }

            let motor = hw.linear_axis(axis);
            motor.set_speed_hz(HOMING_SPEED_HZ);
            if axis == LinearAxis::Z {
                motor.set_acceleration(HOMING_ACCEL_Z);
                motor.run_forward();
            } else {
                motor.set_acceleration(HOMING_ACCEL_XY);
                motor.run_backward();
            }
        }
        self.phase = HomingPhase::Seek;
        self.deadline = Deadline::start(now_ms, HOMING_TIMEOUT_MS);
    }

    fn start_move_away<P: Platform>(&mut self, hw: &mut Hardware<P>, now_ms: u32) {
        let away = inches_to_steps(HOMING_MOVE_AWAY_IN);
        for axis in LinearAxis::ALL {
            let motor = hw.linear_axis(axis);
            motor.set_acceleration(HOMING_MOVE_AWAY_ACCEL);
            motor.set_speed_hz(HOMING_SPEED_HZ);
            motor.move_to(if axis == LinearAxis::Z { -away } else { away });
        }
        self.phase = HomingPhase::MoveAway;
        self.deadline = Deadline::start(now_ms, HOMING_MOVE_AWAY_TIMEOUT_MS);
    }
}

fn restore_default_accels<P: Platform>(hw: &mut Hardware<P>) {
    hw.x.set_acceleration(DEFAULT_X_ACCEL);
    hw.y.set_acceleration(DEFAULT_Y_ACCEL);
    hw.z.set_acceleration(DEFAULT_Z_ACCEL);
    hw.rotation.set_acceleration(DEFAULT_ROT_ACCEL);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestRig;
    use proptest::prelude::*;

    fn home(rig: &mut TestRig) -> (HomingReport, u32) {
        let mut homing = HomingController::new();
        let started = rig.now;
        homing.start(&mut rig.hw, rig.now);
        loop {
            rig.tick();
            if let Poll::Ready(report) = homing.poll(&mut rig.hw, rig.now) {
                return (report, rig.now - started);
            }
            assert!(rig.now - started < 60_000, "homing never finished");
        }
    }

    #[test]
    fn test_all_switches_already_tripped() {
        let mut rig = TestRig::new();
        let (report, _) = home(&mut rig);

        assert!(report.success());
        assert_eq!(report.homed, [true; 4]);
        assert!(!rig.hw.any_running());
        assert_eq!(rig.hw.x.position(), 0);
        assert_eq!(rig.hw.y.position(), inches_to_steps(PARK_Y_IN));
        assert_eq!(rig.hw.y.right().position(), inches_to_steps(PARK_Y_IN));
        assert_eq!(rig.hw.z.position(), 0);
    }

    #[test]
    fn test_each_axis_stops_on_its_own_switch() {
        let mut rig = TestRig::new();
        rig.place(LinearAxis::X, 300);
        rig.place(LinearAxis::YLeft, 900);
        rig.place(LinearAxis::YRight, 880);
        rig.place(LinearAxis::Z, -200);

        let (report, _) = home(&mut rig);
        assert!(report.success());

        // Squared gantry: both Y motors end at the same physical spot
        assert_eq!(rig.hw.y.left().physical(), rig.hw.y.right().physical());
        assert_eq!(rig.hw.y.left().position(), rig.hw.y.right().position());
        assert_eq!(rig.hw.z.position(), 0);
        assert_eq!(rig.hw.x.physical(), inches_to_steps(HOMING_MOVE_AWAY_IN));
    }

    #[test]
    fn test_rotation_takes_shortest_path() {
        let mut rig = TestRig::new();
        rig.hw.rotation.set_position(3_000);
        let (report, _) = home(&mut rig);

        assert!(report.success());
        assert_eq!(rig.hw.rotation.position(), 0);
        assert!(rig.hw.rotation.max_position_seen() <= 4_000);
        assert!(rig.hw.rotation.min_position_seen() >= 3_000);
    }

    #[test]
    fn test_missing_switch_times_out() {
        let mut rig = TestRig::new();
        rig.place(LinearAxis::YRight, 500);
        rig.disconnect_switch(LinearAxis::YRight);

        let (report, took) = home(&mut rig);
        assert_eq!(report.failure, Some(HomingFailure::SwitchTimeout));
        assert!(report.is_homed(LinearAxis::X));
        assert!(!report.is_homed(LinearAxis::YRight));
        assert!(!rig.hw.any_running());
        assert!(took <= HOMING_SETTLE_MS + HOMING_TIMEOUT_MS + 10);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_homing_terminates_and_stops(
            x in prop_oneof![Just(0i32), 1i32..2_000],
            y in prop_oneof![Just(0i32), 1i32..2_000],
            z in prop_oneof![Just(0i32), -2_000i32..-1],
        ) {
            let mut rig = TestRig::new();
            rig.place(LinearAxis::X, x);
            rig.place(LinearAxis::YLeft, y);
            rig.place(LinearAxis::YRight, y);
            rig.place(LinearAxis::Z, z);

            let (report, took) = home(&mut rig);
            prop_assert!(report.success());
            prop_assert!(!rig.hw.any_running());
            prop_assert!(took <= HOMING_SETTLE_MS + ROTATION_HOME_TIMEOUT_MS
                + HOMING_TIMEOUT_MS + HOMING_MOVE_AWAY_TIMEOUT_MS + PARK_TIMEOUT_MS);
        }
    }
}
