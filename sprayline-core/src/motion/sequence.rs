//! Scripted step sequences
//!
//! Every scripted operation of the machine (side patterns, cleaning, the
//! pick/place motion, manual jobs) is a flat list of [`Step`]s run by one
//! [`Sequence`]. A hold is honoured between steps and inside sweeps. A wait
//! is frozen while held, with the spray valve closed until it resumes.
//! Plain moves only stop for an abort.

use core::task::Poll;

use heapless::Vec;

use crate::control::{Control, Deadline};
use crate::hardware::{Hardware, Platform};
use crate::traits::{ActuatorIo, MotorAxis};

use super::sync::{MotionSynchronizer, Sweep, SweepOutcome};
use super::MoveTo;

/// Longest script a sequence can hold
pub const MAX_STEPS: usize = 48;

/// One scripted action
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// Tool servo angle (degrees)
    ToolAngle(f32),
    Pressurizer(bool),
    SprayValve(bool),
    Vacuum(bool),
    PickCylinder(bool),
    /// Dwell (ms)
    Wait(u32),
    Move(MoveTo),
    /// Relative fixture turn (steps) that leaves the tracked angle unchanged
    TurnFixture { steps: i32, speed_hz: u32 },
    /// Gated spray sweep
    Sweep(Sweep),
    /// Switch the pressurizer on and dwell, only if it was off
    PressurizeIfOff(u32),
}

/// Script did not fit in [`MAX_STEPS`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SequenceFull;

/// How a sequence ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequenceOutcome {
    Completed,
    Aborted,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Active {
    /// Next step not started yet
    Ready,
    Waiting(Deadline),
    /// Wait frozen by a hold with `remaining` ms still to go
    WaitHeld { remaining: u32, valve_was_on: bool },
    Moving,
    Turning { restore: i32 },
    Sweeping(MotionSynchronizer),
}

/// A script and its progress
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sequence {
    steps: Vec<Step, MAX_STEPS>,
    index: usize,
    active: Active,
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequence {
    pub const fn new() -> Self {
        Self {
            steps: Vec::new(),
            index: 0,
            active: Active::Ready,
        }
    }

    pub fn push(&mut self, step: Step) -> Result<(), SequenceFull> {
        self.steps.push(step).map_err(|_| SequenceFull)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Index of the step currently running (or next to run)
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.steps.len()
    }

    fn advance(&mut self) {
        self.index += 1;
        self.active = Active::Ready;
    }

    /// Advance the script by one tick
    pub fn poll<P: Platform>(
        &mut self,
        hw: &mut Hardware<P>,
        control: Control,
        now_ms: u32,
    ) -> Poll<SequenceOutcome> {
        if control.is_abort() {
            hw.force_stop_all();
            hw.io.set_spray_valve(false);
            self.index = self.steps.len();
            self.active = Active::Ready;
            return Poll::Ready(SequenceOutcome::Aborted);
        }

        loop {
            match &mut self.active {
                Active::Ready => {
                    let Some(step) = self.steps.get(self.index).copied() else {
                        return Poll::Ready(SequenceOutcome::Completed);
                    };
                    if control == Control::Hold {
                        return Poll::Pending;
                    }
                    self.begin(step, hw, now_ms);
                }
                Active::Waiting(deadline) => {
                    let deadline = *deadline;
                    if deadline.is_done(now_ms) {
                        self.advance();
                        continue;
                    }
                    if control == Control::Hold {
                        let valve_was_on = hw.io.spray_valve();
                        hw.io.set_spray_valve(false);
                        self.active = Active::WaitHeld {
                            remaining: deadline.remaining(now_ms),
                            valve_was_on,
                        };
                    }
                    return Poll::Pending;
                }
                Active::WaitHeld {
                    remaining,
                    valve_was_on,
                } => {
                    if control == Control::Hold {
                        return Poll::Pending;
                    }
                    let remaining = *remaining;
                    if *valve_was_on {
                        hw.io.set_spray_valve(true);
                    }
                    self.active = Active::Waiting(Deadline::start(now_ms, remaining));
                    return Poll::Pending;
                }
                Active::Moving => {
                    if hw.any_running() {
                        return Poll::Pending;
                    }
                    self.advance();
                }
                Active::Turning { restore } => {
                    if hw.rotation.is_running() {
                        return Poll::Pending;
                    }
                    let restore = *restore;
                    hw.rotation.set_position(restore);
                    self.advance();
                }
                Active::Sweeping(sync) => {
                    let (axis, io) = hw.axis_and_io(sync.axis());
                    match sync.poll(axis, io, control, now_ms) {
                        Poll::Pending => return Poll::Pending,
                        Poll::Ready(SweepOutcome::Completed) => self.advance(),
                        Poll::Ready(SweepOutcome::Aborted) => {
                            return Poll::Ready(SequenceOutcome::Aborted)
                        }
                    }
                }
            }
        }
    }

    fn begin<P: Platform>(&mut self, step: Step, hw: &mut Hardware<P>, now_ms: u32) {
        match step {
            Step::ToolAngle(degrees) => {
                hw.io.set_tool_angle(degrees);
                self.advance();
            }
            Step::Pressurizer(on) => {
                hw.io.set_pressurizer(on);
                self.advance();
            }
            Step::SprayValve(on) => {
                hw.io.set_spray_valve(on);
                self.advance();
            }
            Step::Vacuum(on) => {
                hw.io.set_vacuum(on);
                self.advance();
            }
            Step::PickCylinder(extended) => {
                hw.io.set_pick_cylinder(extended);
                self.advance();
            }
            Step::Wait(ms) => self.active = Active::Waiting(Deadline::start(now_ms, ms)),
            Step::Move(mv) => {
                mv.start(hw);
                self.active = Active::Moving;
            }
            Step::TurnFixture { steps, speed_hz } => {
                let restore = hw.rotation.position();
                hw.rotation.set_speed_hz(speed_hz);
                hw.rotation.move_by(steps);
                self.active = Active::Turning { restore };
            }
            Step::Sweep(sweep) => {
                let (axis, io) = hw.axis_and_io(sweep.axis);
                let sync = MotionSynchronizer::start(sweep, axis, io, now_ms);
                self.active = Active::Sweeping(sync);
            }
            Step::PressurizeIfOff(ms) => {
                if hw.io.pressurizer() {
                    self.advance();
                } else {
                    hw.io.set_pressurizer(true);
                    self.active = Active::Waiting(Deadline::start(now_ms, ms));
                }
            }
        }
    }
}
