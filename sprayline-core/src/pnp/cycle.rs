//! Pick-and-place cycle engine
//!
//! ```text
//! MovingToPick -> WaitingForSensor -> Processing -> ReturningToPick
//!                        ^                                 |
//!                        +------------- more cells --------+
//!                                                          |
//!                                           last cell -> Complete
//! ```
//!
//! Processing is one scripted pick (extend, vacuum, retract), a move to the
//! target cell and a place (extend, release, retract). The final placement
//! of a tray runs Y at half the PnP speed.
//!
//! The optional cycle timeout is a budget for the whole run, counted from
//! `start`. It is only checked while waiting for the sensor, so a pick or
//! place in progress always finishes.

use core::task::Poll;

use crate::config::machine::{
    PICK_EXTEND_MS, PICK_RETRACT_MS, PICK_VACUUM_MS, PICK_X_IN, PICK_Y_IN, PLACE_EXTEND_MS,
    PLACE_RELEASE_MS, PLACE_RETRACT_MS,
};
use crate::config::PnpSettings;
use crate::control::{Control, Deadline};
use crate::hardware::{Context, Hardware, Platform, PANEL_INPUT_POLARITY};
use crate::motion::{inches_to_steps, MoveTo, Sequence, SequenceFull, SequenceOutcome, Step};
use crate::traits::{ActuatorIo, DebouncedSwitch, MotorAxis, TelemetryEvent};

use super::grid::{GridCell, PnpSequence};
use super::PnpError;

/// How a PnP run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PnpOutcome {
    /// Tray filled (or cut short by an invalid cell)
    Complete,
    Aborted,
    /// Gave up with the head made safe
    Fault(PnpError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum PnpStep {
    Idle,
    MovingToPick,
    WaitingForSensor,
    Processing,
    ReturningToPick,
    Complete,
}

/// Drives one tray of pick-and-place cycles
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PnpCycleEngine {
    step: PnpStep,
    order: PnpSequence,
    index: usize,
    placed: u8,
    tray_full: bool,
    budget: Option<Deadline>,
    motion: Sequence,
}

impl Default for PnpCycleEngine {
    fn default() -> Self {
        Self::new(PnpSequence::default())
    }
}

impl PnpCycleEngine {
    pub const fn new(order: PnpSequence) -> Self {
        Self {
            step: PnpStep::Idle,
            order,
            index: 0,
            placed: 0,
            tray_full: false,
            budget: None,
            motion: Sequence::new(),
        }
    }

    /// Grid index of the next placement
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn placed(&self) -> u8 {
        self.placed
    }

    /// Start a fresh tray
    pub fn start<P: Platform>(&mut self, hw: &mut Hardware<P>, pnp: &PnpSettings, now_ms: u32) {
        self.index = self.order.first;
        self.placed = 0;
        self.tray_full = false;
        self.budget = match pnp.sensor_timeout_s {
            0 => None,
            s => Some(Deadline::start(now_ms, s as u32 * 1_000)),
        };

        hw.x.set_acceleration(pnp.x_accel);
        hw.y.set_acceleration(pnp.y_accel);
        hw.io.set_vacuum(false);
        hw.io.set_pick_cylinder(false);

        pick_location(pnp).start(hw);
        self.step = PnpStep::MovingToPick;
    }

    /// Stop everything and leave the head safe
    fn make_safe<P: Platform>(hw: &mut Hardware<P>) {
        hw.force_stop_all();
        hw.io.set_vacuum(false);
        hw.io.set_pick_cylinder(false);
    }

    /// Advance the run by one tick
    pub fn poll<P: Platform>(&mut self, ctx: &mut Context<'_, P>) -> Poll<PnpOutcome> {
        let control = ctx.control();
        if control.is_abort() {
            Self::make_safe(ctx.hw);
            self.step = PnpStep::Idle;
            return Poll::Ready(PnpOutcome::Aborted);
        }

        match self.step {
            PnpStep::Idle => Poll::Ready(PnpOutcome::Aborted),
            PnpStep::Complete => Poll::Ready(PnpOutcome::Complete),

            PnpStep::MovingToPick | PnpStep::ReturningToPick => {
                if ctx.hw.any_running() {
                    return Poll::Pending;
                }
                if self.tray_full {
                    self.step = PnpStep::Complete;
                    return Poll::Ready(PnpOutcome::Complete);
                }
                self.step = PnpStep::WaitingForSensor;
                Poll::Pending
            }

            PnpStep::WaitingForSensor => {
                if control == Control::Hold {
                    return Poll::Pending;
                }
                if PANEL_INPUT_POLARITY.is_active(ctx.hw.cycle_sensor.read()) {
                    return self.begin_cycle(ctx);
                }
                if self.budget.is_some_and(|d| d.is_done(ctx.now_ms)) {
                    Self::make_safe(ctx.hw);
                    self.step = PnpStep::Idle;
                    return Poll::Ready(PnpOutcome::Fault(PnpError::SensorTimeout));
                }
                Poll::Pending
            }

            PnpStep::Processing => match self.motion.poll(ctx.hw, control, ctx.now_ms) {
                Poll::Pending => Poll::Pending,
                Poll::Ready(SequenceOutcome::Aborted) => {
                    Self::make_safe(ctx.hw);
                    self.step = PnpStep::Idle;
                    Poll::Ready(PnpOutcome::Aborted)
                }
                Poll::Ready(SequenceOutcome::Completed) => {
                    self.placed = self.placed.saturating_add(1);
                    ctx.emit(TelemetryEvent::PnpPlaced {
                        placed: self.placed,
                        total: self.order.total() as u8,
                    });

                    self.tray_full = self.order.is_final(self.index);
                    self.index = self.order.next(self.index);
                    pick_location(&ctx.settings.pnp).start(ctx.hw);
                    self.step = PnpStep::ReturningToPick;
                    Poll::Pending
                }
            },
        }
    }

    fn begin_cycle<P: Platform>(&mut self, ctx: &mut Context<'_, P>) -> Poll<PnpOutcome> {
        let cell = match GridCell::from_index(self.index) {
            Ok(cell) => cell,
            Err(err) => {
                ctx.emit(TelemetryEvent::PnpFault(err));
                self.step = PnpStep::Complete;
                return Poll::Ready(PnpOutcome::Complete);
            }
        };

        let last = self.order.is_final(self.index);
        match pick_and_place(cell, &ctx.settings.pnp, last) {
            Ok(motion) => {
                self.motion = motion;
                self.step = PnpStep::Processing;
                Poll::Pending
            }
            Err(SequenceFull) => {
                Self::make_safe(ctx.hw);
                self.step = PnpStep::Complete;
                Poll::Ready(PnpOutcome::Complete)
            }
        }
    }
}

/// Move to where parts are presented
pub fn pick_location(pnp: &PnpSettings) -> MoveTo {
    MoveTo::new()
        .x(inches_to_steps(PICK_X_IN), pnp.x_speed)
        .y(inches_to_steps(PICK_Y_IN), pnp.y_speed)
}

/// Pick at the current location, place into `cell`
pub fn pick_and_place(
    cell: GridCell,
    pnp: &PnpSettings,
    last: bool,
) -> Result<Sequence, SequenceFull> {
    let (x, y) = cell.position_steps();
    let y_speed = if last {
        (pnp.y_speed / 2).max(1)
    } else {
        pnp.y_speed
    };

    let mut seq = Sequence::new();
    seq.push(Step::PickCylinder(true))?;
    seq.push(Step::Wait(PICK_EXTEND_MS))?;
    seq.push(Step::Vacuum(true))?;
    seq.push(Step::Wait(PICK_VACUUM_MS))?;
    seq.push(Step::PickCylinder(false))?;
    seq.push(Step::Wait(PICK_RETRACT_MS))?;

    seq.push(Step::Move(MoveTo::new().x(x, pnp.x_speed).y(y, y_speed)))?;

    seq.push(Step::PickCylinder(true))?;
    seq.push(Step::Wait(PLACE_EXTEND_MS))?;
    seq.push(Step::Vacuum(false))?;
    seq.push(Step::Wait(PLACE_RELEASE_MS))?;
    seq.push(Step::PickCylinder(false))?;
    seq.push(Step::Wait(PLACE_RETRACT_MS))?;
    Ok(seq)
}
