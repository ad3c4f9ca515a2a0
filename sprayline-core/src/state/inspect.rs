//! Tip inspection
//!
//! Brings the nozzle to the front of the machine and waits there. Leaving
//! with `INSPECT_TIP_OFF` drives back to where the carriage came from.

use core::task::Poll;

use crate::config::machine::{
    INSPECT_X_IN, INSPECT_Y_IN, MANUAL_X_SPEED, MANUAL_Y_SPEED, MANUAL_Z_SPEED,
};
use crate::hardware::{Context, Platform};
use crate::motion::{inches_to_steps, MoveTo, Sequence, SequenceFull, SequenceOutcome, Step};
use crate::traits::{ActuatorIo, MotorAxis};

use super::id::StateId;
use super::machine::{State, Transition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Phase {
    Approaching,
    Holding,
    Returning,
}

#[derive(Debug)]
pub struct InspectTipState {
    phase: Phase,
    /// XYZ on entry (steps)
    origin: (i32, i32, i32),
    return_requested: bool,
    script: Sequence,
}

impl Default for InspectTipState {
    fn default() -> Self {
        Self::new()
    }
}

fn manual_move(x: i32, y: i32, z: i32) -> Result<Sequence, SequenceFull> {
    let mut seq = Sequence::new();
    seq.push(Step::Move(
        MoveTo::new()
            .x(x, MANUAL_X_SPEED)
            .y(y, MANUAL_Y_SPEED)
            .z(z, MANUAL_Z_SPEED),
    ))?;
    Ok(seq)
}

impl InspectTipState {
    pub const fn new() -> Self {
        Self {
            phase: Phase::Approaching,
            origin: (0, 0, 0),
            return_requested: false,
            script: Sequence::new(),
        }
    }

    /// Drive back to the entry position, then go Idle
    pub fn request_return(&mut self) {
        self.return_requested = true;
    }

    fn run(&mut self, script: Result<Sequence, SequenceFull>, phase: Phase) -> Transition {
        match script {
            Ok(script) => {
                self.script = script;
                self.phase = phase;
                Transition::Stay
            }
            Err(SequenceFull) => Transition::To(StateId::Error),
        }
    }
}

impl<P: Platform> State<P> for InspectTipState {
    fn enter(&mut self, ctx: &mut Context<'_, P>) -> Transition {
        self.origin = (
            ctx.hw.x.position(),
            ctx.hw.y.position(),
            ctx.hw.z.position(),
        );
        self.return_requested = false;
        let approach = manual_move(inches_to_steps(INSPECT_X_IN), inches_to_steps(INSPECT_Y_IN), 0);
        self.run(approach, Phase::Approaching)
    }

    fn update(&mut self, ctx: &mut Context<'_, P>) -> Transition {
        if self.phase == Phase::Holding {
            if self.return_requested {
                let (x, y, z) = self.origin;
                return self.run(manual_move(x, y, z), Phase::Returning);
            }
            return Transition::Stay;
        }

        let control = ctx.control();
        match self.script.poll(ctx.hw, control, ctx.now_ms) {
            Poll::Pending | Poll::Ready(SequenceOutcome::Aborted) => Transition::Stay,
            Poll::Ready(SequenceOutcome::Completed) => match self.phase {
                Phase::Returning => Transition::To(StateId::Idle),
                _ => {
                    self.phase = Phase::Holding;
                    Transition::Stay
                }
            },
        }
    }

    fn exit(&mut self, ctx: &mut Context<'_, P>) {
        ctx.hw.io.set_spray_valve(false);
    }
}
