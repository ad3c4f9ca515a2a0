//! Pick-and-place state

use core::task::Poll;

use crate::config::machine::{DEFAULT_X_ACCEL, DEFAULT_Y_ACCEL};
use crate::hardware::{Context, Platform};
use crate::pnp::{PnpCycleEngine, PnpOutcome};
use crate::traits::{ActuatorIo, MotorAxis, TelemetryEvent};

use super::id::StateId;
use super::machine::{State, Transition};

/// A full tray always ends with a homing run
#[derive(Debug, Default)]
pub struct PnpState {
    engine: PnpCycleEngine,
}

impl PnpState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engine(&self) -> &PnpCycleEngine {
        &self.engine
    }
}

impl<P: Platform> State<P> for PnpState {
    fn enter(&mut self, ctx: &mut Context<'_, P>) -> Transition {
        self.engine.start(ctx.hw, &ctx.settings.pnp, ctx.now_ms);
        Transition::Stay
    }

    fn update(&mut self, ctx: &mut Context<'_, P>) -> Transition {
        match self.engine.poll(ctx) {
            Poll::Pending => Transition::Stay,
            Poll::Ready(PnpOutcome::Complete) | Poll::Ready(PnpOutcome::Aborted) => {
                Transition::To(StateId::Homing)
            }
            Poll::Ready(PnpOutcome::Fault(err)) => {
                ctx.emit(TelemetryEvent::PnpFault(err));
                Transition::To(StateId::Idle)
            }
        }
    }

    fn exit(&mut self, ctx: &mut Context<'_, P>) {
        ctx.hw.io.set_vacuum(false);
        ctx.hw.io.set_pick_cylinder(false);
        ctx.hw.x.set_acceleration(DEFAULT_X_ACCEL);
        ctx.hw.y.set_acceleration(DEFAULT_Y_ACCEL);
    }
}
