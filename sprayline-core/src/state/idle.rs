//! Idle: parked and accepting commands
//!
//! Manual jobs (jogs, previews, the pick-location move) run here as a
//! small script without leaving Idle. A part presented at the cycle
//! sensor starts pick-and-place.

use crate::config::machine::TOOL_PARK_ANGLE;
use crate::hardware::{Context, Platform};
use crate::motion::Sequence;
use crate::traits::ActuatorIo;

use super::id::StateId;
use super::machine::{State, Transition};

#[derive(Debug, Default)]
pub struct IdleState {
    job: Option<Sequence>,
}

impl IdleState {
    pub const fn new() -> Self {
        Self { job: None }
    }

    /// A manual job is still running
    pub fn is_busy(&self) -> bool {
        self.job.is_some()
    }

    /// Run a manual job; replaces nothing if one is running
    pub fn start_job(&mut self, job: Sequence) -> bool {
        if self.job.is_some() {
            return false;
        }
        self.job = Some(job);
        true
    }
}

impl<P: Platform> State<P> for IdleState {
    fn enter(&mut self, ctx: &mut Context<'_, P>) -> Transition {
        ctx.flags.clear_runtime();
        ctx.hw.io.set_tool_angle(TOOL_PARK_ANGLE);
        ctx.hw.io.set_spray_valve(false);
        self.job = None;
        Transition::Stay
    }

    fn update(&mut self, ctx: &mut Context<'_, P>) -> Transition {
        if let Some(job) = &mut self.job {
            let control = ctx.control();
            if job.poll(ctx.hw, control, ctx.now_ms).is_ready() {
                self.job = None;
            }
            return Transition::Stay;
        }

        if ctx.hw.part_presented() {
            return Transition::To(StateId::Pnp);
        }
        Transition::Stay
    }

    fn exit(&mut self, _ctx: &mut Context<'_, P>) {
        self.job = None;
    }
}
