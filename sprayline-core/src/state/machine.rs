//! State machine core
//!
//! Exactly one state is active. States never call back into the machine:
//! `enter` and `update` return a [`Transition`] which the machine applies
//! once the call has returned, so a change is never started while another
//! one is half done.
//!
//! An abort raised between ticks is handled here, before the active state
//! runs: everything is stopped and de-energized and the machine goes to
//! Homing. Homing clears the abort flags on entry and swallows any that
//! arrive while it runs, so repeated aborts produce a single transition.

use sprayline_protocol::SideId;

use crate::control::RuntimeFlags;
use crate::hardware::{Context, Platform};
use crate::traits::TelemetryEvent;

use super::cleaning::CleaningState;
use super::error::ErrorState;
use super::homing::HomingState;
use super::id::StateId;
use super::idle::IdleState;
use super::inspect::InspectTipState;
use super::painting::PaintingState;
use super::paused::PausedState;
use super::pnp::PnpState;
use super::side::SideState;

/// Enter/exit chains longer than this are cut off
const MAX_CHAINED_TRANSITIONS: usize = 8;

/// What a state asks for after a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    Stay,
    To(StateId),
    /// A side pattern finished; the sequencer or Homing takes over
    SideComplete,
}

impl Transition {
    /// Successor override if one is set, otherwise Idle
    pub fn next_or_idle(flags: &mut RuntimeFlags) -> Self {
        Transition::To(flags.take_next_state_override().unwrap_or(StateId::Idle))
    }
}

/// One scripted behaviour of the machine
pub trait State<P: Platform> {
    fn enter(&mut self, _ctx: &mut Context<'_, P>) -> Transition {
        Transition::Stay
    }

    fn update(&mut self, ctx: &mut Context<'_, P>) -> Transition;

    fn exit(&mut self, _ctx: &mut Context<'_, P>) {}
}

/// Owns one long-lived object per state
#[derive(Debug)]
pub struct StateMachine {
    current: StateId,
    idle: IdleState,
    homing: HomingState,
    painting: PaintingState,
    side: SideState,
    cleaning: CleaningState,
    pnp: PnpState,
    inspect: InspectTipState,
    paused: PausedState,
    error: ErrorState,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            current: StateId::Idle,
            idle: IdleState::new(),
            homing: HomingState::new(),
            painting: PaintingState::new(),
            side: SideState::new(SideId::One),
            cleaning: CleaningState::new(),
            pnp: PnpState::new(),
            inspect: InspectTipState::new(),
            paused: PausedState,
            error: ErrorState,
        }
    }

    pub fn current(&self) -> StateId {
        self.current
    }

    pub fn idle_mut(&mut self) -> &mut IdleState {
        &mut self.idle
    }

    pub fn inspect_mut(&mut self) -> &mut InspectTipState {
        &mut self.inspect
    }

    pub fn painting(&self) -> &PaintingState {
        &self.painting
    }

    fn state<P: Platform>(&mut self, id: StateId) -> &mut dyn State<P> {
        match id {
            StateId::Idle => &mut self.idle,
            StateId::Homing => &mut self.homing,
            StateId::Painting => &mut self.painting,
            StateId::Side(_) => &mut self.side,
            StateId::Cleaning => &mut self.cleaning,
            StateId::Pnp => &mut self.pnp,
            StateId::InspectTip => &mut self.inspect,
            StateId::Paused => &mut self.paused,
            StateId::Error => &mut self.error,
        }
    }

    /// Power-up: the machine always homes first
    pub fn boot<P: Platform>(&mut self, ctx: &mut Context<'_, P>) {
        self.current = StateId::Homing;
        let transition = self.state::<P>(StateId::Homing).enter(ctx);
        ctx.emit(TelemetryEvent::StateChanged(StateId::Homing));
        if let Some(next) = self.resolve(ctx, transition) {
            self.change_state(ctx, next);
        }
    }

    /// Exit the current state and enter `next`
    ///
    /// A no-op when `next` is already active. Telemetry names the new state
    /// once its `enter` has returned; a transition requested by `enter` is
    /// applied after that.
    pub fn change_state<P: Platform>(&mut self, ctx: &mut Context<'_, P>, next: StateId) {
        let mut next = next;
        for _ in 0..MAX_CHAINED_TRANSITIONS {
            if next == self.current {
                return;
            }

            let previous = self.current;
            self.state::<P>(previous).exit(ctx);

            self.current = next;
            if let StateId::Side(side) = next {
                self.side.select(side);
            }
            let transition = self.state::<P>(next).enter(ctx);
            ctx.emit(TelemetryEvent::StateChanged(next));

            match self.resolve(ctx, transition) {
                Some(id) => next = id,
                None => return,
            }
        }
    }

    /// Run the active state for one tick
    pub fn update<P: Platform>(&mut self, ctx: &mut Context<'_, P>) {
        if ctx.flags.abort_requested() && self.current != StateId::Homing {
            ctx.hw.fail_safe();
            ctx.flags.paused = false;
            ctx.flags.active_painting = false;
            ctx.flags.paint_all_sides_mode = false;
            ctx.flags.transitioning_to_paint_all_sides = false;
            ctx.flags.next_state_override = None;
            self.change_state(ctx, StateId::Homing);
            return;
        }

        let current = self.current;
        let transition = self.state::<P>(current).update(ctx);
        if let Some(next) = self.resolve(ctx, transition) {
            self.change_state(ctx, next);
        }
    }

    fn resolve<P: Platform>(
        &mut self,
        ctx: &mut Context<'_, P>,
        transition: Transition,
    ) -> Option<StateId> {
        match transition {
            Transition::Stay => None,
            Transition::To(id) => Some(id),
            Transition::SideComplete if ctx.flags.paint_all_sides_mode => {
                self.painting.on_side_completed();
                Some(StateId::Painting)
            }
            Transition::SideComplete => Some(StateId::Homing),
        }
    }
}
