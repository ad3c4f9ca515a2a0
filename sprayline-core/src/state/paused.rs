//! Paused from Idle
//!
//! A pause during a long operation never comes here: the operation holds
//! in place on its own. This state covers a pause with nothing running.

use crate::hardware::{Context, Platform};
use crate::traits::ActuatorIo;

use super::machine::{State, Transition};

#[derive(Debug, Default)]
pub struct PausedState;

impl<P: Platform> State<P> for PausedState {
    fn enter(&mut self, ctx: &mut Context<'_, P>) -> Transition {
        ctx.hw.force_stop_all();
        ctx.hw.io.set_spray_valve(false);
        ctx.flags.paused = true;
        Transition::Stay
    }

    fn update(&mut self, ctx: &mut Context<'_, P>) -> Transition {
        if ctx.flags.paused {
            Transition::Stay
        } else {
            Transition::next_or_idle(ctx.flags)
        }
    }

    fn exit(&mut self, ctx: &mut Context<'_, P>) {
        ctx.flags.paused = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::MoveTo;
    use crate::state::StateId;
    use crate::testing::{SimPlatform, TestRig};

    #[test]
    fn test_stops_and_waits_for_resume() {
        let mut rig = TestRig::new();
        MoveTo::new().x(5_000, 1_000).start(&mut rig.hw);
        rig.hw.io.set_spray_valve(true);

        let mut state = PausedState;
        State::<SimPlatform>::enter(&mut state, &mut rig.ctx());
        assert!(!rig.hw.any_running());
        assert!(!rig.hw.io.spray_valve());

        rig.tick();
        assert_eq!(State::<SimPlatform>::update(&mut state, &mut rig.ctx()), Transition::Stay);

        rig.flags.paused = false;
        rig.flags.next_state_override = Some(StateId::InspectTip);
        assert_eq!(
            State::<SimPlatform>::update(&mut state, &mut rig.ctx()),
            Transition::To(StateId::InspectTip)
        );
    }
}
