//! Error state
//!
//! Entry stops every axis and de-energizes every output before anything
//! else. The machine stays here until the operator homes or clears.

use crate::hardware::{Context, Platform};

use super::machine::{State, Transition};

#[derive(Debug, Default)]
pub struct ErrorState;

impl<P: Platform> State<P> for ErrorState {
    fn enter(&mut self, ctx: &mut Context<'_, P>) -> Transition {
        ctx.hw.fail_safe();
        ctx.flags.clear_runtime();
        Transition::Stay
    }

    fn update(&mut self, _ctx: &mut Context<'_, P>) -> Transition {
        Transition::Stay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::MoveTo;
    use crate::state::StateId;
    use crate::testing::{SimPlatform, TestRig};
    use crate::traits::ActuatorIo;

    #[test]
    fn test_entry_is_fail_safe() {
        let mut rig = TestRig::new();
        MoveTo::new().y(5_000, 1_000).start(&mut rig.hw);
        rig.hw.io.set_pressurizer(true);
        rig.hw.io.set_vacuum(true);
        rig.flags.active_painting = true;

        State::<SimPlatform>::enter(&mut ErrorState, &mut rig.ctx());
        assert!(!rig.hw.any_running());
        assert!(!rig.hw.io.pressurizer());
        assert!(!rig.hw.io.vacuum());
        assert!(!rig.flags.active_painting);
    }

    #[test]
    fn test_entry_drops_pending_requests() {
        let mut rig = TestRig::new();
        rig.flags.soft_abort = true;
        rig.flags.paint_all_sides_mode = true;
        rig.flags.transitioning_to_paint_all_sides = true;
        rig.flags.next_state_override = Some(StateId::Painting);

        State::<SimPlatform>::enter(&mut ErrorState, &mut rig.ctx());
        assert!(!rig.flags.abort_requested());
        assert!(!rig.flags.paint_all_sides_mode);
        assert!(!rig.flags.transitioning_to_paint_all_sides);
        assert_eq!(rig.flags.next_state_override, None);
    }
}
