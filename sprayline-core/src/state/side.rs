//! One side pattern

use core::task::Poll;

use sprayline_protocol::SideId;

use crate::hardware::{Context, Platform};
use crate::motion::{Sequence, SequenceOutcome};
use crate::painting::side_pattern;
use crate::traits::ActuatorIo;

use super::id::StateId;
use super::machine::{State, Transition};

/// Shared by all four sides; the machine selects the side before entry
#[derive(Debug)]
pub struct SideState {
    side: SideId,
    script: Sequence,
}

impl SideState {
    pub const fn new(side: SideId) -> Self {
        Self {
            side,
            script: Sequence::new(),
        }
    }

    pub fn select(&mut self, side: SideId) {
        self.side = side;
    }

    pub fn side(&self) -> SideId {
        self.side
    }
}

impl<P: Platform> State<P> for SideState {
    fn enter(&mut self, ctx: &mut Context<'_, P>) -> Transition {
        ctx.flags.active_painting = true;
        match side_pattern(self.side, ctx.settings) {
            Ok(script) => {
                self.script = script;
                Transition::Stay
            }
            Err(_) => Transition::To(StateId::Error),
        }
    }

    fn update(&mut self, ctx: &mut Context<'_, P>) -> Transition {
        let control = ctx.control();
        match self.script.poll(ctx.hw, control, ctx.now_ms) {
            Poll::Ready(SequenceOutcome::Completed) => Transition::SideComplete,
            Poll::Pending | Poll::Ready(SequenceOutcome::Aborted) => Transition::Stay,
        }
    }

    fn exit(&mut self, ctx: &mut Context<'_, P>) {
        ctx.flags.active_painting = false;
        ctx.hw.io.set_spray_valve(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::machine::{PRE_HOME_X_IN, PRE_HOME_Y_IN};
    use crate::motion::inches_to_steps;
    use crate::testing::{SimPlatform, TestRig};
    use crate::traits::MotorAxis;

    fn paint(rig: &mut TestRig, side: SideId) -> (Transition, SideState) {
        let mut state = SideState::new(side);
        State::<SimPlatform>::enter(&mut state, &mut rig.ctx());
        for _ in 0..200_000 {
            rig.tick();
            let t = State::<SimPlatform>::update(&mut state, &mut rig.ctx());
            if t != Transition::Stay {
                return (t, state);
            }
        }
        (Transition::Stay, state)
    }

    #[test]
    fn test_side_one_sprays_once_and_parks() {
        let mut rig = TestRig::new();
        let (t, mut state) = paint(&mut rig, SideId::One);
        assert_eq!(t, Transition::SideComplete);
        assert!(rig.flags.active_painting);

        assert_eq!(rig.hw.io.valve_openings(), 1);
        assert!(!rig.hw.io.spray_valve());
        assert!(rig.hw.io.pressurizer());
        assert_eq!(rig.hw.x.position(), inches_to_steps(PRE_HOME_X_IN));
        assert_eq!(rig.hw.y.position(), inches_to_steps(PRE_HOME_Y_IN));
        assert_eq!(rig.hw.z.position(), 0);

        State::<SimPlatform>::exit(&mut state, &mut rig.ctx());
        assert!(!rig.flags.active_painting);
    }

    #[test]
    fn test_side_two_opens_valve_per_sweep() {
        let mut rig = TestRig::new();
        let (t, _) = paint(&mut rig, SideId::Two);
        assert_eq!(t, Transition::SideComplete);
        // Five Y sweeps and the closing X pass
        assert_eq!(rig.hw.io.valve_openings(), 6);
        assert_eq!(rig.hw.rotation.position(), -999);
    }

    #[test]
    fn test_hold_button_pauses_pattern() {
        let mut rig = TestRig::new();
        let mut state = SideState::new(SideId::Three);
        State::<SimPlatform>::enter(&mut state, &mut rig.ctx());

        for _ in 0..100 {
            rig.tick();
            State::<SimPlatform>::update(&mut state, &mut rig.ctx());
        }

        rig.inputs.hold = true;
        for _ in 0..1_000 {
            rig.tick();
            State::<SimPlatform>::update(&mut state, &mut rig.ctx());
        }
        let held_at = state.script.position();
        for _ in 0..5_000 {
            rig.tick();
            assert_eq!(State::<SimPlatform>::update(&mut state, &mut rig.ctx()), Transition::Stay);
        }
        assert_eq!(state.script.position(), held_at);
        assert!(!rig.hw.any_running());

        rig.inputs.hold = false;
        let mut finished = false;
        for _ in 0..200_000 {
            rig.tick();
            let transition = State::<SimPlatform>::update(&mut state, &mut rig.ctx());
            if transition == Transition::SideComplete {
                finished = true;
                break;
            }
        }
        assert!(finished);
    }
}
