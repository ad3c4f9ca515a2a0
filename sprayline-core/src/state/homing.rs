//! Homing state

use core::task::Poll;

use crate::hardware::{Context, Platform};
use crate::motion::HomingController;
use crate::traits::TelemetryEvent;

use super::machine::{State, Transition};

/// Runs the homing sequence, then hands over to Idle
#[derive(Debug, Default)]
pub struct HomingState {
    homing: HomingController,
}

impl HomingState {
    pub const fn new() -> Self {
        Self {
            homing: HomingController::new(),
        }
    }
}

impl<P: Platform> State<P> for HomingState {
    fn enter(&mut self, ctx: &mut Context<'_, P>) -> Transition {
        ctx.flags.clear_abort();
        self.homing.start(ctx.hw, ctx.now_ms);
        Transition::Stay
    }

    fn update(&mut self, ctx: &mut Context<'_, P>) -> Transition {
        // Already on the way home
        if ctx.flags.abort_requested() {
            ctx.flags.clear_abort();
        }

        match self.homing.poll(ctx.hw, ctx.now_ms) {
            Poll::Pending => Transition::Stay,
            Poll::Ready(report) => {
                ctx.emit(TelemetryEvent::HomingFinished {
                    failure: report.failure,
                });
                let position = ctx.hw.position_event();
                ctx.emit(position);
                Transition::next_or_idle(ctx.flags)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::LinearAxis;
    use crate::motion::HomingFailure;
    use crate::state::StateId;
    use crate::testing::{SimPlatform, TestRig};

    fn run(rig: &mut TestRig, state: &mut HomingState) -> Transition {
        State::<SimPlatform>::enter(state, &mut rig.ctx());
        for _ in 0..60_000 {
            rig.tick();
            let t = State::<SimPlatform>::update(state, &mut rig.ctx());
            if t != Transition::Stay {
                return t;
            }
        }
        Transition::Stay
    }

    #[test]
    fn test_success_goes_idle() {
        let mut rig = TestRig::new();
        let mut state = HomingState::new();
        assert_eq!(run(&mut rig, &mut state), Transition::To(StateId::Idle));
        assert!(rig
            .telemetry
            .contains(&TelemetryEvent::HomingFinished { failure: None }));
    }

    #[test]
    fn test_override_wins() {
        let mut rig = TestRig::new();
        rig.flags.next_state_override = Some(StateId::Cleaning);
        let mut state = HomingState::new();
        assert_eq!(run(&mut rig, &mut state), Transition::To(StateId::Cleaning));
        assert_eq!(rig.flags.next_state_override, None);
    }

    #[test]
    fn test_failure_still_ends_in_idle() {
        let mut rig = TestRig::new();
        rig.place(LinearAxis::X, 400);
        rig.disconnect_switch(LinearAxis::X);
        let mut state = HomingState::new();

        assert_eq!(run(&mut rig, &mut state), Transition::To(StateId::Idle));
        assert!(rig.telemetry.contains(&TelemetryEvent::HomingFinished {
            failure: Some(HomingFailure::SwitchTimeout)
        }));
    }

    #[test]
    fn test_abort_while_homing_is_swallowed() {
        let mut rig = TestRig::new();
        let mut state = HomingState::new();
        rig.flags.soft_abort = true;
        State::<SimPlatform>::enter(&mut state, &mut rig.ctx());
        assert!(!rig.flags.abort_requested());

        rig.flags.hard_abort = true;
        rig.tick();
        State::<SimPlatform>::update(&mut state, &mut rig.ctx());
        assert!(!rig.flags.abort_requested());
    }
}
