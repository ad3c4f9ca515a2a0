//! Gun cleaning routine
//!
//! Drives the nozzle into the cleaning station, gives one short burst and
//! returns to the origin. When a paint-all-sides run is about to start,
//! the fixture is turned to Side 4 first so painting can begin at once.

use core::task::Poll;

use sprayline_protocol::SideId;

use crate::config::machine::{
    CLEAN_PRESSURIZE_MS, CLEAN_SPRAY_MS, CLEAN_SPRAY_SHORT_MS, CLEAN_TOOL_ANGLE, CLEAN_X_IN,
    CLEAN_X_SPEED, CLEAN_Y_IN, CLEAN_Y_SPEED, CLEAN_Z_IN, CLEAN_Z_SPEED, DEFAULT_ROT_SPEED,
};
use crate::config::Settings;
use crate::hardware::{Context, Platform};
use crate::motion::{
    degrees_to_steps, inches_to_steps, MoveTo, Sequence, SequenceFull, SequenceOutcome, Step,
};
use crate::safety::clamp_z;
use crate::traits::ActuatorIo;

use super::id::StateId;
use super::machine::{State, Transition};

/// Cleaning script
pub fn cleaning_script(
    settings: &Settings,
    turn_to_side_four: bool,
    short: bool,
) -> Result<Sequence, SequenceFull> {
    let mut seq = Sequence::new();
    if turn_to_side_four {
        let angle = settings.side(SideId::Four).rotation_angle;
        seq.push(Step::Move(
            MoveTo::new().rotation(degrees_to_steps(angle), DEFAULT_ROT_SPEED),
        ))?;
    }
    seq.push(Step::ToolAngle(CLEAN_TOOL_ANGLE))?;
    seq.push(Step::Pressurizer(true))?;
    seq.push(Step::Wait(CLEAN_PRESSURIZE_MS))?;
    seq.push(Step::Move(
        MoveTo::new()
            .x(inches_to_steps(CLEAN_X_IN), CLEAN_X_SPEED)
            .y(inches_to_steps(CLEAN_Y_IN), CLEAN_Y_SPEED)
            .z(inches_to_steps(clamp_z(CLEAN_Z_IN)), CLEAN_Z_SPEED),
    ))?;
    seq.push(Step::SprayValve(true))?;
    seq.push(Step::Wait(if short {
        CLEAN_SPRAY_SHORT_MS
    } else {
        CLEAN_SPRAY_MS
    }))?;
    seq.push(Step::SprayValve(false))?;
    seq.push(Step::Move(MoveTo::new().z(0, CLEAN_Z_SPEED)))?;
    seq.push(Step::Move(
        MoveTo::new()
            .x(0, CLEAN_X_SPEED)
            .y(0, CLEAN_Y_SPEED)
            .z(0, CLEAN_Z_SPEED),
    ))?;
    Ok(seq)
}

#[derive(Debug, Default)]
pub struct CleaningState {
    script: Sequence,
}

impl CleaningState {
    pub const fn new() -> Self {
        Self {
            script: Sequence::new(),
        }
    }
}

impl<P: Platform> State<P> for CleaningState {
    fn enter(&mut self, ctx: &mut Context<'_, P>) -> Transition {
        let turn = ctx.flags.transitioning_to_paint_all_sides;
        match cleaning_script(ctx.settings, turn, ctx.flags.short_clean) {
            Ok(script) => {
                self.script = script;
                Transition::Stay
            }
            Err(SequenceFull) => Transition::To(StateId::Error),
        }
    }

    fn update(&mut self, ctx: &mut Context<'_, P>) -> Transition {
        let control = ctx.control();
        match self.script.poll(ctx.hw, control, ctx.now_ms) {
            Poll::Ready(SequenceOutcome::Completed) => Transition::next_or_idle(ctx.flags),
            Poll::Pending | Poll::Ready(SequenceOutcome::Aborted) => Transition::Stay,
        }
    }

    fn exit(&mut self, ctx: &mut Context<'_, P>) {
        ctx.hw.io.set_spray_valve(false);
        ctx.hw.io.set_pressurizer(false);
        ctx.flags.short_clean = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{SimPlatform, TestRig};
    use crate::traits::MotorAxis;

    fn clean(rig: &mut TestRig) -> (Transition, u32) {
        let mut state = CleaningState::new();
        State::<SimPlatform>::enter(&mut state, &mut rig.ctx());
        let mut deepest = 0;
        for _ in 0..60_000 {
            rig.tick();
            deepest = deepest.min(rig.hw.z.position());
            let t = State::<SimPlatform>::update(&mut state, &mut rig.ctx());
            if t != Transition::Stay {
                State::<SimPlatform>::exit(&mut state, &mut rig.ctx());
                return (t, deepest.unsigned_abs());
            }
        }
        (Transition::Stay, 0)
    }

    #[test]
    fn test_burst_at_station_then_origin() {
        let mut rig = TestRig::new();
        let (t, depth) = clean(&mut rig);

        assert_eq!(t, Transition::To(StateId::Idle));
        // Clamped to the Z travel limit
        assert_eq!(depth, inches_to_steps(2.75).unsigned_abs());

        let on = rig.hw.io.valve_on_at().unwrap();
        let off = rig.hw.io.valve_off_at().unwrap();
        assert_eq!(off - on, CLEAN_SPRAY_MS);
        assert_eq!(rig.hw.x.position(), 0);
        assert_eq!(rig.hw.z.position(), 0);
        assert!(!rig.hw.io.pressurizer());
        assert_eq!(rig.hw.io.tool_angle, CLEAN_TOOL_ANGLE);
    }

    #[test]
    fn test_short_burst_and_override() {
        let mut rig = TestRig::new();
        rig.flags.short_clean = true;
        rig.flags.next_state_override = Some(StateId::Painting);

        let (t, _) = clean(&mut rig);
        assert_eq!(t, Transition::To(StateId::Painting));
        let on = rig.hw.io.valve_on_at().unwrap();
        let off = rig.hw.io.valve_off_at().unwrap();
        assert_eq!(off - on, CLEAN_SPRAY_SHORT_MS);
        assert!(!rig.flags.short_clean);
    }

    #[test]
    fn test_turns_to_side_four_before_painting() {
        let settings = Settings::default();
        let seq = cleaning_script(&settings, true, false).unwrap();
        let angle = degrees_to_steps(settings.side(SideId::Four).rotation_angle);
        assert_eq!(
            seq.steps()[0],
            Step::Move(MoveTo::new().rotation(angle, DEFAULT_ROT_SPEED))
        );
        assert_eq!(cleaning_script(&settings, false, false).unwrap().len(), seq.len() - 1);
    }
}
