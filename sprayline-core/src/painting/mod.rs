//! Painting scripts
//!
//! The side patterns plus the short scripts the paint-all-sides sequencer
//! runs around them.

pub mod patterns;

pub use patterns::side_pattern;

use crate::config::machine::{
    DEFAULT_X_SPEED, DEFAULT_Y_SPEED, DEFAULT_Z_SPEED, INTER_COAT_PARK_X_IN,
    MIN_INTER_COAT_DELAY_MS, PREPARE_SETTLE_MS, PRE_HOME_X_IN, PRE_HOME_Y_IN, REPRESSURIZE_MS,
    TOOL_PARK_ANGLE,
};
use crate::motion::{inches_to_steps, MoveTo, Sequence, SequenceFull, Step};

/// Before the first side of a run
pub fn prepare() -> Result<Sequence, SequenceFull> {
    let mut seq = Sequence::new();
    seq.push(Step::ToolAngle(0.0))?;
    seq.push(Step::SprayValve(false))?;
    seq.push(Step::Wait(PREPARE_SETTLE_MS))?;
    Ok(seq)
}

/// After the four sides of a coat; the pot may have been switched off
pub fn after_coat() -> Result<Sequence, SequenceFull> {
    let mut seq = Sequence::new();
    seq.push(Step::PressurizeIfOff(REPRESSURIZE_MS))?;
    Ok(seq)
}

/// Inter-coat wait
///
/// The carriage parks at the far end and crawls back to X = 0 over the
/// delay, so the operator can see how long is left.
pub fn between_coats(delay_s: u16) -> Result<Sequence, SequenceFull> {
    let park = inches_to_steps(INTER_COAT_PARK_X_IN);
    let delay_ms = delay_s as u32 * 1_000;

    let mut seq = Sequence::new();
    seq.push(Step::ToolAngle(TOOL_PARK_ANGLE))?;
    seq.push(Step::Move(MoveTo::new().x(park, DEFAULT_X_SPEED)))?;
    if delay_ms < MIN_INTER_COAT_DELAY_MS {
        seq.push(Step::Wait(delay_ms))?;
    } else {
        let speed = (park.unsigned_abs() / delay_s as u32).max(1);
        seq.push(Step::Move(MoveTo::new().x(0, speed)))?;
    }
    Ok(seq)
}

/// End of a paint-all-sides run, before homing
pub fn finish(post_print_pause_ms: u32) -> Result<Sequence, SequenceFull> {
    let mut seq = Sequence::new();
    seq.push(Step::Pressurizer(false))?;
    if post_print_pause_ms > 0 {
        seq.push(Step::Wait(post_print_pause_ms))?;
    }
    seq.push(Step::Move(
        MoveTo::new()
            .x(inches_to_steps(PRE_HOME_X_IN), DEFAULT_X_SPEED)
            .y(inches_to_steps(PRE_HOME_Y_IN), DEFAULT_Y_SPEED)
            .z(0, DEFAULT_Z_SPEED),
    ))?;
    Ok(seq)
}
