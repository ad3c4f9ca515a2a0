//! Motion primitives
//!
//! Everything here is poll-driven: `start` issues commands, `poll` is called
//! once per controller tick and returns `Poll::Ready` with an outcome once
//! the motion has physically finished or given up.

pub mod gang;
pub mod homing;
pub mod moves;
pub mod ramp;
pub mod sequence;
pub mod sync;
pub mod units;

pub use gang::GangAxis;
pub use homing::{HomingController, HomingFailure, HomingReport};
pub use moves::{AxisTarget, MoveTo};
pub use ramp::RampProfile;
pub use sequence::{Sequence, SequenceFull, SequenceOutcome, Step, MAX_STEPS};
pub use sync::{Gate, GateMode, MotionSynchronizer, Sweep, SweepAxis, SweepOutcome};
pub use units::{degrees_to_steps, inches_to_steps, scaled_speed, steps_to_degrees, steps_to_inches};
