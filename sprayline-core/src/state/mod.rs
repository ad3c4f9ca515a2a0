//! State machine for program execution
//!
//! One long-lived object per state, owned by [`StateMachine`]. Every
//! state is generic over the board through [`Platform`](crate::hardware::Platform)
//! and touches hardware only through the [`Context`](crate::hardware::Context)
//! it is handed.

pub mod cleaning;
pub mod error;
pub mod homing;
pub mod id;
pub mod idle;
pub mod inspect;
pub mod machine;
pub mod painting;
pub mod paused;
pub mod pnp;
pub mod side;

pub use id::StateId;
pub use machine::{State, StateMachine, Transition};
