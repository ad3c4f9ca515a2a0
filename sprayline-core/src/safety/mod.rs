//! Travel and output limits
//!
//! Manual moves and previews are checked here before anything moves.

pub mod limits;

pub use limits::{check_move, check_tool_angle, clamp_z, LimitViolation};
