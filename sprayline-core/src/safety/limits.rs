//! Travel limits

use crate::config::machine::{
    TOOL_ANGLE_MAX, TOOL_ANGLE_MIN, X_MAX_IN, X_MIN_IN, Y_MAX_IN, Y_MIN_IN, Z_MAX_IN, Z_MIN_IN,
};

/// Requested position outside the machine's travel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LimitViolation {
    X,
    Y,
    Z,
    ToolAngle,
}

impl LimitViolation {
    pub fn reason(self) -> &'static str {
        match self {
            LimitViolation::X => "X out of range",
            LimitViolation::Y => "Y out of range",
            LimitViolation::Z => "Z out of range",
            LimitViolation::ToolAngle => "Servo angle out of range",
        }
    }
}

fn within(value: f32, min: f32, max: f32, violation: LimitViolation) -> Result<(), LimitViolation> {
    // NaN fails both comparisons
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(violation)
    }
}

/// Check a manual target (inches); `None` axes are left where they are
pub fn check_move(x: Option<f32>, y: Option<f32>, z: Option<f32>) -> Result<(), LimitViolation> {
    if let Some(x) = x {
        within(x, X_MIN_IN, X_MAX_IN, LimitViolation::X)?;
    }
    if let Some(y) = y {
        within(y, Y_MIN_IN, Y_MAX_IN, LimitViolation::Y)?;
    }
    if let Some(z) = z {
        within(z, Z_MIN_IN, Z_MAX_IN, LimitViolation::Z)?;
    }
    Ok(())
}

pub fn check_tool_angle(degrees: f32) -> Result<(), LimitViolation> {
    within(degrees, TOOL_ANGLE_MIN, TOOL_ANGLE_MAX, LimitViolation::ToolAngle)
}

/// Clamp a Z height into the travel range
pub fn clamp_z(z: f32) -> f32 {
    z.clamp(Z_MIN_IN, Z_MAX_IN)
}
