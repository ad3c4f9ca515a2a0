//! Operator jogs and previews
//!
//! Each builder checks the travel limits first and returns a short script
//! for Idle to run. Positions are inches, angles degrees.

use sprayline_protocol::RotateDirection;

use crate::config::machine::{
    DEFAULT_ROT_SPEED, MANUAL_ROTATE_DEG, MANUAL_SERVO_SETTLE_MS, MANUAL_X_SPEED, MANUAL_Y_SPEED,
    MANUAL_Z_SPEED,
};
use crate::config::PnpSettings;
use crate::motion::{degrees_to_steps, inches_to_steps, MoveTo, Sequence, Step};
use crate::pnp::pick_location;
use crate::safety::{check_move, check_tool_angle, LimitViolation};

fn script(steps: &[Step]) -> Sequence {
    let mut seq = Sequence::new();
    for step in steps {
        // Manual scripts are at most two steps long
        let _ = seq.push(*step);
    }
    seq
}

/// `MANUAL_MOVE_TO`; an omitted Z keeps the current height
pub fn move_to(
    x: f32,
    y: f32,
    z: Option<f32>,
    tool_angle: Option<f32>,
) -> Result<Sequence, LimitViolation> {
    check_move(Some(x), Some(y), z)?;
    if let Some(angle) = tool_angle {
        check_tool_angle(angle)?;
    }

    let mut mv = MoveTo::new()
        .x(inches_to_steps(x), MANUAL_X_SPEED)
        .y(inches_to_steps(y), MANUAL_Y_SPEED);
    if let Some(z) = z {
        mv = mv.z(inches_to_steps(z), MANUAL_Z_SPEED);
    }

    Ok(match tool_angle {
        Some(angle) => script(&[Step::ToolAngle(angle), Step::Move(mv)]),
        None => script(&[Step::Move(mv)]),
    })
}

/// Quarter turn of the fixture; the tracked angle is restored afterwards
pub fn rotate(direction: RotateDirection) -> Sequence {
    let quarter = degrees_to_steps(MANUAL_ROTATE_DEG);
    let steps = match direction {
        RotateDirection::Clockwise => quarter,
        RotateDirection::CounterClockwise => -quarter,
    };
    script(&[Step::TurnFixture {
        steps,
        speed_hz: DEFAULT_ROT_SPEED,
    }])
}

pub fn goto_pick(pnp: &PnpSettings) -> Sequence {
    script(&[Step::Move(pick_location(pnp))])
}

pub fn z_preview(z: f32) -> Result<Sequence, LimitViolation> {
    check_move(None, None, Some(z))?;
    Ok(script(&[Step::Move(
        MoveTo::new().z(inches_to_steps(z), MANUAL_Z_SPEED),
    )]))
}

/// Servo preview, held long enough for the horn to get there
pub fn servo_preview(degrees: f32) -> Result<Sequence, LimitViolation> {
    check_tool_angle(degrees)?;
    Ok(script(&[
        Step::ToolAngle(degrees),
        Step::Wait(MANUAL_SERVO_SETTLE_MS),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_without_z_leaves_z_alone() {
        let seq = move_to(5.0, 6.0, None, None).unwrap();
        assert_eq!(seq.len(), 1);
        match seq.steps()[0] {
            Step::Move(mv) => {
                assert_eq!(mv.x.map(|t| t.steps), Some(1270));
                assert!(mv.z.is_none());
            }
            _ => panic!("expected a move"),
        }
    }

    #[test]
    fn test_limits_checked_before_anything_runs() {
        assert_eq!(move_to(36.0, 1.0, None, None).unwrap_err(), LimitViolation::X);
        assert_eq!(move_to(1.0, -0.1, None, None).unwrap_err(), LimitViolation::Y);
        assert_eq!(move_to(1.0, 1.0, Some(0.5), None).unwrap_err(), LimitViolation::Z);
        assert_eq!(
            move_to(1.0, 1.0, None, Some(181.0)).unwrap_err(),
            LimitViolation::ToolAngle
        );
        assert_eq!(z_preview(-3.0).unwrap_err(), LimitViolation::Z);
        assert_eq!(servo_preview(-1.0).unwrap_err(), LimitViolation::ToolAngle);
    }

    #[test]
    fn test_tool_angle_set_before_moving() {
        let seq = move_to(1.0, 1.0, Some(-1.0), Some(90.0)).unwrap();
        assert_eq!(seq.steps()[0], Step::ToolAngle(90.0));
    }

    #[test]
    fn test_rotation_direction() {
        let quarter = degrees_to_steps(90.0);
        assert_eq!(
            rotate(RotateDirection::CounterClockwise).steps()[0],
            Step::TurnFixture {
                steps: -quarter,
                speed_hz: DEFAULT_ROT_SPEED
            }
        );
    }
}
