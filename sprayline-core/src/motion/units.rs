//! Unit conversion between operator units and motor steps
//!
//! Conversions to steps truncate toward zero.

use crate::config::machine::{STEPS_PER_DEGREE, STEPS_PER_INCH};

pub fn inches_to_steps(inches: f32) -> i32 {
    (inches * STEPS_PER_INCH) as i32
}

pub fn steps_to_inches(steps: i32) -> f32 {
    steps as f32 / STEPS_PER_INCH
}

pub fn degrees_to_steps(degrees: f32) -> i32 {
    (degrees * STEPS_PER_DEGREE) as i32
}

pub fn steps_to_degrees(steps: i32) -> f32 {
    steps as f32 / STEPS_PER_DEGREE
}

/// Speed scaled by a factor, never below 1 Hz
pub fn scaled_speed(hz: u32, factor: f32) -> u32 {
    ((hz as f32 * factor) as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inches_truncate() {
        assert_eq!(inches_to_steps(1.0), 254);
        assert_eq!(inches_to_steps(0.2), 50);
        assert_eq!(inches_to_steps(0.3), 76);
        assert_eq!(inches_to_steps(-1.75), -444);
    }

    #[test]
    fn test_degrees() {
        assert_eq!(degrees_to_steps(90.0), 999);
        assert_eq!(degrees_to_steps(-90.0), -999);
        assert!((steps_to_degrees(1000) - 90.0).abs() < 0.01);
    }

    #[test]
    fn test_scaled_speed_floor() {
        assert_eq!(scaled_speed(20_000, 0.75), 15_000);
        assert_eq!(scaled_speed(1, 0.5), 1);
    }
}
