//! Coordinated point-to-point moves
//!
//! A [`MoveTo`] starts every named axis at once with its own speed; the
//! move is done when all of them have stopped. Omitted axes stay put.

use crate::hardware::{Hardware, Platform};
use crate::traits::MotorAxis;

/// Target and cruise speed for one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisTarget {
    pub steps: i32,
    pub speed_hz: u32,
}

/// Absolute move of any subset of X, Y (gang), Z and rotation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MoveTo {
    pub x: Option<AxisTarget>,
    pub y: Option<AxisTarget>,
    pub z: Option<AxisTarget>,
    pub rotation: Option<AxisTarget>,
}

impl MoveTo {
    pub const fn new() -> Self {
        Self {
            x: None,
            y: None,
            z: None,
            rotation: None,
        }
    }

    /// X, Y and Z together
    pub const fn xyz(x: AxisTarget, y: AxisTarget, z: AxisTarget) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
            rotation: None,
        }
    }

    pub const fn x(mut self, steps: i32, speed_hz: u32) -> Self {
        self.x = Some(AxisTarget { steps, speed_hz });
        self
    }

    pub const fn y(mut self, steps: i32, speed_hz: u32) -> Self {
        self.y = Some(AxisTarget { steps, speed_hz });
        self
    }

    pub const fn z(mut self, steps: i32, speed_hz: u32) -> Self {
        self.z = Some(AxisTarget { steps, speed_hz });
        self
    }

    pub const fn rotation(mut self, steps: i32, speed_hz: u32) -> Self {
        self.rotation = Some(AxisTarget { steps, speed_hz });
        self
    }

    /// Issue the move to every named axis
    pub fn start<P: Platform>(&self, hw: &mut Hardware<P>) {
        issue(&mut hw.x, self.x);
        issue(&mut hw.y, self.y);
        issue(&mut hw.z, self.z);
        issue(&mut hw.rotation, self.rotation);
    }
}

fn issue<A: MotorAxis + ?Sized>(axis: &mut A, target: Option<AxisTarget>) {
    if let Some(t) = target {
        axis.set_speed_hz(t.speed_hz);
        axis.move_to(t.steps);
    }
}
