//! Gang-coupled axis pair
//!
//! The two Y motors drive opposite ends of the same gantry. Every command
//! goes to both, so the pair can be handed to anything that expects a
//! single [`MotorAxis`]. Homing is the one place the motors are addressed
//! individually, to square the gantry against its two switches.

use crate::traits::MotorAxis;

/// Two motors that always receive identical commands
#[derive(Debug)]
pub struct GangAxis<M> {
    left: M,
    right: M,
}

impl<M: MotorAxis> GangAxis<M> {
    pub fn new(left: M, right: M) -> Self {
        Self { left, right }
    }

    pub fn left(&self) -> &M {
        &self.left
    }

    pub fn right(&self) -> &M {
        &self.right
    }

    pub fn left_mut(&mut self) -> &mut M {
        &mut self.left
    }

    pub fn right_mut(&mut self) -> &mut M {
        &mut self.right
    }
}

impl<M: MotorAxis> MotorAxis for GangAxis<M> {
    fn set_speed_hz(&mut self, hz: u32) {
        self.left.set_speed_hz(hz);
        self.right.set_speed_hz(hz);
    }

    fn set_acceleration(&mut self, steps_per_s2: u32) {
        self.left.set_acceleration(steps_per_s2);
        self.right.set_acceleration(steps_per_s2);
    }

    fn move_to(&mut self, target: i32) {
        self.left.move_to(target);
        self.right.move_to(target);
    }

    fn run_forward(&mut self) {
        self.left.run_forward();
        self.right.run_forward();
    }

    fn run_backward(&mut self) {
        self.left.run_backward();
        self.right.run_backward();
    }

    fn is_running(&self) -> bool {
        self.left.is_running() || self.right.is_running()
    }

    /// Position of the left motor
    fn position(&self) -> i32 {
        self.left.position()
    }

    fn set_position(&mut self, steps: i32) {
        self.left.set_position(steps);
        self.right.set_position(steps);
    }

    fn force_stop_and_set_position(&mut self, steps: i32) {
        self.left.force_stop_and_set_position(steps);
        self.right.force_stop_and_set_position(steps);
    }

    fn force_stop(&mut self) {
        self.left.force_stop();
        self.right.force_stop();
    }

    fn poll(&mut self, now_ms: u32) {
        self.left.poll(now_ms);
        self.right.poll(now_ms);
    }
}
