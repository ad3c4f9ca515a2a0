//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in sprayline-core over `embedded-hal` 1.0:
//!
//! - Debounced switch inputs (home switches, cycle sensor, hold button)
//! - Solenoid outputs and the tool servo

#![no_std]
#![deny(unsafe_code)]

pub mod actuator;
pub mod switch;

pub use actuator::{GpioActuators, ToolServo};
pub use switch::Debouncer;
