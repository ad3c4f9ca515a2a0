//! Board-agnostic core logic for the Sprayline painting machine
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (motor axis, switches, actuators, telemetry)
//! - The operation state machine and the controller that drives it
//! - Homing, paint-while-moving sweeps and coordinated moves
//! - Side patterns and the paint-all-sides sequencer
//! - Pick-and-place cycle
//! - Travel limits and settings

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod control;
pub mod controller;
pub mod hardware;
pub mod manual;
pub mod motion;
pub mod painting;
pub mod pnp;
pub mod safety;
pub mod state;
pub mod traits;

#[cfg(test)]
mod testing;
