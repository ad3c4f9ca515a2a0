//! Hardware abstraction traits
//!
//! These traits define the interface between the sequencing logic and the
//! board-specific implementations of axes, inputs, outputs and the console.

pub mod actuator;
pub mod axis;
pub mod switch;
pub mod telemetry;

pub use actuator::ActuatorIo;
pub use axis::MotorAxis;
pub use switch::{DebouncedSwitch, SwitchPolarity};
pub use telemetry::{CommandSource, Telemetry, TelemetryEvent};
