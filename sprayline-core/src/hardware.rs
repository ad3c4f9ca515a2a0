//! Hardware bundle and per-tick context
//!
//! One [`Hardware`] value owns every axis, input and output of the machine.
//! States never hold on to it: each `enter`/`update`/`exit` call receives a
//! [`Context`] borrowing the bundle for the duration of the call, so only
//! the active state can issue motion or actuator commands.

use crate::config::Settings;
use crate::control::{Control, RuntimeFlags};
use crate::motion::{steps_to_degrees, steps_to_inches, GangAxis, SweepAxis};
use crate::traits::{
    ActuatorIo, DebouncedSwitch, MotorAxis, SwitchPolarity, Telemetry, TelemetryEvent,
};

/// Home switches close to the supply (read high when tripped)
pub const HOME_SWITCH_POLARITY: SwitchPolarity = SwitchPolarity::ActiveHigh;

/// Cycle-ready sensor and hold button pull the line low when active
pub const PANEL_INPUT_POLARITY: SwitchPolarity = SwitchPolarity::ActiveLow;

/// Concrete types of one board
///
/// Collapses the collaborator types into a single parameter so states and
/// controllers are generic over one thing.
pub trait Platform {
    type Axis: MotorAxis;
    type Switch: DebouncedSwitch;
    type Io: ActuatorIo;
    type Telemetry: Telemetry;
}

/// Linear axis motors with their own home switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinearAxis {
    X,
    YLeft,
    YRight,
    Z,
}

impl LinearAxis {
    pub const ALL: [LinearAxis; 4] = [
        LinearAxis::X,
        LinearAxis::YLeft,
        LinearAxis::YRight,
        LinearAxis::Z,
    ];

    pub fn index(self) -> usize {
        match self {
            LinearAxis::X => 0,
            LinearAxis::YLeft => 1,
            LinearAxis::YRight => 2,
            LinearAxis::Z => 3,
        }
    }
}

/// Every axis, input and output of the machine
pub struct Hardware<P: Platform> {
    pub x: P::Axis,
    pub y: GangAxis<P::Axis>,
    pub z: P::Axis,
    pub rotation: P::Axis,
    pub home_x: P::Switch,
    pub home_y_left: P::Switch,
    pub home_y_right: P::Switch,
    pub home_z: P::Switch,
    /// Part presented at the pick location
    pub cycle_sensor: P::Switch,
    /// Panel hold-to-continue button
    pub hold_button: P::Switch,
    pub io: P::Io,
}

impl<P: Platform> Hardware<P> {
    /// Advance step generators and sample every input
    pub fn poll(&mut self, now_ms: u32) {
        self.x.poll(now_ms);
        self.y.poll(now_ms);
        self.z.poll(now_ms);
        self.rotation.poll(now_ms);

        self.home_x.update(now_ms);
        self.home_y_left.update(now_ms);
        self.home_y_right.update(now_ms);
        self.home_z.update(now_ms);
        self.cycle_sensor.update(now_ms);
        self.hold_button.update(now_ms);
    }

    pub fn any_running(&self) -> bool {
        self.x.is_running()
            || self.y.is_running()
            || self.z.is_running()
            || self.rotation.is_running()
    }

    /// Stop every axis where it stands
    pub fn force_stop_all(&mut self) {
        self.x.force_stop();
        self.y.force_stop();
        self.z.force_stop();
        self.rotation.force_stop();
    }

    /// Stop all motion and de-energize every output
    pub fn fail_safe(&mut self) {
        self.force_stop_all();
        self.io.all_off();
    }

    pub fn hold_pressed(&self) -> bool {
        PANEL_INPUT_POLARITY.is_active(self.hold_button.read())
    }

    /// Cycle-ready sensor just asserted
    pub fn part_presented(&self) -> bool {
        self.cycle_sensor.fell()
    }

    pub fn linear_axis(&mut self, axis: LinearAxis) -> &mut P::Axis {
        match axis {
            LinearAxis::X => &mut self.x,
            LinearAxis::YLeft => self.y.left_mut(),
            LinearAxis::YRight => self.y.right_mut(),
            LinearAxis::Z => &mut self.z,
        }
    }

    pub fn home_switch_active(&self, axis: LinearAxis) -> bool {
        let switch = match axis {
            LinearAxis::X => &self.home_x,
            LinearAxis::YLeft => &self.home_y_left,
            LinearAxis::YRight => &self.home_y_right,
            LinearAxis::Z => &self.home_z,
        };
        HOME_SWITCH_POLARITY.is_active(switch.read())
    }

    /// Split borrow of a sweep axis and the actuator bank
    pub fn axis_and_io(&mut self, axis: SweepAxis) -> (&mut dyn MotorAxis, &mut P::Io) {
        match axis {
            SweepAxis::X => (&mut self.x, &mut self.io),
            SweepAxis::Y => (&mut self.y, &mut self.io),
        }
    }

    /// Position report in operator units
    pub fn position_event(&self) -> TelemetryEvent {
        TelemetryEvent::Position {
            x: steps_to_inches(self.x.position()),
            y: steps_to_inches(self.y.position()),
            z: steps_to_inches(self.z.position()),
            rotation: steps_to_degrees(self.rotation.position()),
        }
    }
}

/// Everything a state may touch during one call
pub struct Context<'a, P: Platform> {
    pub hw: &'a mut Hardware<P>,
    pub settings: &'a Settings,
    pub flags: &'a mut RuntimeFlags,
    pub telemetry: &'a mut P::Telemetry,
    pub now_ms: u32,
}

impl<P: Platform> Context<'_, P> {
    /// Cancellation token for this tick
    pub fn control(&self) -> Control {
        self.flags.control(self.hw.hold_pressed())
    }

    pub fn emit(&mut self, event: TelemetryEvent) {
        self.telemetry.emit(event);
    }
}
