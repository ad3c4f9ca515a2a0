//! Host simulation of the machine
//!
//! Axes integrate their ramp against a millisecond clock, home switches
//! follow the physical carriage position and every output change is
//! recorded with its timestamp.

use heapless::{Deque, Vec};
use sprayline_protocol::Command;

use crate::config::Settings;
use crate::control::RuntimeFlags;
use crate::controller::{Controller, TickReport};
use crate::hardware::{Context, Hardware, LinearAxis, Platform, HOME_SWITCH_POLARITY};
use crate::motion::{GangAxis, RampProfile};
use crate::state::StateId;
use crate::traits::{
    ActuatorIo, CommandSource, DebouncedSwitch, MotorAxis, SwitchPolarity, Telemetry,
    TelemetryEvent,
};

/// Stepper with a flat (instant) speed profile unless told otherwise
///
/// `physical()` is where the carriage really is; the logical position is
/// what the controller believes and diverges after `set_position`.
#[derive(Debug, Clone)]
pub struct SimAxis {
    ramp: RampProfile,
    offset: i32,
    speed_hz: u32,
    last_ms: u32,
    seen: Option<(i32, i32)>,
    targets: Vec<i32, 64>,
}

impl Default for SimAxis {
    fn default() -> Self {
        Self::new()
    }
}

impl SimAxis {
    pub fn new() -> Self {
        let mut ramp = RampProfile::new();
        ramp.set_acceleration(0);
        Self {
            ramp,
            offset: 0,
            speed_hz: 1_000,
            last_ms: 0,
            seen: None,
            targets: Vec::new(),
        }
    }

    pub fn speed_hz(&self) -> u32 {
        self.speed_hz
    }

    pub fn physical(&self) -> i32 {
        self.ramp.position() + self.offset
    }

    /// Move the carriage by hand, leaving the logical position alone
    pub fn place(&mut self, physical: i32) {
        self.offset = physical - self.ramp.position();
    }

    /// Highest logical position reached by motion
    pub fn max_position_seen(&self) -> i32 {
        self.seen.map_or(self.position(), |(_, max)| max)
    }

    /// Lowest logical position reached by motion
    pub fn min_position_seen(&self) -> i32 {
        self.seen.map_or(self.position(), |(min, _)| min)
    }

    /// A move to `target` was commanded at some point
    pub fn was_sent_to(&self, target: i32) -> bool {
        self.targets.contains(&target)
    }
}

impl MotorAxis for SimAxis {
    fn set_speed_hz(&mut self, hz: u32) {
        self.speed_hz = hz;
        self.ramp.set_max_speed(hz);
    }

    fn set_acceleration(&mut self, steps_per_s2: u32) {
        self.ramp.set_acceleration(steps_per_s2);
    }

    fn move_to(&mut self, target: i32) {
        if !self.targets.contains(&target) {
            let _ = self.targets.push(target);
        }
        self.ramp.move_to(target);
    }

    fn run_forward(&mut self) {
        self.ramp.run(true);
    }

    fn run_backward(&mut self) {
        self.ramp.run(false);
    }

    fn is_running(&self) -> bool {
        self.ramp.is_running()
    }

    fn position(&self) -> i32 {
        self.ramp.position()
    }

    fn set_position(&mut self, steps: i32) {
        let physical = self.physical();
        self.ramp.set_position(steps);
        self.offset = physical - steps;
    }

    fn force_stop_and_set_position(&mut self, steps: i32) {
        self.ramp.stop_now();
        self.set_position(steps);
    }

    fn poll(&mut self, now_ms: u32) {
        let delta = now_ms.wrapping_sub(self.last_ms);
        self.last_ms = now_ms;
        if self.ramp.update(delta) != 0 {
            let p = self.ramp.position();
            self.seen = Some(match self.seen {
                Some((min, max)) => (min.min(p), max.max(p)),
                None => (p, p),
            });
        }
    }
}

/// Input whose level is set by the test; stable immediately
#[derive(Debug, Clone, Default)]
pub struct ScriptedSwitch {
    level: bool,
    stable: bool,
    rose: bool,
    fell: bool,
}

impl ScriptedSwitch {
    pub fn new(level: bool) -> Self {
        Self {
            level,
            stable: level,
            rose: false,
            fell: false,
        }
    }

    pub fn set_level(&mut self, high: bool) {
        self.level = high;
    }
}

impl DebouncedSwitch for ScriptedSwitch {
    fn update(&mut self, _now_ms: u32) -> bool {
        let changed = self.level != self.stable;
        self.rose = changed && self.level;
        self.fell = changed && !self.level;
        self.stable = self.level;
        changed
    }

    fn read(&self) -> bool {
        self.stable
    }

    fn rose(&self) -> bool {
        self.rose
    }

    fn fell(&self) -> bool {
        self.fell
    }
}

/// Actuator bank that keeps a timestamped log of spray valve changes
#[derive(Debug, Clone, Default)]
pub struct RecordingIo {
    /// Stamped onto log entries
    pub now_ms: u32,
    pub tool_angle: f32,
    pub valve_log: Vec<(u32, bool), 256>,
    spray_valve: bool,
    pressurizer: bool,
    vacuum: bool,
    pick_cylinder: bool,
}

impl RecordingIo {
    /// First time the valve opened
    pub fn valve_on_at(&self) -> Option<u32> {
        self.valve_log.iter().find(|&&(_, on)| on).map(|&(t, _)| t)
    }

    /// First time the valve closed after opening
    pub fn valve_off_at(&self) -> Option<u32> {
        let opened = self.valve_log.iter().position(|&(_, on)| on)?;
        self.valve_log[opened..]
            .iter()
            .find(|&&(_, on)| !on)
            .map(|&(t, _)| t)
    }

    /// Number of times the valve opened
    pub fn valve_openings(&self) -> usize {
        self.valve_log.iter().filter(|&&(_, on)| on).count()
    }
}

impl ActuatorIo for RecordingIo {
    fn set_spray_valve(&mut self, on: bool) {
        if on != self.spray_valve {
            let _ = self.valve_log.push((self.now_ms, on));
        }
        self.spray_valve = on;
    }

    fn set_pressurizer(&mut self, on: bool) {
        self.pressurizer = on;
    }

    fn set_vacuum(&mut self, on: bool) {
        self.vacuum = on;
    }

    fn set_pick_cylinder(&mut self, extended: bool) {
        self.pick_cylinder = extended;
    }

    fn set_tool_angle(&mut self, degrees: f32) {
        self.tool_angle = degrees;
    }

    fn spray_valve(&self) -> bool {
        self.spray_valve
    }

    fn pressurizer(&self) -> bool {
        self.pressurizer
    }

    fn vacuum(&self) -> bool {
        self.vacuum
    }

    fn pick_cylinder(&self) -> bool {
        self.pick_cylinder
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingTelemetry {
    pub events: Vec<TelemetryEvent, 512>,
    /// Reported free space; unlimited when `None`
    pub room: Option<usize>,
}

impl RecordingTelemetry {
    pub fn contains(&self, event: &TelemetryEvent) -> bool {
        self.events.contains(event)
    }

    pub fn count(&self, event: &TelemetryEvent) -> usize {
        self.events.iter().filter(|e| *e == event).count()
    }

    /// Every state entered, in order
    pub fn states(&self) -> Vec<StateId, 256> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TelemetryEvent::StateChanged(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Telemetry for RecordingTelemetry {
    fn emit(&mut self, event: TelemetryEvent) {
        let _ = self.events.push(event);
    }

    fn room(&self) -> usize {
        self.room.unwrap_or(usize::MAX)
    }
}

#[derive(Debug)]
pub struct SimPlatform;

impl Platform for SimPlatform {
    type Axis = SimAxis;
    type Switch = ScriptedSwitch;
    type Io = RecordingIo;
    type Telemetry = RecordingTelemetry;
}

pub fn sim_hardware() -> Hardware<SimPlatform> {
    Hardware {
        x: SimAxis::new(),
        y: GangAxis::new(SimAxis::new(), SimAxis::new()),
        z: SimAxis::new(),
        rotation: SimAxis::new(),
        home_x: ScriptedSwitch::default(),
        home_y_left: ScriptedSwitch::default(),
        home_y_right: ScriptedSwitch::default(),
        home_z: ScriptedSwitch::default(),
        cycle_sensor: ScriptedSwitch::new(true),
        hold_button: ScriptedSwitch::new(true),
        io: RecordingIo::default(),
    }
}

/// What the outside world is doing to the inputs
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    disconnected: [bool; 4],
    pub part_present: bool,
    pub hold: bool,
}

impl Inputs {
    /// Drive every input level from the simulated world
    pub fn apply(&self, hw: &mut Hardware<SimPlatform>) {
        for axis in LinearAxis::ALL {
            let physical = hw.linear_axis(axis).physical();
            let tripped = !self.disconnected[axis.index()]
                && match axis {
                    LinearAxis::Z => physical >= 0,
                    _ => physical <= 0,
                };
            let level = tripped == (HOME_SWITCH_POLARITY == SwitchPolarity::ActiveHigh);
            let switch = match axis {
                LinearAxis::X => &mut hw.home_x,
                LinearAxis::YLeft => &mut hw.home_y_left,
                LinearAxis::YRight => &mut hw.home_y_right,
                LinearAxis::Z => &mut hw.home_z,
            };
            switch.set_level(level);
        }
        // Panel inputs pull low when active
        hw.cycle_sensor.set_level(!self.part_present);
        hw.hold_button.set_level(!self.hold);
    }

    fn advance(&self, hw: &mut Hardware<SimPlatform>, now_ms: u32) {
        hw.x.poll(now_ms);
        hw.y.poll(now_ms);
        hw.z.poll(now_ms);
        hw.rotation.poll(now_ms);
        self.apply(hw);
        hw.io.now_ms = now_ms;
    }
}

/// Hardware plus the shared state one component needs
pub struct TestRig {
    pub hw: Hardware<SimPlatform>,
    pub now: u32,
    pub settings: Settings,
    pub flags: RuntimeFlags,
    pub telemetry: RecordingTelemetry,
    pub inputs: Inputs,
}

impl TestRig {
    pub fn new() -> Self {
        let mut hw = sim_hardware();
        let inputs = Inputs::default();
        inputs.apply(&mut hw);
        hw.poll(0);
        Self {
            hw,
            now: 0,
            settings: Settings::default(),
            flags: RuntimeFlags::new(),
            telemetry: RecordingTelemetry::default(),
            inputs,
        }
    }

    /// Advance the world by one millisecond
    pub fn tick(&mut self) {
        self.now += 1;
        self.inputs.advance(&mut self.hw, self.now);
        self.hw.poll(self.now);
    }

    pub fn place(&mut self, axis: LinearAxis, physical: i32) {
        self.hw.linear_axis(axis).place(physical);
        self.inputs.apply(&mut self.hw);
        self.hw.poll(self.now);
    }

    pub fn disconnect_switch(&mut self, axis: LinearAxis) {
        self.inputs.disconnected[axis.index()] = true;
    }

    pub fn present_part(&mut self, present: bool) {
        self.inputs.part_present = present;
    }

    /// Tick until every axis has stopped
    pub fn run_until_still(&mut self, max_ms: u32) {
        let until = self.now + max_ms;
        while self.hw.any_running() && self.now < until {
            self.tick();
        }
    }

    pub fn ctx(&mut self) -> Context<'_, SimPlatform> {
        Context {
            hw: &mut self.hw,
            settings: &self.settings,
            flags: &mut self.flags,
            telemetry: &mut self.telemetry,
            now_ms: self.now,
        }
    }
}

/// Console lines waiting to be read
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: Deque<Command, 16>,
}

impl CommandQueue {
    pub fn send(&mut self, command: Command) {
        let _ = self.pending.push_back(command);
    }
}

impl CommandSource for CommandQueue {
    fn poll_command(&mut self) -> Option<Command> {
        self.pending.pop_front()
    }
}

/// A whole controller running against the simulated machine
pub struct Bench {
    pub controller: Controller<SimPlatform>,
    pub now: u32,
    pub inputs: Inputs,
    pub commands: CommandQueue,
}

impl Bench {
    /// Powered up, homed and idle
    pub fn new() -> Self {
        let mut bench = Self::cold();
        bench.controller.boot(bench.now);
        bench.run_until(|c| c.state() == StateId::Idle, 10_000);
        bench.controller.telemetry_mut().clear();
        bench
    }

    /// Powered up, nothing run yet
    pub fn cold() -> Self {
        let mut hw = sim_hardware();
        let inputs = Inputs::default();
        inputs.apply(&mut hw);
        hw.poll(0);
        Self {
            controller: Controller::new(hw, Settings::default(), RecordingTelemetry::default()),
            now: 0,
            inputs,
            commands: CommandQueue::default(),
        }
    }

    pub fn send(&mut self, command: Command) {
        self.commands.send(command);
    }

    pub fn step(&mut self) -> TickReport {
        self.now += 1;
        self.inputs.advance(self.controller.hardware_mut(), self.now);
        self.controller.tick(self.now, &mut self.commands)
    }

    pub fn run_for(&mut self, ms: u32) {
        for _ in 0..ms {
            self.step();
        }
    }

    /// Step until `done` holds; false if `max_ms` ran out first
    pub fn run_until(
        &mut self,
        mut done: impl FnMut(&Controller<SimPlatform>) -> bool,
        max_ms: u32,
    ) -> bool {
        for _ in 0..max_ms {
            if done(&self.controller) {
                return true;
            }
            self.step();
        }
        done(&self.controller)
    }

    pub fn telemetry(&self) -> &RecordingTelemetry {
        self.controller.telemetry()
    }
}
