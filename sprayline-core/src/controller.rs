//! Top-level controller
//!
//! Owns the hardware, settings, runtime flags, telemetry sink and the
//! state machine. The firmware calls [`Controller::tick`] once per
//! millisecond:
//!
//! 1. every axis and input is polled,
//! 2. pending console commands are applied,
//! 3. the active state runs once.
//!
//! Commands are gated on the active state. A refused command produces a
//! `Rejected` event and changes nothing.

use sprayline_protocol::{Command, SettingKey};

use crate::config::{Settings, SettingsError};
use crate::control::RuntimeFlags;
use crate::hardware::{Context, Hardware, Platform};
use crate::manual;
use crate::motion::Sequence;
use crate::safety::LimitViolation;
use crate::state::{StateId, StateMachine};
use crate::traits::{ActuatorIo, CommandSource, Telemetry, TelemetryEvent};

/// Settings sent per tick while a listing is in progress
const SETTINGS_PER_TICK: usize = 4;

/// Telemetry slots a listing leaves free for state changes and replies
const TELEMETRY_RESERVE: usize = 8;

/// Why a command was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandRejection {
    /// Only accepted while Idle
    NotIdle,
    /// Only accepted during tip inspection
    NotInspectTip,
    /// `CLEAR_ERROR` outside the Error state
    NotInError,
    /// Not permitted in the current state
    NotAllowed,
    /// A manual job is still running
    Busy,
    Limit(LimitViolation),
    Settings(SettingsError),
}

impl CommandRejection {
    pub fn reason(self) -> &'static str {
        match self {
            CommandRejection::NotIdle => "Machine not idle",
            CommandRejection::NotInspectTip => "Not inspecting tip",
            CommandRejection::NotInError => "No error to clear",
            CommandRejection::NotAllowed => "Not allowed in this state",
            CommandRejection::Busy => "Manual move in progress",
            CommandRejection::Limit(violation) => violation.reason(),
            CommandRejection::Settings(err) => err.reason(),
        }
    }
}

impl From<LimitViolation> for CommandRejection {
    fn from(violation: LimitViolation) -> Self {
        CommandRejection::Limit(violation)
    }
}

impl From<SettingsError> for CommandRejection {
    fn from(err: SettingsError) -> Self {
        CommandRejection::Settings(err)
    }
}

/// What the host has to do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandOutcome {
    Done,
    /// Settings changed and should be written to flash
    Persist,
}

/// Result of one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// A command asked for the settings to be saved
    pub persist: bool,
}

pub struct Controller<P: Platform> {
    hw: Hardware<P>,
    settings: Settings,
    flags: RuntimeFlags,
    telemetry: P::Telemetry,
    machine: StateMachine,
    now_ms: u32,
    /// Next key of a settings listing still being sent
    settings_cursor: Option<usize>,
}

impl<P: Platform> Controller<P> {
    pub fn new(hw: Hardware<P>, settings: Settings, telemetry: P::Telemetry) -> Self {
        Self {
            hw,
            settings,
            flags: RuntimeFlags::new(),
            telemetry,
            machine: StateMachine::new(),
            now_ms: 0,
            settings_cursor: None,
        }
    }

    fn parts(&mut self) -> (&mut StateMachine, Context<'_, P>) {
        (
            &mut self.machine,
            Context {
                hw: &mut self.hw,
                settings: &self.settings,
                flags: &mut self.flags,
                telemetry: &mut self.telemetry,
                now_ms: self.now_ms,
            },
        )
    }

    /// Power-up; starts homing
    pub fn boot(&mut self, now_ms: u32) {
        self.now_ms = now_ms;
        self.hw.fail_safe();
        self.hw.poll(now_ms);
        let (machine, mut ctx) = self.parts();
        machine.boot(&mut ctx);
    }

    /// One pass of the control loop
    pub fn tick(&mut self, now_ms: u32, commands: &mut impl CommandSource) -> TickReport {
        self.now_ms = now_ms;
        self.hw.poll(now_ms);

        let mut report = TickReport::default();
        while let Some(command) = commands.poll_command() {
            if self.handle_command(command) == CommandOutcome::Persist {
                report.persist = true;
            }
        }
        self.continue_settings_listing();

        let (machine, mut ctx) = self.parts();
        machine.update(&mut ctx);
        report
    }

    /// Apply one command and report the result on telemetry
    pub fn handle_command(&mut self, command: Command) -> CommandOutcome {
        match self.apply(command) {
            Ok(outcome) => {
                self.telemetry.emit(TelemetryEvent::Accepted(command.name()));
                outcome
            }
            Err(rejection) => {
                self.telemetry.emit(TelemetryEvent::Rejected {
                    command: command.name(),
                    rejection,
                });
                CommandOutcome::Done
            }
        }
    }

    /// Panel emergency stop
    pub fn hard_abort(&mut self) {
        self.flags.hard_abort = true;
    }

    /// Unrecoverable fault found outside the state machine
    pub fn enter_error(&mut self) {
        self.change_state(StateId::Error);
    }

    pub fn state(&self) -> StateId {
        self.machine.current()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn flags(&self) -> &RuntimeFlags {
        &self.flags
    }

    pub fn hardware(&self) -> &Hardware<P> {
        &self.hw
    }

    pub fn hardware_mut(&mut self) -> &mut Hardware<P> {
        &mut self.hw
    }

    pub fn telemetry(&self) -> &P::Telemetry {
        &self.telemetry
    }

    pub fn telemetry_mut(&mut self) -> &mut P::Telemetry {
        &mut self.telemetry
    }

    fn change_state(&mut self, next: StateId) {
        let (machine, mut ctx) = self.parts();
        machine.change_state(&mut ctx, next);
    }

    fn require_idle(&mut self) -> Result<(), CommandRejection> {
        if self.machine.current() != StateId::Idle {
            return Err(CommandRejection::NotIdle);
        }
        if self.machine.idle_mut().is_busy() {
            return Err(CommandRejection::Busy);
        }
        Ok(())
    }

    fn require_inspect(&self) -> Result<(), CommandRejection> {
        if self.machine.current() == StateId::InspectTip {
            Ok(())
        } else {
            Err(CommandRejection::NotInspectTip)
        }
    }

    fn run_manual(&mut self, job: Sequence) -> Result<CommandOutcome, CommandRejection> {
        self.require_idle()?;
        if self.machine.idle_mut().start_job(job) {
            Ok(CommandOutcome::Done)
        } else {
            Err(CommandRejection::Busy)
        }
    }

    /// Arm the next Painting entry to start a fresh run
    fn request_paint_run(&mut self, coats: u8, inter_coat_delay_s: u16) {
        self.flags.requested_coats = coats.max(1);
        self.flags.inter_coat_delay_s = inter_coat_delay_s;
        self.flags.transitioning_to_paint_all_sides = true;
    }

    fn emit_setting(&mut self, key: SettingKey) {
        let value = self.settings.get(key);
        self.telemetry.emit(TelemetryEvent::Setting { key, value });
    }

    /// Send the next few keys of a `GET_PAINT_SETTINGS` listing
    ///
    /// The whole listing is larger than the telemetry queue, so it is
    /// spread over ticks and held back while the queue is nearly full.
    fn continue_settings_listing(&mut self) {
        let Some(mut next) = self.settings_cursor else {
            return;
        };
        for _ in 0..SETTINGS_PER_TICK {
            if self.telemetry.room() <= TELEMETRY_RESERVE {
                break;
            }
            let Some(key) = SettingKey::from_index(next) else {
                self.settings_cursor = None;
                return;
            };
            self.emit_setting(key);
            next += 1;
        }
        self.settings_cursor = (next < SettingKey::COUNT).then_some(next);
    }

    fn apply(&mut self, command: Command) -> Result<CommandOutcome, CommandRejection> {
        let current = self.machine.current();
        match command {
            Command::Home => {
                // Every state except Homing turns this into one transition
                self.flags.soft_abort = true;
            }
            Command::PaintSide(side) => {
                self.require_idle()?;
                self.change_state(StateId::Side(side));
            }
            Command::PaintAllSides {
                coats,
                inter_coat_delay_s,
            } => {
                self.require_idle()?;
                self.request_paint_run(coats, inter_coat_delay_s);
                self.change_state(StateId::Painting);
            }
            Command::CleanAndPaintAllSides {
                coats,
                inter_coat_delay_s,
            } => {
                self.require_idle()?;
                self.request_paint_run(coats, inter_coat_delay_s);
                // Cleaning hands over to Painting when it is done
                self.flags.next_state_override = Some(StateId::Painting);
                self.change_state(StateId::Cleaning);
            }
            Command::Pause => {
                if current == StateId::Idle {
                    self.change_state(StateId::Paused);
                } else {
                    self.flags.paused = true;
                }
                self.telemetry.emit(TelemetryEvent::Paused);
            }
            Command::Resume => {
                self.flags.paused = false;
                self.telemetry.emit(TelemetryEvent::Resumed);
            }
            Command::EnterPickPlace => {
                self.require_idle()?;
                self.change_state(StateId::Pnp);
            }
            Command::CleanGun { short } => {
                self.require_idle()?;
                self.flags.short_clean = short;
                self.change_state(StateId::Cleaning);
            }
            Command::InspectTipOn => {
                self.require_idle()?;
                self.change_state(StateId::InspectTip);
            }
            Command::InspectTipOff => {
                self.require_inspect()?;
                self.machine.inspect_mut().request_return();
            }
            Command::InspectTipToPainting => {
                self.require_inspect()?;
                self.flags.transitioning_to_paint_all_sides = true;
                self.change_state(StateId::Painting);
            }
            Command::InspectTipToPnp => {
                self.require_inspect()?;
                self.change_state(StateId::Pnp);
            }
            Command::ManualMoveTo {
                x,
                y,
                z,
                tool_angle,
            } => {
                self.require_idle()?;
                return self.run_manual(manual::move_to(x, y, z, tool_angle)?);
            }
            Command::ManualRotate(direction) => return self.run_manual(manual::rotate(direction)),
            Command::GotoPickLocation => {
                let job = manual::goto_pick(&self.settings.pnp);
                return self.run_manual(job);
            }
            Command::MoveZPreview(z) => {
                self.require_idle()?;
                return self.run_manual(manual::z_preview(z)?);
            }
            Command::MoveServoPreview(degrees) => {
                self.require_idle()?;
                return self.run_manual(manual::servo_preview(degrees)?);
            }
            Command::PaintGun(on) => {
                if !matches!(current, StateId::Idle | StateId::InspectTip) {
                    return Err(CommandRejection::NotAllowed);
                }
                self.hw.io.set_spray_valve(on);
            }
            Command::PressurePot(on) => {
                self.hw.io.set_pressurizer(on);
                self.telemetry.emit(TelemetryEvent::PressurePot(on));
            }
            Command::TogglePressurePot => {
                let on = !self.hw.io.pressurizer();
                self.hw.io.set_pressurizer(on);
                self.telemetry.emit(TelemetryEvent::PressurePot(on));
            }
            Command::Vacuum(on) => self.hw.io.set_vacuum(on),
            Command::PickCylinder(extended) => self.hw.io.set_pick_cylinder(extended),
            Command::Set { key, value } => {
                self.settings.set(key, value)?;
                self.emit_setting(key);
            }
            Command::SaveSettings => return Ok(CommandOutcome::Persist),
            Command::ResetSettings => {
                self.settings = Settings::default();
                return Ok(CommandOutcome::Persist);
            }
            Command::GetSettings => self.settings_cursor = Some(0),
            Command::Status => {
                self.telemetry.emit(TelemetryEvent::Status(current));
                let position = self.hw.position_event();
                self.telemetry.emit(position);
                let pot = self.hw.io.pressurizer();
                self.telemetry.emit(TelemetryEvent::PressurePot(pot));
            }
            Command::ClearError => {
                if current != StateId::Error {
                    return Err(CommandRejection::NotInError);
                }
                self.change_state(StateId::Idle);
            }
        }
        Ok(CommandOutcome::Done)
    }
}
