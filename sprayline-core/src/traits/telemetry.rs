//! Console-facing traits: command intake and telemetry output

use sprayline_protocol::{Command, ParseError, Reply, SettingKey};

use crate::controller::CommandRejection;
use crate::motion::HomingFailure;
use crate::pnp::PnpError;
use crate::state::StateId;

/// Something worth telling the operator about
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemetryEvent {
    /// A state finished entering (sent exactly once per transition)
    StateChanged(StateId),
    /// Answer to a status request; not a transition
    Status(StateId),
    Paused,
    Resumed,
    /// Command accepted
    Accepted(&'static str),
    /// Command refused by the state gate or a limit check
    Rejected {
        command: &'static str,
        rejection: CommandRejection,
    },
    /// Line received but not understood
    Invalid(ParseError),
    /// Homing run finished, `failure` is `None` on success
    HomingFinished { failure: Option<HomingFailure> },
    PnpPlaced { placed: u8, total: u8 },
    PnpFault(PnpError),
    CoatFinished { coat: u8, total: u8 },
    /// Current value of one setting
    Setting { key: SettingKey, value: f32 },
    PressurePot(bool),
    /// Axis positions (inches, degrees)
    Position { x: f32, y: f32, z: f32, rotation: f32 },
}

impl TelemetryEvent {
    /// Wire form of this event
    pub fn to_reply(&self) -> Reply {
        match *self {
            TelemetryEvent::StateChanged(id) | TelemetryEvent::Status(id) => {
                Reply::State(id.name())
            }
            TelemetryEvent::Paused => Reply::Paused,
            TelemetryEvent::Resumed => Reply::Resumed,
            TelemetryEvent::Accepted(command) => Reply::Ack(command),
            TelemetryEvent::Rejected { command, rejection } => Reply::Rejected {
                command,
                reason: rejection.reason(),
            },
            TelemetryEvent::Invalid(err) => Reply::Invalid(err.reason()),
            TelemetryEvent::HomingFinished { failure } => Reply::Homing {
                success: failure.is_none(),
            },
            TelemetryEvent::PnpPlaced { placed, total } => Reply::PnpPlaced { placed, total },
            TelemetryEvent::PnpFault(err) => Reply::Fault(err.name()),
            TelemetryEvent::CoatFinished { coat, total } => Reply::Coat {
                finished: coat,
                total,
            },
            TelemetryEvent::Setting { key, value } => Reply::Setting { key, value },
            TelemetryEvent::PressurePot(on) => Reply::PressurePot(on),
            TelemetryEvent::Position { x, y, z, rotation } => Reply::Position { x, y, z, rotation },
        }
    }
}

/// Sink for telemetry events
pub trait Telemetry {
    fn emit(&mut self, event: TelemetryEvent);

    /// Events that can be accepted right now without dropping any
    ///
    /// Bulk output (the settings listing) is paced against this. Sinks
    /// that never drop keep the default.
    fn room(&self) -> usize {
        usize::MAX
    }
}

/// Source of parsed operator commands
///
/// The controller drains this before every state update, so pause and
/// abort requests are seen within one tick.
pub trait CommandSource {
    fn poll_command(&mut self) -> Option<Command>;
}
