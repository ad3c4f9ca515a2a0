//! Concrete collaborator types of the RP2040 controller board

use defmt::*;
use embassy_rp::gpio::{Input, Output};
use embassy_rp::pwm::PwmOutput;

use sprayline_core::hardware::Platform;
use sprayline_core::traits::{CommandSource, Telemetry, TelemetryEvent};
use sprayline_drivers::{Debouncer, GpioActuators};
use sprayline_hal_rp2040::PioAxis;
use sprayline_protocol::Command;

use crate::channels::{COMMAND_CHANNEL, TELEMETRY_CHANNEL};

pub type BoardSwitch = Debouncer<Input<'static>>;

pub type BoardActuators = GpioActuators<
    Output<'static>,
    Output<'static>,
    Output<'static>,
    Output<'static>,
    PwmOutput<'static>,
>;

pub struct Board;

impl Platform for Board {
    type Axis = PioAxis<'static>;
    type Switch = BoardSwitch;
    type Io = BoardActuators;
    type Telemetry = ChannelTelemetry;
}

/// Hands telemetry to the UART writer task
pub struct ChannelTelemetry;

impl Telemetry for ChannelTelemetry {
    fn emit(&mut self, event: TelemetryEvent) {
        if TELEMETRY_CHANNEL.try_send(event).is_err() {
            warn!("Telemetry channel full, dropping {:?}", event);
        }
    }

    fn room(&self) -> usize {
        TELEMETRY_CHANNEL.free_capacity()
    }
}

/// Commands queued by the UART reader task
pub struct ChannelCommands;

impl CommandSource for ChannelCommands {
    fn poll_command(&mut self) -> Option<Command> {
        COMMAND_CHANNEL.try_receive().ok()
    }
}
