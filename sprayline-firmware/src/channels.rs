//! Inter-task communication channels
//!
//! Commands flow from the UART reader to the controller; telemetry flows
//! back out to the UART writer. The controller never awaits either side:
//! it drains commands with `try_receive` and drops telemetry when the
//! writer has fallen behind.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use sprayline_core::config::Settings;
use sprayline_core::traits::TelemetryEvent;
use sprayline_protocol::Command;

/// Parsed commands waiting for the next controller tick
const COMMAND_CHANNEL_SIZE: usize = 8;

/// Telemetry waiting for the UART writer
const TELEMETRY_CHANNEL_SIZE: usize = 32;

pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, Command, COMMAND_CHANNEL_SIZE> =
    Channel::new();

pub static TELEMETRY_CHANNEL: Channel<
    CriticalSectionRawMutex,
    TelemetryEvent,
    TELEMETRY_CHANNEL_SIZE,
> = Channel::new();

/// Latest settings to write to flash; a newer request replaces an older one
pub static SETTINGS_SAVE: Signal<CriticalSectionRawMutex, Settings> = Signal::new();
