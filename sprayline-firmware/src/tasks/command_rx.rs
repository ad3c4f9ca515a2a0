//! Console UART receive task
//!
//! Frames incoming bytes into lines, parses each line into a command and
//! queues it for the controller. Lines that do not parse are answered
//! directly on the telemetry channel.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use sprayline_core::traits::TelemetryEvent;
use sprayline_protocol::{Command, LineError, LineReader, ParseError};

use crate::channels::{COMMAND_CHANNEL, TELEMETRY_CHANNEL};

const RX_BUF_SIZE: usize = 64;

#[embassy_executor::task]
pub async fn command_rx_task(mut rx: BufferedUartRx) {
    info!("Command RX task started");

    let mut reader = LineReader::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        let n = match rx.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                warn!("UART read error: {:?}", e);
                continue;
            }
        };

        for &byte in &buf[..n] {
            match reader.feed(byte) {
                Ok(Some(line)) => match Command::parse(&line) {
                    Ok(command) => {
                        debug!("Command: {:?}", command);
                        COMMAND_CHANNEL.send(command).await;
                    }
                    Err(e) => {
                        warn!("Unparsable line: {=str}", line.as_str());
                        TELEMETRY_CHANNEL.send(TelemetryEvent::Invalid(e)).await;
                    }
                },
                Ok(None) => {}
                Err(LineError::Overflow) => {
                    warn!("Command line too long, dropped");
                    TELEMETRY_CHANNEL
                        .send(TelemetryEvent::Invalid(ParseError::InvalidValue))
                        .await;
                }
                Err(LineError::InvalidByte) => {
                    warn!("Non-ASCII byte on console, line dropped");
                    TELEMETRY_CHANNEL
                        .send(TelemetryEvent::Invalid(ParseError::UnknownCommand))
                        .await;
                }
            }
        }
    }
}
