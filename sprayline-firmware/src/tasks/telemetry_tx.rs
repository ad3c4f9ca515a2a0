//! Console UART transmit task
//!
//! Logs every telemetry event and writes its wire form to the console.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use sprayline_core::traits::TelemetryEvent;

use crate::channels::TELEMETRY_CHANNEL;

#[embassy_executor::task]
pub async fn telemetry_tx_task(mut tx: BufferedUartTx) {
    info!("Telemetry TX task started");

    loop {
        let event = TELEMETRY_CHANNEL.receive().await;
        log_event(&event);

        let line = match event.to_reply().encode() {
            Ok(line) => line,
            Err(_) => {
                warn!("Reply too long for {:?}", event);
                continue;
            }
        };
        if let Err(e) = tx.write_all(line.as_bytes()).await {
            warn!("UART write error: {:?}", e);
        }
    }
}

fn log_event(event: &TelemetryEvent) {
    match event {
        TelemetryEvent::StateChanged(id) => info!("State -> {=str}", id.name()),
        TelemetryEvent::HomingFinished { failure: None } => info!("Homing complete"),
        TelemetryEvent::HomingFinished {
            failure: Some(failure),
        } => error!("Homing failed: {:?}", failure),
        TelemetryEvent::PnpPlaced { placed, total } => info!("Placed {}/{}", placed, total),
        TelemetryEvent::PnpFault(e) => error!("PnP fault: {:?}", e),
        TelemetryEvent::Rejected { command, rejection } => {
            warn!("Rejected {=str}: {:?}", command, rejection)
        }
        TelemetryEvent::Invalid(e) => warn!("Invalid command: {:?}", e),
        other => debug!("{:?}", other),
    }
}
