//! Main controller task
//!
//! Runs the control loop at a fixed 1 ms period. Every tick advances the
//! step ramps, samples the inputs, applies queued commands and runs the
//! active state once.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use sprayline_core::controller::Controller;
use sprayline_core::traits::{DebouncedSwitch, SwitchPolarity};

use crate::board::{Board, BoardSwitch, ChannelCommands};
use crate::channels::SETTINGS_SAVE;

/// Control loop period
pub const TICK_INTERVAL_MS: u64 = 1;

/// Panel stop button pulls its line low
const ABORT_POLARITY: SwitchPolarity = SwitchPolarity::ActiveLow;

#[embassy_executor::task]
pub async fn controller_task(mut controller: Controller<Board>, mut abort_button: BoardSwitch) {
    info!("Controller task started");

    let mut commands = ChannelCommands;
    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS));
    let start = Instant::now();

    controller.boot(0);

    loop {
        ticker.next().await;
        let now_ms = start.elapsed().as_millis() as u32;

        if abort_button.update(now_ms) && ABORT_POLARITY.is_active(abort_button.read()) {
            warn!("Panel abort");
            controller.hard_abort();
        }

        let report = controller.tick(now_ms, &mut commands);
        if report.persist {
            SETTINGS_SAVE.signal(*controller.settings());
        }
    }
}
