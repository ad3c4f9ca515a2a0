//! Settings persistence task
//!
//! Owns the flash and writes the settings whenever the controller asks.
//! Flash writes take milliseconds, so they never run on the control loop.

use defmt::*;

use sprayline_hal_rp2040::flash::FlashStorage;

use crate::channels::SETTINGS_SAVE;
use crate::config::SettingsStore;

#[embassy_executor::task]
pub async fn settings_task(mut store: SettingsStore<FlashStorage<'static>>) {
    info!("Settings task started");

    loop {
        let settings = SETTINGS_SAVE.wait().await;
        match store.save(&settings).await {
            Ok(()) => info!("Settings saved"),
            Err(e) => error!("Failed to save settings: {:?}", e),
        }
    }
}
