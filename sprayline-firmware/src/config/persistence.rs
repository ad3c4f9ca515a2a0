//! Settings load and save over the flash key-value store

use defmt::*;

use sprayline_core::config::{Settings, SettingsError};
use sprayline_hal::{FlashError, FlashStorage, StorageKey};
use sprayline_hal_rp2040::flash::MAX_ITEM_SIZE;

/// Settings persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    Flash(FlashError),
    /// Stored blob did not decode or was written by another layout version
    Settings(SettingsError),
}

impl From<FlashError> for ConfigError {
    fn from(e: FlashError) -> Self {
        ConfigError::Flash(e)
    }
}

impl From<SettingsError> for ConfigError {
    fn from(e: SettingsError) -> Self {
        ConfigError::Settings(e)
    }
}

pub struct SettingsStore<S> {
    storage: S,
}

impl<S: FlashStorage> SettingsStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Stored settings, or the factory settings if none are usable
    pub async fn load_or_default(&mut self) -> Settings {
        match self.load().await {
            Ok(settings) => {
                info!("Loaded settings from flash");
                settings
            }
            Err(ConfigError::Flash(FlashError::NotFound)) => {
                info!("No settings in flash, using factory settings");
                Settings::default()
            }
            Err(e) => {
                warn!("Stored settings unusable ({:?}), using factory settings", e);
                Settings::default()
            }
        }
    }

    pub async fn load(&mut self) -> Result<Settings, ConfigError> {
        let mut buffer = [0u8; MAX_ITEM_SIZE];
        let len = self.storage.read(StorageKey::Settings, &mut buffer).await?;
        debug!("Read {} bytes of settings", len);
        Ok(Settings::from_bytes(&buffer[..len])?)
    }

    pub async fn save(&mut self, settings: &Settings) -> Result<(), ConfigError> {
        let mut buffer = [0u8; MAX_ITEM_SIZE];
        let bytes = settings.to_bytes(&mut buffer)?;
        self.storage.write(StorageKey::Settings, bytes).await?;
        debug!("Wrote {} bytes of settings", bytes.len());
        Ok(())
    }
}
