//! Operator-tunable settings
//!
//! Distances are inches, speeds are steps/s, angles are degrees. The whole
//! struct is fixed-size so it can be stored as one postcard blob.

use serde::{Deserialize, Serialize};
use sprayline_protocol::{SettingKey, SideField, SideId};

use super::machine::{
    DEFAULT_PNP_X_ACCEL, DEFAULT_PNP_X_SPEED, DEFAULT_PNP_Y_ACCEL, DEFAULT_PNP_Y_SPEED, MAX_ACCEL,
    MAX_SPEED_HZ, TOOL_ANGLE_MAX, TOOL_ANGLE_MIN, X_MAX_IN, X_MIN_IN, Y_MAX_IN, Y_MIN_IN, Z_MAX_IN,
    Z_MIN_IN,
};

/// Current settings layout version
pub const SETTINGS_VERSION: u8 = 1;

/// Upper bound for the post-print pause (10 minutes)
const MAX_POST_PRINT_PAUSE_MS: f32 = 600_000.0;

/// Upper bound for the PnP sensor timeout (1 hour)
const MAX_SENSOR_TIMEOUT_S: f32 = 3_600.0;

/// Errors from reading, writing or encoding settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// Value outside the accepted range for the key
    OutOfRange,
    /// Serialization failed (buffer too small)
    Encode,
    /// Stored bytes could not be decoded
    Decode,
    /// Stored layout version does not match this firmware
    VersionMismatch,
}

impl SettingsError {
    pub fn reason(self) -> &'static str {
        match self {
            SettingsError::OutOfRange => "Value out of range",
            SettingsError::Encode => "Settings do not fit",
            SettingsError::Decode => "Stored settings unreadable",
            SettingsError::VersionMismatch => "Stored settings from another version",
        }
    }
}

/// Pattern parameters for one side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SideSettings {
    /// Spray height (inches, negative is down)
    pub z_height: f32,
    /// Safe travel height (inches)
    pub side_z_height: f32,
    /// Fixture rotation (degrees)
    pub rotation_angle: f32,
    /// Tool servo angle (degrees)
    pub tool_angle: f32,
    pub paint_x_speed: u32,
    pub paint_y_speed: u32,
    pub start_x: f32,
    pub start_y: f32,
    pub sweep_y: f32,
    pub shift_x: f32,
}

impl SideSettings {
    const fn new(
        z_height: f32,
        rotation_angle: f32,
        paint_x_speed: u32,
        paint_y_speed: u32,
        start_x: f32,
        start_y: f32,
        sweep_y: f32,
    ) -> Self {
        Self {
            z_height,
            side_z_height: 0.0,
            rotation_angle,
            tool_angle: 35.0,
            paint_x_speed,
            paint_y_speed,
            start_x,
            start_y,
            sweep_y,
            shift_x: 5.0,
        }
    }
}

/// Pick-and-place tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PnpSettings {
    pub x_speed: u32,
    pub y_speed: u32,
    pub x_accel: u32,
    pub y_accel: u32,
    /// Give up waiting for a part after this long (0 = wait forever)
    pub sensor_timeout_s: u16,
}

impl Default for PnpSettings {
    fn default() -> Self {
        Self {
            x_speed: DEFAULT_PNP_X_SPEED,
            y_speed: DEFAULT_PNP_Y_SPEED,
            x_accel: DEFAULT_PNP_X_ACCEL,
            y_accel: DEFAULT_PNP_Y_ACCEL,
            sensor_timeout_s: 0,
        }
    }
}

/// All operator settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    /// Layout version (for migration)
    pub version: u8,
    /// Gun nozzle offset from the tool reference (stored for the console)
    pub painting_offset_x: f32,
    pub painting_offset_y: f32,
    /// Indexed by `SideId::index`
    pub sides: [SideSettings; 4],
    /// Pause after the last coat before homing
    pub post_print_pause_ms: u32,
    pub pnp: PnpSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            painting_offset_x: -1.5,
            painting_offset_y: -4.5,
            sides: [
                SideSettings::new(-2.0, 180.0, 10_000, 20_000, 7.0, 3.0, 20.0),
                SideSettings::new(-1.0, -90.0, 20_000, 10_000, 27.0, 23.5, 20.0),
                SideSettings::new(-1.5, 0.0, 5_000, 20_000, 26.5, 21.5, 19.0),
                SideSettings::new(-1.0, 90.0, 20_000, 10_000, 6.2, 1.5, 20.0),
            ],
            post_print_pause_ms: 0,
            pnp: PnpSettings::default(),
        }
    }
}

impl Settings {
    /// Parameters for one side
    pub fn side(&self, side: SideId) -> &SideSettings {
        &self.sides[side.index()]
    }

    /// Read a setting as the number shown on the console
    pub fn get(&self, key: SettingKey) -> f32 {
        match key {
            SettingKey::Side(side, field) => {
                let s = self.side(side);
                match field {
                    SideField::ZHeight => s.z_height,
                    SideField::SideZHeight => s.side_z_height,
                    SideField::RotationAngle => s.rotation_angle,
                    SideField::ToolAngle => s.tool_angle,
                    SideField::PaintingXSpeed => s.paint_x_speed as f32,
                    SideField::PaintingYSpeed => s.paint_y_speed as f32,
                    SideField::StartX => s.start_x,
                    SideField::StartY => s.start_y,
                    SideField::SweepY => s.sweep_y,
                    SideField::ShiftX => s.shift_x,
                }
            }
            SettingKey::PaintingOffsetX => self.painting_offset_x,
            SettingKey::PaintingOffsetY => self.painting_offset_y,
            SettingKey::PostPrintPause => self.post_print_pause_ms as f32,
            SettingKey::PnpXSpeed => self.pnp.x_speed as f32,
            SettingKey::PnpYSpeed => self.pnp.y_speed as f32,
            SettingKey::PnpXAccel => self.pnp.x_accel as f32,
            SettingKey::PnpYAccel => self.pnp.y_accel as f32,
            SettingKey::PnpSensorTimeout => self.pnp.sensor_timeout_s as f32,
        }
    }

    /// Validate and store one setting
    ///
    /// The stored value is unchanged when the new one is rejected.
    pub fn set(&mut self, key: SettingKey, value: f32) -> Result<(), SettingsError> {
        match key {
            SettingKey::Side(side, field) => {
                let s = &mut self.sides[side.index()];
                match field {
                    SideField::ZHeight => s.z_height = ranged(value, Z_MIN_IN, Z_MAX_IN)?,
                    SideField::SideZHeight => s.side_z_height = ranged(value, Z_MIN_IN, Z_MAX_IN)?,
                    SideField::RotationAngle => s.rotation_angle = ranged(value, -360.0, 360.0)?,
                    SideField::ToolAngle => {
                        s.tool_angle = ranged(value, TOOL_ANGLE_MIN, TOOL_ANGLE_MAX)?
                    }
                    SideField::PaintingXSpeed => s.paint_x_speed = speed(value)?,
                    SideField::PaintingYSpeed => s.paint_y_speed = speed(value)?,
                    SideField::StartX => s.start_x = ranged(value, X_MIN_IN, X_MAX_IN)?,
                    SideField::StartY => s.start_y = ranged(value, Y_MIN_IN, Y_MAX_IN)?,
                    SideField::SweepY => s.sweep_y = ranged(value, 0.0, Y_MAX_IN)?,
                    SideField::ShiftX => s.shift_x = ranged(value, 0.0, X_MAX_IN)?,
                }
            }
            SettingKey::PaintingOffsetX => {
                self.painting_offset_x = ranged(value, -X_MAX_IN, X_MAX_IN)?
            }
            SettingKey::PaintingOffsetY => {
                self.painting_offset_y = ranged(value, -Y_MAX_IN, Y_MAX_IN)?
            }
            SettingKey::PostPrintPause => {
                self.post_print_pause_ms = ranged(value, 0.0, MAX_POST_PRINT_PAUSE_MS)? as u32
            }
            SettingKey::PnpXSpeed => self.pnp.x_speed = speed(value)?,
            SettingKey::PnpYSpeed => self.pnp.y_speed = speed(value)?,
            SettingKey::PnpXAccel => self.pnp.x_accel = accel(value)?,
            SettingKey::PnpYAccel => self.pnp.y_accel = accel(value)?,
            SettingKey::PnpSensorTimeout => {
                self.pnp.sensor_timeout_s = ranged(value, 0.0, MAX_SENSOR_TIMEOUT_S)? as u16
            }
        }
        Ok(())
    }

    /// Serialize into `buf`, returning the used part
    pub fn to_bytes<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], SettingsError> {
        postcard::to_slice(self, buf).map_err(|_| SettingsError::Encode)
    }

    /// Deserialize and check the layout version
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SettingsError> {
        let settings: Settings = postcard::from_bytes(bytes).map_err(|_| SettingsError::Decode)?;
        if settings.version != SETTINGS_VERSION {
            return Err(SettingsError::VersionMismatch);
        }
        Ok(settings)
    }
}

fn ranged(value: f32, min: f32, max: f32) -> Result<f32, SettingsError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(value)
    } else {
        Err(SettingsError::OutOfRange)
    }
}

fn speed(value: f32) -> Result<u32, SettingsError> {
    ranged(value, 1.0, MAX_SPEED_HZ as f32).map(|v| v as u32)
}

fn accel(value: f32) -> Result<u32, SettingsError> {
    ranged(value, 1.0, MAX_ACCEL as f32).map(|v| v as u32)
}
