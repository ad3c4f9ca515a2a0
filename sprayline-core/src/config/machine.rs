//! Fixed machine parameters
//!
//! Linear axes use 254 steps per inch (XYZ share the same drive ratio),
//! the fixture rotation uses 4000 steps per 360°.

// --- Drive ratios ---

/// Steps per inch for X, both Y motors and Z
pub const STEPS_PER_INCH: f32 = 254.0;

/// Steps per degree of fixture rotation
pub const STEPS_PER_DEGREE: f32 = 11.11111;

/// Steps for one full fixture turn
pub const STEPS_PER_REV: i32 = 4_000;

// --- Travel limits (inches) ---

pub const X_MIN_IN: f32 = 0.0;
pub const X_MAX_IN: f32 = 35.0;
pub const Y_MIN_IN: f32 = 0.0;
pub const Y_MAX_IN: f32 = 35.0;
pub const Z_MIN_IN: f32 = -2.75;
pub const Z_MAX_IN: f32 = 0.0;

/// Tool servo range (degrees)
pub const TOOL_ANGLE_MIN: f32 = 0.0;
pub const TOOL_ANGLE_MAX: f32 = 180.0;

// --- Default speeds (steps/s) and accelerations (steps/s²) ---

pub const DEFAULT_X_SPEED: u32 = 20_000;
pub const DEFAULT_Y_SPEED: u32 = 30_000;
pub const DEFAULT_Z_SPEED: u32 = 5_000;
pub const DEFAULT_ROT_SPEED: u32 = 2_000;

pub const DEFAULT_X_ACCEL: u32 = 25_000;
pub const DEFAULT_Y_ACCEL: u32 = 30_000;
pub const DEFAULT_Z_ACCEL: u32 = 13_000;
pub const DEFAULT_ROT_ACCEL: u32 = 3_000;

/// Upper bound accepted for any speed setting
pub const MAX_SPEED_HZ: u32 = 100_000;

/// Upper bound accepted for any acceleration setting
pub const MAX_ACCEL: u32 = 200_000;

// --- Manual moves ---

pub const MANUAL_X_SPEED: u32 = 10_000;
pub const MANUAL_Y_SPEED: u32 = 10_000;
pub const MANUAL_Z_SPEED: u32 = 4_000;

/// Settle time after a manual tool angle change
pub const MANUAL_SERVO_SETTLE_MS: u32 = 500;

/// Fixture quarter turn for manual rotate
pub const MANUAL_ROTATE_DEG: f32 = 90.0;

// --- Homing ---

/// Wait for switch bounce from the previous operation to die out
pub const HOMING_SETTLE_MS: u32 = 250;

/// Seek speed toward the switches
pub const HOMING_SPEED_HZ: u32 = 1_000;

pub const HOMING_ACCEL_XY: u32 = 2_000;
pub const HOMING_ACCEL_Z: u32 = 5_000;

/// All four linear axes must reach their switch within this window
pub const HOMING_TIMEOUT_MS: u32 = 15_000;

/// Back-off distance after the switches trip
pub const HOMING_MOVE_AWAY_IN: f32 = 0.2;
pub const HOMING_MOVE_AWAY_ACCEL: u32 = 1_000;
pub const HOMING_MOVE_AWAY_TIMEOUT_MS: u32 = 5_000;

/// Fixture return to 0° before the linear axes home
pub const ROTATION_HOME_TIMEOUT_MS: u32 = 20_000;

/// Park position reached at the end of a successful homing run
pub const PARK_X_IN: f32 = 0.0;
pub const PARK_Y_IN: f32 = 0.3;
pub const PARK_TIMEOUT_MS: u32 = 10_000;

// --- Debounce intervals (ms) ---

pub const DEBOUNCE_MS: u32 = 10;
pub const HOME_SWITCH_DEBOUNCE_MS: u32 = 20;
pub const CYCLE_SENSOR_DEBOUNCE_MS: u32 = 40;

// --- Tool servo ---

/// Tool angle while parked in Idle
pub const TOOL_PARK_ANGLE: f32 = 180.0;

// --- Painting ---

/// Sweeps per side for the multi-row patterns
pub const SWEEP_COUNT: usize = 5;

/// Spray turns on this far into a sweep
pub const SWEEP_LEAD_IN_IN: f32 = 0.25;

/// Spray turns off this far before the end of a sweep
pub const SWEEP_LEAD_OUT_IN: f32 = 0.5;

/// Side 1 stops spraying earlier on its single X sweep
pub const SIDE1_LEAD_OUT_IN: f32 = 0.75;

/// Speed factor for the slow sweep of each multi-row pattern
pub const SLOW_SWEEP_FACTOR: f32 = 0.75;

/// Closing pass along the long edge (sides 2 and 4)
pub const CLOSING_PASS_IN: f32 = 23.0;
pub const CLOSING_PASS_Z_IN: f32 = -1.75;
pub const CLOSING_TOOL_ANGLE: f32 = 85.0;

/// Where every pattern ends before handing back control
pub const PRE_HOME_X_IN: f32 = 1.0;
pub const PRE_HOME_Y_IN: f32 = 1.0;

/// Paint-all-sides preparation settle
pub const PREPARE_SETTLE_MS: u32 = 200;

/// Pressurize time when the pot was found off after a coat
pub const REPRESSURIZE_MS: u32 = 1_000;

/// X position the carriage parks at between coats
pub const INTER_COAT_PARK_X_IN: f32 = 24.0;

/// Delays shorter than this skip the loading-bar move
pub const MIN_INTER_COAT_DELAY_MS: u32 = 100;

// --- Cleaning ---

pub const CLEAN_X_IN: f32 = 0.8;
pub const CLEAN_Y_IN: f32 = 4.1;
/// Requested cleaning depth, clamped to `Z_MIN_IN` when moving
pub const CLEAN_Z_IN: f32 = -3.0;
pub const CLEAN_X_SPEED: u32 = 2_000;
pub const CLEAN_Y_SPEED: u32 = 2_000;
pub const CLEAN_Z_SPEED: u32 = 1_000;
pub const CLEAN_TOOL_ANGLE: f32 = 35.0;
pub const CLEAN_PRESSURIZE_MS: u32 = 100;
pub const CLEAN_SPRAY_MS: u32 = 150;
pub const CLEAN_SPRAY_SHORT_MS: u32 = 75;

// --- Tip inspection ---

pub const INSPECT_X_IN: f32 = 10.0;
pub const INSPECT_Y_IN: f32 = 0.5;

// --- Pick and place ---

pub const PNP_ROWS: usize = 5;
pub const PNP_COLS: usize = 2;

/// Top-right cell of the tray
pub const PNP_ORIGIN_X_IN: f32 = 16.75;
pub const PNP_ORIGIN_Y_IN: f32 = 32.4;

/// Distance between tray columns
pub const PNP_COL_PITCH_IN: f32 = 9.4;

/// Distance between tray rows
pub const PNP_ROW_PITCH_IN: f32 = 5.0;

pub const PICK_X_IN: f32 = 16.05;
pub const PICK_Y_IN: f32 = 2.0;

pub const DEFAULT_PNP_X_SPEED: u32 = 20_000;
pub const DEFAULT_PNP_Y_SPEED: u32 = 30_000;
pub const DEFAULT_PNP_X_ACCEL: u32 = 20_000;
pub const DEFAULT_PNP_Y_ACCEL: u32 = 30_000;

pub const PICK_EXTEND_MS: u32 = 150;
/// Vacuum build-up before lifting the part
pub const PICK_VACUUM_MS: u32 = 150;
pub const PICK_RETRACT_MS: u32 = 150;
pub const PLACE_EXTEND_MS: u32 = 150;
pub const PLACE_RELEASE_MS: u32 = 100;
pub const PLACE_RETRACT_MS: u32 = 150;
