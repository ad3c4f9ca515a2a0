//! Operator commands
//!
//! Commands arrive as `ACTION[:ARGS]` lines. Arguments are separated by `:`
//! for paint commands and by `,` for coordinate lists, matching what the
//! dashboard sends.

use core::fmt;

/// Default number of coats for `PAINT_ALL_SIDES` without arguments
pub const DEFAULT_COATS: u8 = 1;

/// Default delay between coats in seconds
pub const DEFAULT_INTER_COAT_DELAY_S: u16 = 10;

/// Upper bound for the delay between coats (10 minutes)
pub const MAX_INTER_COAT_DELAY_S: u16 = 600;

/// Upper bound for a multi-coat request
pub const MAX_COATS: u8 = 99;

/// One face of the workpiece
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SideId {
    One,
    Two,
    Three,
    Four,
}

impl SideId {
    /// Order in which a full-coat run paints the sides
    pub const COAT_ORDER: [SideId; 4] = [SideId::Four, SideId::Three, SideId::Two, SideId::One];

    /// Side number as printed on the machine (1-4)
    pub fn number(self) -> u8 {
        match self {
            SideId::One => 1,
            SideId::Two => 2,
            SideId::Three => 3,
            SideId::Four => 4,
        }
    }

    /// Zero-based index for per-side tables
    pub fn index(self) -> usize {
        self.number() as usize - 1
    }

    /// Create from a side number (1-4)
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(SideId::One),
            2 => Some(SideId::Two),
            3 => Some(SideId::Three),
            4 => Some(SideId::Four),
            _ => None,
        }
    }

    fn from_wire(digit: &str) -> Option<Self> {
        match digit {
            "1" => Some(SideId::One),
            "2" => Some(SideId::Two),
            "3" => Some(SideId::Three),
            "4" => Some(SideId::Four),
            _ => None,
        }
    }
}

/// Per-side tunable parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SideField {
    /// Working height while spraying (inches, negative is down)
    ZHeight,
    /// Safe travel height for this side (inches)
    SideZHeight,
    /// Fixture rotation for this side (degrees)
    RotationAngle,
    /// Tool servo angle for this side (degrees)
    ToolAngle,
    /// X sweep speed (Hz)
    PaintingXSpeed,
    /// Y sweep speed (Hz)
    PaintingYSpeed,
    /// Pattern start X (inches)
    StartX,
    /// Pattern start Y (inches)
    StartY,
    /// Sweep length (inches)
    SweepY,
    /// Pitch between sweeps (inches)
    ShiftX,
}

const SIDE_FIELDS: [SideField; 10] = [
    SideField::ZHeight,
    SideField::SideZHeight,
    SideField::RotationAngle,
    SideField::ToolAngle,
    SideField::PaintingXSpeed,
    SideField::PaintingYSpeed,
    SideField::StartX,
    SideField::StartY,
    SideField::SweepY,
    SideField::ShiftX,
];

/// Address of one operator setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingKey {
    Side(SideId, SideField),
    PaintingOffsetX,
    PaintingOffsetY,
    /// Pause after the last coat before homing (ms)
    PostPrintPause,
    PnpXSpeed,
    PnpYSpeed,
    PnpXAccel,
    PnpYAccel,
    /// How long PnP waits for a part before giving up (s, 0 = forever)
    PnpSensorTimeout,
}

const GLOBAL_KEYS: [SettingKey; 8] = [
    SettingKey::PaintingOffsetX,
    SettingKey::PaintingOffsetY,
    SettingKey::PostPrintPause,
    SettingKey::PnpXSpeed,
    SettingKey::PnpYSpeed,
    SettingKey::PnpXAccel,
    SettingKey::PnpYAccel,
    SettingKey::PnpSensorTimeout,
];

impl SettingKey {
    /// Total number of addressable settings
    pub const COUNT: usize = 4 * SIDE_FIELDS.len() + GLOBAL_KEYS.len();

    /// Key at a stable position in the settings listing
    pub fn from_index(index: usize) -> Option<Self> {
        let per_side = SIDE_FIELDS.len();
        if index < 4 * per_side {
            let side = SideId::from_number((index / per_side) as u8 + 1)?;
            Some(SettingKey::Side(side, SIDE_FIELDS[index % per_side]))
        } else {
            GLOBAL_KEYS.get(index - 4 * per_side).copied()
        }
    }

    /// Every key, sides first
    pub fn iter() -> impl Iterator<Item = SettingKey> {
        (0..Self::COUNT).filter_map(Self::from_index)
    }

    /// Whether the value is reported without decimals
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            SettingKey::Side(
                _,
                SideField::PaintingXSpeed | SideField::PaintingYSpeed | SideField::RotationAngle
            ) | SettingKey::PostPrintPause
                | SettingKey::PnpXSpeed
                | SettingKey::PnpYSpeed
                | SettingKey::PnpXAccel
                | SettingKey::PnpYAccel
                | SettingKey::PnpSensorTimeout
        )
    }

    /// Parse the part of a `SET_<KEY>` action after `SET_`
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "PAINTING_OFFSET_X" => return Some(SettingKey::PaintingOffsetX),
            "PAINTING_OFFSET_Y" => return Some(SettingKey::PaintingOffsetY),
            "POSTPRINTPAUSE" => return Some(SettingKey::PostPrintPause),
            "PNP_X_SPEED" => return Some(SettingKey::PnpXSpeed),
            "PNP_Y_SPEED" => return Some(SettingKey::PnpYSpeed),
            "PNP_X_ACCEL" => return Some(SettingKey::PnpXAccel),
            "PNP_Y_ACCEL" => return Some(SettingKey::PnpYAccel),
            "PNP_SENSOR_TIMEOUT" => return Some(SettingKey::PnpSensorTimeout),
            _ => {}
        }

        if let Some(digit) = name.strip_prefix("SERVO_ANGLE_SIDE") {
            let side = SideId::from_wire(digit)?;
            return Some(SettingKey::Side(side, SideField::ToolAngle));
        }

        let rest = name.strip_prefix("SIDE")?;
        let side = SideId::from_wire(rest.get(..1)?)?;
        let field = match rest.get(1..)? {
            "ZHEIGHT" => SideField::ZHeight,
            "SIDEZHEIGHT" => SideField::SideZHeight,
            "_ROTATION" => SideField::RotationAngle,
            "PAINTINGXSPEED" => SideField::PaintingXSpeed,
            "PAINTINGYSPEED" => SideField::PaintingYSpeed,
            "STARTX" => SideField::StartX,
            "STARTY" => SideField::StartY,
            "SWEEPY" => SideField::SweepY,
            "SHIFTX" => SideField::ShiftX,
            _ => return None,
        };
        Some(SettingKey::Side(side, field))
    }

    /// Write the dashboard name of this key (as used in `SETTING:` replies)
    pub fn write_name<W: fmt::Write>(&self, w: &mut W) -> fmt::Result {
        match self {
            SettingKey::Side(side, SideField::ToolAngle) => {
                write!(w, "servoAngleSide{}", side.number())
            }
            SettingKey::Side(side, field) => {
                let suffix = match field {
                    SideField::ZHeight => "ZHeight",
                    SideField::SideZHeight => "SideZHeight",
                    SideField::RotationAngle => "RotationAngle",
                    SideField::PaintingXSpeed => "PaintingXSpeed",
                    SideField::PaintingYSpeed => "PaintingYSpeed",
                    SideField::StartX => "StartX",
                    SideField::StartY => "StartY",
                    SideField::SweepY => "SweepY",
                    SideField::ShiftX => "ShiftX",
                    SideField::ToolAngle => "ToolAngle",
                };
                write!(w, "side{}{}", side.number(), suffix)
            }
            SettingKey::PaintingOffsetX => w.write_str("paintingOffsetX"),
            SettingKey::PaintingOffsetY => w.write_str("paintingOffsetY"),
            SettingKey::PostPrintPause => w.write_str("postPrintPause"),
            SettingKey::PnpXSpeed => w.write_str("pnpXSpeed"),
            SettingKey::PnpYSpeed => w.write_str("pnpYSpeed"),
            SettingKey::PnpXAccel => w.write_str("pnpXAccel"),
            SettingKey::PnpYAccel => w.write_str("pnpYAccel"),
            SettingKey::PnpSensorTimeout => w.write_str("pnpSensorTimeout"),
        }
    }
}

/// Direction for the manual fixture turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RotateDirection {
    Clockwise,
    CounterClockwise,
}

/// Errors from parsing a command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Blank line
    Empty,
    /// Action word not recognised
    UnknownCommand,
    /// Required argument missing
    MissingValue,
    /// Argument present but not a number
    InvalidValue,
}

impl ParseError {
    /// Human readable reason, sent back to the console
    pub fn reason(self) -> &'static str {
        match self {
            ParseError::Empty => "Empty command",
            ParseError::UnknownCommand => "Unknown command",
            ParseError::MissingValue => "Missing value",
            ParseError::InvalidValue => "Invalid value",
        }
    }
}

/// A command from the operator console
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Abort whatever is running and home all axes (`HOME`, `HOME_ALL`)
    Home,
    /// Paint one side standalone, then home
    PaintSide(SideId),
    /// Paint all four sides for a number of coats
    PaintAllSides { coats: u8, inter_coat_delay_s: u16 },
    /// Clean the gun, then paint all four sides (`CLEAN_AND_PAINT_ALL_SIDES`)
    CleanAndPaintAllSides { coats: u8, inter_coat_delay_s: u16 },
    Pause,
    Resume,
    /// Start the pick-and-place cycle (`ENTER_PICKPLACE`)
    EnterPickPlace,
    /// Run the gun cleaning routine (`CLEAN_GUN[:SHORT]`)
    CleanGun { short: bool },
    InspectTipOn,
    InspectTipOff,
    InspectTipToPainting,
    InspectTipToPnp,
    /// Absolute move in inches, optional Z and tool angle
    ManualMoveTo {
        x: f32,
        y: f32,
        z: Option<f32>,
        tool_angle: Option<f32>,
    },
    /// Quarter turn of the fixture that does not change the tracked angle
    ManualRotate(RotateDirection),
    GotoPickLocation,
    /// Preview a Z height (inches) while tuning
    MoveZPreview(f32),
    /// Preview a tool servo angle while tuning
    MoveServoPreview(f32),
    PaintGun(bool),
    PressurePot(bool),
    TogglePressurePot,
    Vacuum(bool),
    PickCylinder(bool),
    Set { key: SettingKey, value: f32 },
    SaveSettings,
    ResetSettings,
    GetSettings,
    Status,
    ClearError,
}

impl Command {
    /// Parse a command line
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ParseError::Empty);
        }

        let (action, args) = match line.find(':') {
            Some(i) => (&line[..i], Some(line[i + 1..].trim())),
            None => (line, None),
        };

        let cmd = match action {
            "HOME" | "HOME_ALL" => Command::Home,
            "PAINT_ALL_SIDES" | "PAINT_ALL_SIDES_MULTIPLE" | "PAINT_MULTIPLE_COATS" => {
                let (coats, inter_coat_delay_s) = parse_coats(args)?;
                Command::PaintAllSides {
                    coats,
                    inter_coat_delay_s,
                }
            }
            "CLEAN_AND_PAINT_ALL_SIDES" => {
                let (coats, inter_coat_delay_s) = parse_coats(args)?;
                Command::CleanAndPaintAllSides {
                    coats,
                    inter_coat_delay_s,
                }
            }
            "PAUSE" => Command::Pause,
            "RESUME" => Command::Resume,
            "ENTER_PICKPLACE" => Command::EnterPickPlace,
            "CLEAN_GUN" => match args {
                None | Some("") => Command::CleanGun { short: false },
                Some("SHORT") => Command::CleanGun { short: true },
                Some(_) => return Err(ParseError::InvalidValue),
            },
            "INSPECT_TIP_ON" => Command::InspectTipOn,
            "INSPECT_TIP_OFF" => Command::InspectTipOff,
            "INSPECT_TIP_TO_PAINTING" => Command::InspectTipToPainting,
            "INSPECT_TIP_TO_PNP" => Command::InspectTipToPnp,
            "MANUAL_MOVE_TO" => parse_manual_move(args)?,
            "MANUAL_ROTATE_CW" => Command::ManualRotate(RotateDirection::Clockwise),
            "MANUAL_ROTATE_CCW" => Command::ManualRotate(RotateDirection::CounterClockwise),
            "GOTO_PNP_PICK_LOCATION" => Command::GotoPickLocation,
            "MOVE_Z_PREVIEW" => Command::MoveZPreview(required_f32(args)?),
            "MOVE_SERVO_PREVIEW" => Command::MoveServoPreview(required_f32(args)?),
            "PAINT_GUN_ON" => Command::PaintGun(true),
            "PAINT_GUN_OFF" => Command::PaintGun(false),
            "PRESSURE_POT_ON" => Command::PressurePot(true),
            "PRESSURE_POT_OFF" => Command::PressurePot(false),
            "TOGGLE_PRESSURE_POT" => Command::TogglePressurePot,
            "VACUUM_ON" => Command::Vacuum(true),
            "VACUUM_OFF" => Command::Vacuum(false),
            "CYLINDER_EXTEND" => Command::PickCylinder(true),
            "CYLINDER_RETRACT" => Command::PickCylinder(false),
            "SAVE_PAINT_SETTINGS" => Command::SaveSettings,
            "RESET_PAINT_SETTINGS" => Command::ResetSettings,
            "GET_PAINT_SETTINGS" => Command::GetSettings,
            "STATUS" => Command::Status,
            "CLEAR_ERROR" => Command::ClearError,
            _ => {
                if let Some(number) = action.strip_prefix("PAINT_SIDE_") {
                    let side = SideId::from_wire(number).ok_or(ParseError::UnknownCommand)?;
                    Command::PaintSide(side)
                } else if let Some(name) = action.strip_prefix("SET_") {
                    let key = SettingKey::from_wire(name).ok_or(ParseError::UnknownCommand)?;
                    Command::Set {
                        key,
                        value: required_f32(args)?,
                    }
                } else {
                    return Err(ParseError::UnknownCommand);
                }
            }
        };

        Ok(cmd)
    }

    /// Action word used when acknowledging this command
    pub fn name(&self) -> &'static str {
        match self {
            Command::Home => "HOME",
            Command::PaintSide(SideId::One) => "PAINT_SIDE_1",
            Command::PaintSide(SideId::Two) => "PAINT_SIDE_2",
            Command::PaintSide(SideId::Three) => "PAINT_SIDE_3",
            Command::PaintSide(SideId::Four) => "PAINT_SIDE_4",
            Command::PaintAllSides { .. } => "PAINT_ALL_SIDES",
            Command::CleanAndPaintAllSides { .. } => "CLEAN_AND_PAINT_ALL_SIDES",
            Command::Pause => "PAUSE",
            Command::Resume => "RESUME",
            Command::EnterPickPlace => "ENTER_PICKPLACE",
            Command::CleanGun { .. } => "CLEAN_GUN",
            Command::InspectTipOn => "INSPECT_TIP_ON",
            Command::InspectTipOff => "INSPECT_TIP_OFF",
            Command::InspectTipToPainting => "INSPECT_TIP_TO_PAINTING",
            Command::InspectTipToPnp => "INSPECT_TIP_TO_PNP",
            Command::ManualMoveTo { .. } => "MANUAL_MOVE_TO",
            Command::ManualRotate(RotateDirection::Clockwise) => "MANUAL_ROTATE_CW",
            Command::ManualRotate(RotateDirection::CounterClockwise) => "MANUAL_ROTATE_CCW",
            Command::GotoPickLocation => "GOTO_PNP_PICK_LOCATION",
            Command::MoveZPreview(_) => "MOVE_Z_PREVIEW",
            Command::MoveServoPreview(_) => "MOVE_SERVO_PREVIEW",
            Command::PaintGun(true) => "PAINT_GUN_ON",
            Command::PaintGun(false) => "PAINT_GUN_OFF",
            Command::PressurePot(true) => "PRESSURE_POT_ON",
            Command::PressurePot(false) => "PRESSURE_POT_OFF",
            Command::TogglePressurePot => "TOGGLE_PRESSURE_POT",
            Command::Vacuum(true) => "VACUUM_ON",
            Command::Vacuum(false) => "VACUUM_OFF",
            Command::PickCylinder(true) => "CYLINDER_EXTEND",
            Command::PickCylinder(false) => "CYLINDER_RETRACT",
            Command::Set { .. } => "SET",
            Command::SaveSettings => "SAVE_PAINT_SETTINGS",
            Command::ResetSettings => "RESET_PAINT_SETTINGS",
            Command::GetSettings => "GET_PAINT_SETTINGS",
            Command::Status => "STATUS",
            Command::ClearError => "CLEAR_ERROR",
        }
    }
}

/// `coats[:delay_s]`, with out-of-range values clamped
fn parse_coats(args: Option<&str>) -> Result<(u8, u16), ParseError> {
    let mut coats = DEFAULT_COATS;
    let mut delay_s = DEFAULT_INTER_COAT_DELAY_S;

    if let Some(args) = args.filter(|a| !a.is_empty()) {
        let mut parts = args.split(':');
        if let Some(raw) = parts.next() {
            let requested = parse_i32(raw)?;
            coats = requested.clamp(1, MAX_COATS as i32) as u8;
        }
        if let Some(raw) = parts.next() {
            let requested = parse_i32(raw)?;
            delay_s = requested.clamp(0, MAX_INTER_COAT_DELAY_S as i32) as u16;
        }
    }

    Ok((coats, delay_s))
}

/// `x,y[,z[,angle]]`
fn parse_manual_move(args: Option<&str>) -> Result<Command, ParseError> {
    let args = args.ok_or(ParseError::MissingValue)?;
    let mut parts = args.split(',').map(str::trim);

    let x = required_f32(parts.next())?;
    let y = required_f32(parts.next())?;
    let z = optional_f32(parts.next())?;
    let tool_angle = optional_f32(parts.next())?;

    Ok(Command::ManualMoveTo {
        x,
        y,
        z,
        tool_angle,
    })
}

fn required_f32(raw: Option<&str>) -> Result<f32, ParseError> {
    optional_f32(raw)?.ok_or(ParseError::MissingValue)
}

fn optional_f32(raw: Option<&str>) -> Result<Option<f32>, ParseError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text
            .parse::<f32>()
            .map(Some)
            .map_err(|_| ParseError::InvalidValue),
    }
}

fn parse_i32(raw: &str) -> Result<i32, ParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ParseError::MissingValue);
    }
    raw.parse::<i32>().map_err(|_| ParseError::InvalidValue)
}
