//! Controller to console messages
//!
//! Every reply is one `TOPIC:PAYLOAD` line. The topics mirror what the
//! dashboard listens for: `STATE`, `STATUS`, `CMD_ACK`, `CMD_ERROR`,
//! `SETTING`, `PRESSURE_POT_STATUS`, `POSITION`, `HOMING`, `PNP`, `COAT`
//! and `FAULT`.

use core::fmt::{self, Write};

use heapless::String;

use crate::command::SettingKey;

/// Longest encoded reply including the trailing newline
pub const MAX_REPLY_LEN: usize = 96;

/// A message pushed to the console
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    /// Machine entered a state (`STATE:PAINTING_SIDE_4`)
    State(&'static str),
    /// Operator pause took effect
    Paused,
    /// Operator resume took effect
    Resumed,
    /// Command accepted
    Ack(&'static str),
    /// Command refused in the current state
    Rejected {
        command: &'static str,
        reason: &'static str,
    },
    /// Line could not be parsed
    Invalid(&'static str),
    /// One setting value
    Setting { key: SettingKey, value: f32 },
    /// Pressure pot output level
    PressurePot(bool),
    /// Axis positions in inches and degrees
    Position {
        x: f32,
        y: f32,
        z: f32,
        rotation: f32,
    },
    /// Homing run finished
    Homing { success: bool },
    /// One pick-and-place cycle finished
    PnpPlaced { placed: u8, total: u8 },
    /// One full coat (all four sides) finished
    Coat { finished: u8, total: u8 },
    /// Operation stopped by a fault
    Fault(&'static str),
}

impl Reply {
    /// Write the reply text without the line terminator
    pub fn write_to<W: Write>(&self, w: &mut W) -> fmt::Result {
        match self {
            Reply::State(name) => write!(w, "STATE:{}", name),
            Reply::Paused => w.write_str("STATUS:PAUSED"),
            Reply::Resumed => w.write_str("STATUS:RESUMED"),
            Reply::Ack(command) => write!(w, "CMD_ACK: {}", command),
            Reply::Rejected { command, reason } => {
                write!(w, "CMD_ERROR: {} rejected: {}", command, reason)
            }
            Reply::Invalid(reason) => write!(w, "CMD_ERROR: {}", reason),
            Reply::Setting { key, value } => {
                w.write_str("SETTING:")?;
                key.write_name(w)?;
                if key.is_integer() {
                    write!(w, ":{}", *value as i32)
                } else {
                    write!(w, ":{:.2}", value)
                }
            }
            Reply::PressurePot(on) => {
                write!(w, "PRESSURE_POT_STATUS:{}", if *on { "ON" } else { "OFF" })
            }
            Reply::Position { x, y, z, rotation } => {
                write!(w, "POSITION:{:.3},{:.3},{:.3},{:.1}", x, y, z, rotation)
            }
            Reply::Homing { success } => {
                write!(w, "HOMING:{}", if *success { "COMPLETE" } else { "FAILED" })
            }
            Reply::PnpPlaced { placed, total } => write!(w, "PNP:PLACED:{}/{}", placed, total),
            Reply::Coat { finished, total } => write!(w, "COAT:{}/{}", finished, total),
            Reply::Fault(what) => write!(w, "FAULT:{}", what),
        }
    }

    /// Encode the reply as a newline-terminated line
    pub fn encode(&self) -> Result<String<MAX_REPLY_LEN>, fmt::Error> {
        let mut line = String::new();
        self.write_to(&mut line)?;
        line.push('\n').map_err(|_| fmt::Error)?;
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{SideField, SideId};

    fn encoded(reply: Reply) -> String<MAX_REPLY_LEN> {
        reply.encode().unwrap()
    }

    #[test]
    fn test_state_line() {
        assert_eq!(encoded(Reply::State("HOMING")).as_str(), "STATE:HOMING\n");
    }

    #[test]
    fn test_ack_and_rejection() {
        assert_eq!(encoded(Reply::Ack("HOME")).as_str(), "CMD_ACK: HOME\n");
        assert_eq!(
            encoded(Reply::Rejected {
                command: "PAINT_SIDE_1",
                reason: "Machine not in IDLE state"
            })
            .as_str(),
            "CMD_ERROR: PAINT_SIDE_1 rejected: Machine not in IDLE state\n"
        );
    }

    #[test]
    fn test_setting_formats() {
        let z = Reply::Setting {
            key: SettingKey::Side(SideId::One, SideField::ZHeight),
            value: -2.0,
        };
        assert_eq!(encoded(z).as_str(), "SETTING:side1ZHeight:-2.00\n");

        let speed = Reply::Setting {
            key: SettingKey::Side(SideId::Three, SideField::PaintingXSpeed),
            value: 5000.0,
        };
        assert_eq!(encoded(speed).as_str(), "SETTING:side3PaintingXSpeed:5000\n");
    }

    #[test]
    fn test_progress_lines() {
        assert_eq!(
            encoded(Reply::PnpPlaced { placed: 2, total: 5 }).as_str(),
            "PNP:PLACED:2/5\n"
        );
        assert_eq!(
            encoded(Reply::Coat {
                finished: 1,
                total: 3
            })
            .as_str(),
            "COAT:1/3\n"
        );
        assert_eq!(
            encoded(Reply::Homing { success: false }).as_str(),
            "HOMING:FAILED\n"
        );
    }

    #[test]
    fn test_position_line() {
        let reply = Reply::Position {
            x: 1.0,
            y: 0.3,
            z: -0.25,
            rotation: 90.0,
        };
        assert_eq!(encoded(reply).as_str(), "POSITION:1.000,0.300,-0.250,90.0\n");
    }
}
