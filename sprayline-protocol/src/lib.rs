//! Sprayline operator protocol
//!
//! This crate defines the text protocol spoken between the machine
//! controller and the operator console (dashboard or serial terminal).
//!
//! # Protocol Overview
//!
//! Every message is a single ASCII line terminated by `\n`:
//! ```text
//! console -> controller   ACTION[:ARG[:ARG...]]     e.g. PAINT_ALL_SIDES:3:10
//! controller -> console   TOPIC:PAYLOAD             e.g. STATE:PAINTING_SIDE_4
//! ```
//!
//! Commands are case-sensitive upper-case words. Replies are pushed by the
//! controller whenever the machine changes state; the console never polls.

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod line;
pub mod reply;

pub use command::{Command, ParseError, RotateDirection, SettingKey, SideField, SideId};
pub use line::{Line, LineError, LineReader, MAX_LINE_LEN};
pub use reply::{Reply, MAX_REPLY_LEN};
