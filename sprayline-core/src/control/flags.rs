//! Runtime flags shared by every state
//!
//! Pause and abort requests arrive between ticks (console commands or the
//! panel). Long operations never look at the flags directly: they ask
//! [`RuntimeFlags::control`] once per poll and act on the answer.

use sprayline_protocol::command::{DEFAULT_COATS, DEFAULT_INTER_COAT_DELAY_S};

use crate::state::StateId;

/// Where an abort came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AbortKind {
    /// Console `HOME` request
    Soft,
    /// Physical panel control
    Hard,
}

/// What a running operation should do right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Control {
    /// Keep going
    Proceed,
    /// Hold in place until released
    Hold,
    /// Stop everything and give up
    Abort(AbortKind),
}

impl Control {
    pub fn is_abort(self) -> bool {
        matches!(self, Control::Abort(_))
    }
}

/// Process-wide operator intent and painting mode
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RuntimeFlags {
    pub paused: bool,
    pub soft_abort: bool,
    pub hard_abort: bool,
    /// A side pattern is running
    pub active_painting: bool,
    /// Sticky for a whole paint-all-sides run
    pub paint_all_sides_mode: bool,
    /// One-shot: the next Painting entry starts a fresh run
    pub transitioning_to_paint_all_sides: bool,
    /// One-shot successor for the next state that looks for it
    pub next_state_override: Option<StateId>,
    pub requested_coats: u8,
    pub inter_coat_delay_s: u16,
    /// Next cleaning run uses the short spray burst
    pub short_clean: bool,
}

impl Default for RuntimeFlags {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeFlags {
    pub const fn new() -> Self {
        Self {
            paused: false,
            soft_abort: false,
            hard_abort: false,
            active_painting: false,
            paint_all_sides_mode: false,
            transitioning_to_paint_all_sides: false,
            next_state_override: None,
            requested_coats: DEFAULT_COATS,
            inter_coat_delay_s: DEFAULT_INTER_COAT_DELAY_S,
            short_clean: false,
        }
    }

    /// Single cancellation token consulted by every long operation
    ///
    /// Priority: hard abort, soft abort, hold (pause flag or the
    /// hold-to-continue button), proceed.
    pub fn control(&self, hold_pressed: bool) -> Control {
        if self.hard_abort {
            Control::Abort(AbortKind::Hard)
        } else if self.soft_abort {
            Control::Abort(AbortKind::Soft)
        } else if self.paused || hold_pressed {
            Control::Hold
        } else {
            Control::Proceed
        }
    }

    pub fn abort_requested(&self) -> bool {
        self.soft_abort || self.hard_abort
    }

    pub fn clear_abort(&mut self) {
        self.soft_abort = false;
        self.hard_abort = false;
    }

    /// Consume the one-shot successor override
    pub fn take_next_state_override(&mut self) -> Option<StateId> {
        self.next_state_override.take()
    }

    /// Drop everything an operation left behind (entering Idle or Error)
    pub fn clear_runtime(&mut self) {
        self.paused = false;
        self.clear_abort();
        self.active_painting = false;
        self.paint_all_sides_mode = false;
        self.transitioning_to_paint_all_sides = false;
        self.next_state_override = None;
        self.short_clean = false;
    }
}
