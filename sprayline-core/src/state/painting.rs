//! Paint-all-sides sequencer
//!
//! Runs Side 4, 3, 2, 1 for each coat. The sequencer hands control to the
//! side state and gets it back through `on_side_completed`; whether a
//! side returns here or goes straight home is decided by the sticky
//! `paint_all_sides_mode` flag.
//!
//! ```text
//! prepare -> [side 4, 3, 2, 1 -> after coat -> between coats]* -> finish -> Homing
//! ```

use core::task::Poll;

use sprayline_protocol::SideId;

use crate::control::Control;
use crate::hardware::{Context, Platform};
use crate::motion::{Sequence, SequenceFull, SequenceOutcome};
use crate::painting;
use crate::traits::{ActuatorIo, TelemetryEvent};

use super::id::StateId;
use super::machine::{State, Transition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Phase {
    Preparing,
    NextSide,
    AfterCoat,
    BetweenCoats,
    Finishing,
    Done,
}

#[derive(Debug)]
pub struct PaintingState {
    phase: Phase,
    coat: u8,
    total_coats: u8,
    delay_s: u16,
    sides_done: usize,
    script: Sequence,
}

impl Default for PaintingState {
    fn default() -> Self {
        Self::new()
    }
}

impl PaintingState {
    pub const fn new() -> Self {
        Self {
            phase: Phase::Done,
            coat: 0,
            total_coats: 0,
            delay_s: 0,
            sides_done: 0,
            script: Sequence::new(),
        }
    }

    /// Called by the machine when a side hands control back
    pub fn on_side_completed(&mut self) {
        self.sides_done += 1;
    }

    /// Sides finished in the current coat
    pub fn sides_done(&self) -> usize {
        self.sides_done
    }

    /// Coat in progress (1-based)
    pub fn coat(&self) -> u8 {
        self.coat
    }

    fn run(&mut self, script: Result<Sequence, SequenceFull>, phase: Phase) -> Transition {
        match script {
            Ok(script) => {
                self.script = script;
                self.phase = phase;
                Transition::Stay
            }
            Err(SequenceFull) => Transition::To(StateId::Error),
        }
    }

    fn side_finished_phase(&mut self) -> Transition {
        if self.sides_done >= SideId::COAT_ORDER.len() {
            self.run(painting::after_coat(), Phase::AfterCoat)
        } else {
            self.phase = Phase::NextSide;
            Transition::Stay
        }
    }
}

impl<P: Platform> State<P> for PaintingState {
    fn enter(&mut self, ctx: &mut Context<'_, P>) -> Transition {
        // Back from a side: a pause taken during it still stands
        if ctx.flags.transitioning_to_paint_all_sides {
            ctx.flags.paused = false;
            ctx.flags.transitioning_to_paint_all_sides = false;
            ctx.flags.paint_all_sides_mode = true;
            self.coat = 1;
            self.total_coats = ctx.flags.requested_coats.max(1);
            self.delay_s = ctx.flags.inter_coat_delay_s;
            self.sides_done = 0;
            return self.run(painting::prepare(), Phase::Preparing);
        }

        if !ctx.flags.paint_all_sides_mode {
            return Transition::To(StateId::Idle);
        }
        self.side_finished_phase()
    }

    fn update(&mut self, ctx: &mut Context<'_, P>) -> Transition {
        if self.phase == Phase::NextSide {
            if ctx.control() == Control::Hold {
                return Transition::Stay;
            }
            return match SideId::COAT_ORDER.get(self.sides_done) {
                Some(&side) => Transition::To(StateId::Side(side)),
                None => self.side_finished_phase(),
            };
        }
        if self.phase == Phase::Done {
            return Transition::To(StateId::Homing);
        }

        let control = ctx.control();
        match self.script.poll(ctx.hw, control, ctx.now_ms) {
            Poll::Pending | Poll::Ready(SequenceOutcome::Aborted) => Transition::Stay,
            Poll::Ready(SequenceOutcome::Completed) => match self.phase {
                Phase::Preparing => {
                    self.phase = Phase::NextSide;
                    Transition::Stay
                }
                Phase::AfterCoat => {
                    ctx.emit(TelemetryEvent::CoatFinished {
                        coat: self.coat,
                        total: self.total_coats,
                    });
                    if self.coat < self.total_coats {
                        self.run(painting::between_coats(self.delay_s), Phase::BetweenCoats)
                    } else {
                        self.run(
                            painting::finish(ctx.settings.post_print_pause_ms),
                            Phase::Finishing,
                        )
                    }
                }
                Phase::BetweenCoats => {
                    self.coat += 1;
                    self.sides_done = 0;
                    self.phase = Phase::NextSide;
                    Transition::Stay
                }
                Phase::Finishing | Phase::NextSide | Phase::Done => {
                    ctx.flags.paint_all_sides_mode = false;
                    self.phase = Phase::Done;
                    Transition::To(StateId::Homing)
                }
            },
        }
    }

    fn exit(&mut self, ctx: &mut Context<'_, P>) {
        ctx.hw.io.set_spray_valve(false);
    }
}
