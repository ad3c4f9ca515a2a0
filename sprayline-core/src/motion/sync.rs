//! Paint-while-moving synchronizer
//!
//! Runs one sweep of a single axis (or the gang Y pair) and gates the spray
//! valve by where the sweep is. The gate opens `lead_in` into the sweep and
//! closes `lead_out` before its end, measured either by axis position or by
//! elapsed time against the ideal duration `distance / speed`. Time gating
//! is used for the gang pair, where two motor positions could disagree.
//!
//! Each edge fires at most once per sweep. Once the closing edge has fired
//! the opening edge can no longer fire, so an empty window never sprays.
//! The valve is off on every way out of the sweep.

use core::task::Poll;

use crate::control::Control;
use crate::traits::{ActuatorIo, MotorAxis};

/// Axis a sweep runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SweepAxis {
    X,
    /// Gang-coupled Y pair
    Y,
}

/// How the firing window is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GateMode {
    /// Distance travelled along the sweep
    Position,
    /// Moving time against the ideal sweep duration
    Time,
}

/// Firing window of one sweep, in steps from either end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Gate {
    pub lead_in: u32,
    pub lead_out: u32,
    pub mode: GateMode,
}

/// One gated sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sweep {
    pub axis: SweepAxis,
    /// Absolute end position (steps)
    pub target: i32,
    pub speed_hz: u32,
    pub gate: Gate,
}

/// How a sweep ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SweepOutcome {
    Completed,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum SyncPhase {
    Moving,
    /// Stopped by a hold; `since` is when the hold began
    Held { since: u32, valve_was_on: bool },
    Done,
}

/// Runs one [`Sweep`] to completion
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionSynchronizer {
    sweep: Sweep,
    phase: SyncPhase,
    start_pos: i32,
    /// +1 or -1
    dir: i32,
    length: u32,
    started_ms: u32,
    /// Time spent held, excluded from the moving time
    held_ms: u32,
    on_fired: bool,
    off_fired: bool,
}

impl MotionSynchronizer {
    /// Start the sweep from wherever the axis is now
    pub fn start<A, I>(sweep: Sweep, axis: &mut A, io: &mut I, now_ms: u32) -> Self
    where
        A: MotorAxis + ?Sized,
        I: ActuatorIo + ?Sized,
    {
        let start_pos = axis.position();
        let delta = sweep.target as i64 - start_pos as i64;

        io.set_spray_valve(false);
        axis.set_speed_hz(sweep.speed_hz.max(1));
        axis.move_to(sweep.target);

        Self {
            sweep,
            phase: SyncPhase::Moving,
            start_pos,
            dir: if delta < 0 { -1 } else { 1 },
            length: delta.unsigned_abs() as u32,
            started_ms: now_ms,
            held_ms: 0,
            on_fired: false,
            off_fired: false,
        }
    }

    pub fn axis(&self) -> SweepAxis {
        self.sweep.axis
    }

    /// Ideal moving time (ms) to cover `steps` at the sweep speed
    fn time_for(&self, steps: u32) -> u32 {
        (steps as u64 * 1_000 / self.sweep.speed_hz.max(1) as u64) as u32
    }

    /// Gate thresholds and current progress in the gate's unit
    fn progress<A: MotorAxis + ?Sized>(&self, axis: &A, now_ms: u32) -> (u32, u32, u32) {
        let open_at = self.sweep.gate.lead_in;
        let close_at = self.length.saturating_sub(self.sweep.gate.lead_out);
        match self.sweep.gate.mode {
            GateMode::Position => {
                let travelled = (axis.position() as i64 - self.start_pos as i64) * self.dir as i64;
                (travelled.max(0) as u32, open_at, close_at)
            }
            GateMode::Time => {
                let moving = now_ms.wrapping_sub(self.started_ms).saturating_sub(self.held_ms);
                (moving, self.time_for(open_at), self.time_for(close_at))
            }
        }
    }

    fn apply_gate<A, I>(&mut self, axis: &A, io: &mut I, now_ms: u32)
    where
        A: MotorAxis + ?Sized,
        I: ActuatorIo + ?Sized,
    {
        let (progress, open_at, close_at) = self.progress(axis, now_ms);

        if !self.off_fired && progress >= close_at {
            self.off_fired = true;
            io.set_spray_valve(false);
        }
        if !self.on_fired && !self.off_fired && progress >= open_at {
            self.on_fired = true;
            io.set_spray_valve(true);
        }
    }

    fn finish<I: ActuatorIo + ?Sized>(
        &mut self,
        io: &mut I,
        outcome: SweepOutcome,
    ) -> Poll<SweepOutcome> {
        io.set_spray_valve(false);
        self.phase = SyncPhase::Done;
        Poll::Ready(outcome)
    }

    /// Advance the sweep by one tick
    pub fn poll<A, I>(
        &mut self,
        axis: &mut A,
        io: &mut I,
        control: Control,
        now_ms: u32,
    ) -> Poll<SweepOutcome>
    where
        A: MotorAxis + ?Sized,
        I: ActuatorIo + ?Sized,
    {
        if control.is_abort() {
            if self.phase != SyncPhase::Done {
                axis.force_stop();
            }
            return self.finish(io, SweepOutcome::Aborted);
        }

        match self.phase {
            SyncPhase::Done => Poll::Ready(SweepOutcome::Completed),
            SyncPhase::Moving => {
                if control == Control::Hold {
                    axis.force_stop();
                    let valve_was_on = io.spray_valve();
                    io.set_spray_valve(false);
                    self.phase = SyncPhase::Held {
                        since: now_ms,
                        valve_was_on,
                    };
                    return Poll::Pending;
                }

                self.apply_gate(axis, io, now_ms);
                if axis.is_running() {
                    Poll::Pending
                } else {
                    self.finish(io, SweepOutcome::Completed)
                }
            }
            SyncPhase::Held { since, valve_was_on } => {
                if control == Control::Hold {
                    return Poll::Pending;
                }
                self.held_ms = self.held_ms.wrapping_add(now_ms.wrapping_sub(since));
                self.phase = SyncPhase::Moving;
                axis.set_speed_hz(self.sweep.speed_hz.max(1));
                axis.move_to(self.sweep.target);
                if valve_was_on && self.on_fired && !self.off_fired {
                    io.set_spray_valve(true);
                }
                Poll::Pending
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingIo, SimAxis};
    use proptest::prelude::*;

    fn sweep(target: i32, speed_hz: u32, lead_in: u32, lead_out: u32, mode: GateMode) -> Sweep {
        Sweep {
            axis: SweepAxis::X,
            target,
            speed_hz,
            gate: Gate {
                lead_in,
                lead_out,
                mode,
            },
        }
    }

    /// Run to completion with a flat-speed axis; `hold` returns the control per tick
    fn run(
        s: Sweep,
        axis: &mut SimAxis,
        io: &mut RecordingIo,
        mut hold: impl FnMut(u32) -> Control,
    ) -> (SweepOutcome, u32) {
        let mut now = 0;
        let mut sync = MotionSynchronizer::start(s, axis, io, now);
        loop {
            now += 1;
            axis.poll(now);
            io.now_ms = now;
            if let Poll::Ready(outcome) = sync.poll(axis, io, hold(now), now) {
                return (outcome, now);
            }
            assert!(now < 1_000_000, "sweep never finished");
        }
    }

    #[test]
    fn test_position_gate_forward() {
        let mut axis = SimAxis::new();
        let mut io = RecordingIo::default();
        let s = sweep(1_000, 1_000, 100, 200, GateMode::Position);

        let (outcome, _) = run(s, &mut axis, &mut io, |_| Control::Proceed);
        assert_eq!(outcome, SweepOutcome::Completed);
        assert_eq!(axis.position(), 1_000);
        assert!(!io.spray_valve());

        let on = io.valve_on_at().unwrap();
        let off = io.valve_off_at().unwrap();
        assert!((100..=101).contains(&on), "on at {}", on);
        assert!((800..=801).contains(&off), "off at {}", off);
    }

    #[test]
    fn test_position_gate_backward_is_sign_aware() {
        let mut axis = SimAxis::new();
        axis.set_position(2_000);
        let mut io = RecordingIo::default();
        let s = sweep(1_000, 1_000, 100, 200, GateMode::Position);

        run(s, &mut axis, &mut io, |_| Control::Proceed);
        let on = io.valve_on_at().unwrap();
        let off = io.valve_off_at().unwrap();
        assert!((100..=101).contains(&on));
        assert!((800..=801).contains(&off));
    }

    #[test]
    fn test_empty_window_never_sprays() {
        let mut axis = SimAxis::new();
        let mut io = RecordingIo::default();
        let s = sweep(100, 1_000, 80, 80, GateMode::Time);

        run(s, &mut axis, &mut io, |_| Control::Proceed);
        assert_eq!(io.valve_on_at(), None);
    }

    #[test]
    fn test_zero_length_sweep_completes() {
        let mut axis = SimAxis::new();
        let mut io = RecordingIo::default();
        let s = sweep(0, 1_000, 10, 10, GateMode::Position);

        let (outcome, took) = run(s, &mut axis, &mut io, |_| Control::Proceed);
        assert_eq!(outcome, SweepOutcome::Completed);
        assert_eq!(took, 1);
        assert_eq!(io.valve_on_at(), None);
    }

    #[test]
    fn test_hold_inside_window_rearms() {
        let mut axis = SimAxis::new();
        let mut io = RecordingIo::default();
        let s = sweep(2_000, 1_000, 100, 100, GateMode::Time);

        // Held from 500 ms to 800 ms, well inside the window
        let (outcome, finished) = run(s, &mut axis, &mut io, |t| {
            if (500..800).contains(&t) {
                Control::Hold
            } else {
                Control::Proceed
            }
        });

        assert_eq!(outcome, SweepOutcome::Completed);
        assert_eq!(axis.position(), 2_000);
        assert!(!io.spray_valve());

        // on, off (hold), on (resume), off (end of window)
        let changes: heapless::Vec<bool, 8> = io.valve_log.iter().map(|&(_, on)| on).collect();
        assert_eq!(changes.as_slice(), &[true, false, true, false]);

        // Closing edge is shifted by the 300 ms hold
        let (close_ms, _) = io.valve_log[3];
        assert!((2_199..=2_202).contains(&close_ms), "closed at {}", close_ms);
        assert!(finished >= 2_300);
    }

    #[test]
    fn test_hold_before_window_stays_off() {
        let mut axis = SimAxis::new();
        let mut io = RecordingIo::default();
        let s = sweep(1_000, 1_000, 300, 100, GateMode::Time);

        run(s, &mut axis, &mut io, |t| {
            if (50..150).contains(&t) {
                Control::Hold
            } else {
                Control::Proceed
            }
        });

        // Single clean window, opened after the hold
        assert_eq!(io.valve_log.len(), 2);
        let (open_ms, _) = io.valve_log[0];
        assert!((399..=402).contains(&open_ms), "opened at {}", open_ms);
    }

    #[test]
    fn test_position_hold_inside_window_rearms() {
        let mut axis = SimAxis::new();
        let mut io = RecordingIo::default();
        let s = sweep(2_000, 1_000, 100, 100, GateMode::Position);

        let (outcome, finished) = run(s, &mut axis, &mut io, |t| {
            if (500..800).contains(&t) {
                Control::Hold
            } else {
                Control::Proceed
            }
        });

        assert_eq!(outcome, SweepOutcome::Completed);
        assert_eq!(axis.position(), 2_000);
        assert!(!io.spray_valve());
        assert_eq!(io.valve_log[1], (500, false));

        let changes: heapless::Vec<bool, 8> = io.valve_log.iter().map(|&(_, on)| on).collect();
        assert_eq!(changes.as_slice(), &[true, false, true, false]);

        // Reopened on resume, closed 100 steps before the end
        let (reopen_ms, _) = io.valve_log[2];
        let (close_ms, _) = io.valve_log[3];
        assert_eq!(reopen_ms, 800);
        assert!((2_199..=2_202).contains(&close_ms), "closed at {}", close_ms);
        assert!(finished >= 2_300);
    }

    #[test]
    fn test_position_hold_before_window_stays_off() {
        let mut axis = SimAxis::new();
        let mut io = RecordingIo::default();
        let s = sweep(1_000, 1_000, 300, 100, GateMode::Position);

        run(s, &mut axis, &mut io, |t| {
            if (50..150).contains(&t) {
                Control::Hold
            } else {
                Control::Proceed
            }
        });

        // No spray during the hold, one window opened 300 steps in
        assert_eq!(io.valve_log.len(), 2);
        let (open_ms, on) = io.valve_log[0];
        assert!(on);
        assert!((399..=402).contains(&open_ms), "opened at {}", open_ms);
    }

    #[test]
    fn test_position_hold_after_window_stays_off() {
        let mut axis = SimAxis::new();
        let mut io = RecordingIo::default();
        let s = sweep(2_000, 1_000, 100, 200, GateMode::Position);

        let (outcome, _) = run(s, &mut axis, &mut io, |t| {
            if (1_900..2_000).contains(&t) {
                Control::Hold
            } else {
                Control::Proceed
            }
        });
        assert_eq!(outcome, SweepOutcome::Completed);
        assert_eq!(axis.position(), 2_000);

        let changes: heapless::Vec<bool, 8> = io.valve_log.iter().map(|&(_, on)| on).collect();
        assert_eq!(changes.as_slice(), &[true, false]);
    }

    #[test]
    fn test_abort_forces_valve_off() {
        let mut axis = SimAxis::new();
        let mut io = RecordingIo::default();
        let s = sweep(5_000, 1_000, 10, 10, GateMode::Position);

        let (outcome, at) = run(s, &mut axis, &mut io, |t| {
            if t >= 200 {
                Control::Abort(crate::control::AbortKind::Hard)
            } else {
                Control::Proceed
            }
        });
        assert_eq!(outcome, SweepOutcome::Aborted);
        assert_eq!(at, 200);
        assert!(!axis.is_running());
        assert!(!io.spray_valve());
        assert!(axis.position() < 5_000);
    }

    proptest! {
        #[test]
        fn prop_time_window_matches_ideal_duration(
            length in 200u32..4_000,
            speed in 500u32..5_000,
            lead_in_pct in 0u32..40,
            lead_out_pct in 0u32..40,
        ) {
            let lead_in = length * lead_in_pct / 100;
            let lead_out = length * lead_out_pct / 100;
            let mut axis = SimAxis::new();
            let mut io = RecordingIo::default();
            let s = sweep(length as i32, speed, lead_in, lead_out, GateMode::Time);

            run(s, &mut axis, &mut io, |_| Control::Proceed);

            prop_assert!(!io.spray_valve());
            let expected_on = lead_in as u64 * 1_000 / speed as u64;
            let expected_off = (length - lead_out) as u64 * 1_000 / speed as u64;
            if let Some(on) = io.valve_on_at() {
                prop_assert!((on as u64).abs_diff(expected_on) <= 1);
            }
            if let Some(off) = io.valve_off_at() {
                prop_assert!((off as u64).abs_diff(expected_off) <= 1);
            }
        }
    }
}
