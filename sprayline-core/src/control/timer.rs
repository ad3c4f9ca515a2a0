//! Millisecond deadlines on a wrapping clock

/// A deadline measured from a start instant
///
/// All arithmetic wraps, so a deadline straddling the `u32` rollover of
/// the millisecond clock still expires on time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Deadline {
    started_ms: u32,
    duration_ms: u32,
}

impl Deadline {
    pub const fn start(now_ms: u32, duration_ms: u32) -> Self {
        Self {
            started_ms: now_ms,
            duration_ms,
        }
    }

    pub fn elapsed(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.started_ms)
    }

    pub fn is_done(&self, now_ms: u32) -> bool {
        self.elapsed(now_ms) >= self.duration_ms
    }

    pub fn duration(&self) -> u32 {
        self.duration_ms
    }

    /// Time left before expiry, zero once expired
    pub fn remaining(&self, now_ms: u32) -> u32 {
        self.duration_ms.saturating_sub(self.elapsed(now_ms))
    }
}
