//! Trapezoidal step-rate profile
//!
//! Software model of one stepper's motion, advanced in millisecond slices.
//! Step generators that only know a frequency (PIO, timers) read
//! [`RampProfile::step_rate_hz`] after each update, and the profile's
//! integrated position becomes the axis position.
//!
//! Speeds are kept in millisteps per second so that one millisecond of
//! acceleration is an integer: `dv = accel * dt_ms`.

/// Current motion mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum RampMode {
    /// Not moving
    Idle,
    /// Positioning move to an absolute target
    MoveTo(i32),
    /// Continuous run (+1 or -1)
    Run(i8),
}

/// Trapezoidal speed profile with position tracking
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RampProfile {
    mode: RampMode,
    /// Current position in steps
    position: i32,
    /// Current speed (millisteps/s, always >= 0)
    speed_mhz: u64,
    /// Sign of the current motion
    moving_dir: i8,
    /// Sub-step remainder (millisteps * ms)
    remainder: u64,
    max_speed_hz: u32,
    /// Acceleration in steps/s² (0 = instant)
    accel: u32,
}

impl Default for RampProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl RampProfile {
    pub const fn new() -> Self {
        Self {
            mode: RampMode::Idle,
            position: 0,
            speed_mhz: 0,
            moving_dir: 1,
            remainder: 0,
            max_speed_hz: 1_000,
            accel: 1_000,
        }
    }

    pub fn set_max_speed(&mut self, hz: u32) {
        self.max_speed_hz = hz.max(1);
    }

    pub fn set_acceleration(&mut self, steps_per_s2: u32) {
        self.accel = steps_per_s2;
    }

    pub fn move_to(&mut self, target: i32) {
        self.mode = if target == self.position && self.speed_mhz == 0 {
            RampMode::Idle
        } else {
            RampMode::MoveTo(target)
        };
    }

    pub fn run(&mut self, forward: bool) {
        self.mode = RampMode::Run(if forward { 1 } else { -1 });
    }

    /// Stop without deceleration
    pub fn stop_now(&mut self) {
        self.mode = RampMode::Idle;
        self.speed_mhz = 0;
        self.remainder = 0;
    }

    pub fn set_position(&mut self, steps: i32) {
        self.position = steps;
        self.remainder = 0;
        if let RampMode::MoveTo(target) = self.mode {
            if target == steps && self.speed_mhz == 0 {
                self.mode = RampMode::Idle;
            }
        }
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn is_running(&self) -> bool {
        self.mode != RampMode::Idle
    }

    /// Current step frequency (Hz)
    pub fn step_rate_hz(&self) -> u32 {
        (self.speed_mhz / 1_000) as u32
    }

    /// Sign of the current motion (+1 / -1)
    pub fn direction(&self) -> i8 {
        self.moving_dir
    }

    /// Steps needed to come to rest from the current speed
    fn stopping_distance(&self) -> u64 {
        if self.accel == 0 {
            return 0;
        }
        let v = self.speed_mhz / 1_000;
        v * v / (2 * self.accel as u64)
    }

    /// Advance the profile by `delta_ms`
    ///
    /// Returns the number of steps taken (signed).
    pub fn update(&mut self, delta_ms: u32) -> i32 {
        let (wanted_dir, remaining) = match self.mode {
            RampMode::Idle => return 0,
            RampMode::Run(dir) => (dir, None),
            RampMode::MoveTo(target) => {
                let delta = target as i64 - self.position as i64;
                if delta == 0 {
                    self.stop_now();
                    return 0;
                }
                (if delta > 0 { 1 } else { -1 }, Some(delta.unsigned_abs()))
            }
        };

        if self.speed_mhz == 0 {
            self.moving_dir = wanted_dir;
        }

        let v_max = self.max_speed_hz as u64 * 1_000;
        let dv = if self.accel == 0 {
            u64::MAX
        } else {
            self.accel as u64 * delta_ms as u64
        };

        let reversing = self.moving_dir != wanted_dir;
        let braking = reversing || remaining.is_some_and(|r| self.stopping_distance() >= r);

        if braking || self.speed_mhz > v_max {
            self.speed_mhz = self.speed_mhz.saturating_sub(dv);
            if !reversing {
                // Never stall short of the target
                self.speed_mhz = self.speed_mhz.max(dv.min(v_max));
            }
        } else {
            self.speed_mhz = self.speed_mhz.saturating_add(dv).min(v_max);
        }

        self.remainder += self.speed_mhz * delta_ms as u64;
        let steps = self.remainder / 1_000_000;
        self.remainder %= 1_000_000;

        if !reversing {
            if let (Some(rem), RampMode::MoveTo(target)) = (remaining, self.mode) {
                if steps >= rem {
                    let taken = target.wrapping_sub(self.position);
                    self.position = target;
                    self.stop_now();
                    return taken;
                }
            }
        }

        let taken = steps as i32 * self.moving_dir as i32;
        self.position = self.position.wrapping_add(taken);
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_until_idle(ramp: &mut RampProfile, max_ms: u32) -> u32 {
        for t in 0..max_ms {
            if !ramp.is_running() {
                return t;
            }
            ramp.update(1);
        }
        max_ms
    }

    #[test]
    fn test_reaches_target_exactly() {
        let mut ramp = RampProfile::new();
        ramp.set_max_speed(10_000);
        ramp.set_acceleration(50_000);
        ramp.move_to(5_000);

        run_until_idle(&mut ramp, 5_000);
        assert_eq!(ramp.position(), 5_000);
        assert_eq!(ramp.step_rate_hz(), 0);
    }

    #[test]
    fn test_move_backward() {
        let mut ramp = RampProfile::new();
        ramp.set_position(1_000);
        ramp.set_max_speed(2_000);
        ramp.set_acceleration(0);
        ramp.move_to(-500);

        // 1500 steps at a flat 2000 Hz
        let took = run_until_idle(&mut ramp, 5_000);
        assert_eq!(ramp.position(), -500);
        assert!((749..=752).contains(&took), "took {}", took);
    }

    #[test]
    fn test_acceleration_limits_speed() {
        let mut ramp = RampProfile::new();
        ramp.set_max_speed(10_000);
        ramp.set_acceleration(10_000);
        ramp.run(true);

        for _ in 0..100 {
            ramp.update(1);
        }
        assert_eq!(ramp.step_rate_hz(), 1_000);

        for _ in 0..2_000 {
            ramp.update(1);
        }
        assert_eq!(ramp.step_rate_hz(), 10_000);
    }

    #[test]
    fn test_decelerates_before_target() {
        let mut ramp = RampProfile::new();
        ramp.set_max_speed(10_000);
        ramp.set_acceleration(20_000);
        ramp.move_to(20_000);

        let mut peak = 0;
        while ramp.is_running() {
            ramp.update(1);
            peak = peak.max(ramp.step_rate_hz());
            if ramp.position() > 19_900 {
                assert!(ramp.step_rate_hz() < peak);
            }
        }
        assert_eq!(ramp.position(), 20_000);
    }

    #[test]
    fn test_reversal_passes_through_zero_speed() {
        let mut ramp = RampProfile::new();
        ramp.set_max_speed(5_000);
        ramp.set_acceleration(10_000);
        ramp.run(true);
        for _ in 0..500 {
            ramp.update(1);
        }
        let forward_pos = ramp.position();

        ramp.move_to(0);
        ramp.update(1);
        // Still coasting forward while braking
        assert!(ramp.position() >= forward_pos);
        assert_eq!(ramp.direction(), 1);

        run_until_idle(&mut ramp, 10_000);
        assert_eq!(ramp.position(), 0);
    }

    #[test]
    fn test_stop_now() {
        let mut ramp = RampProfile::new();
        ramp.run(false);
        ramp.update(10);
        ramp.stop_now();
        assert!(!ramp.is_running());
        assert_eq!(ramp.update(10), 0);
    }
}
