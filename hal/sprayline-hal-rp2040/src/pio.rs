//! PIO step program and clock divider math
//!
//! Every motor gets its own PIO state machine, all running one shared
//! program loaded once per PIO block. The program toggles the step pin
//! with a fixed number of delay cycles per edge, so the step frequency is
//! set purely by the state machine's clock divider:
//!
//! ```text
//! freq = SYS_CLK / (divider * CYCLES_PER_STEP)
//! ```

/// System clock frequency (RP2040 default)
pub const SYS_CLK_HZ: u32 = 125_000_000;

/// PIO cycles per step pulse: two `set` instructions with 31 delay cycles each
pub const CYCLES_PER_STEP: u32 = 64;

/// Largest divider the 16.8 fixed-point register holds
const MAX_DIVIDER_X256: u64 = 0xFFFF_FF;

/// Slowest frequency reachable with the largest divider
pub const MIN_STEP_FREQ_HZ: u32 = 30;

/// Fastest frequency the drivers are run at
pub const MAX_STEP_FREQ_HZ: u32 = 200_000;

/// Clock divider for a target step frequency
///
/// Returns (integer_part, fractional_part) of the 16.8 fixed-point divider.
/// Frequencies outside `MIN_STEP_FREQ_HZ..=MAX_STEP_FREQ_HZ` are clamped.
pub fn calc_clock_divider(freq_hz: u32) -> (u16, u8) {
    let freq = freq_hz.clamp(MIN_STEP_FREQ_HZ, MAX_STEP_FREQ_HZ);

    // divider * 256 = (SYS_CLK * 256) / (freq * cycles)
    let divider_x256 =
        ((SYS_CLK_HZ as u64 * 256) / (freq as u64 * CYCLES_PER_STEP as u64)).min(MAX_DIVIDER_X256);

    ((divider_x256 >> 8) as u16, (divider_x256 & 0xFF) as u8)
}

/// Step frequency a divider actually produces
pub fn divider_to_freq(int_part: u16, frac_part: u8) -> u32 {
    let divider_x256 = ((int_part as u64) << 8) | frac_part as u64;
    if divider_x256 == 0 {
        return 0;
    }
    ((SYS_CLK_HZ as u64 * 256) / (divider_x256 * CYCLES_PER_STEP as u64)) as u32
}
