//! PIO-based stepper motor driver
//!
//! Step pulses come from a PIO state machine; direction and enable are
//! plain GPIO. The driver knows nothing about positions, it only runs at
//! the frequency and direction it is told.

use embassy_rp::gpio::{Level, Output, Pin};
use embassy_rp::pio::{
    Common, Config, Direction as PioDirection, Instance, LoadedProgram, PioPin, StateMachine,
};
use embassy_rp::Peri;
use fixed::types::U24F8;

use crate::pio::{calc_clock_divider, MAX_STEP_FREQ_HZ};

/// Load the step program into a PIO block
///
/// Load once per block and share the result between its state machines.
pub fn load_step_program<'d, PIO: Instance>(
    common: &mut Common<'d, PIO>,
) -> LoadedProgram<'d, PIO> {
    let prg = pio::pio_asm!(
        ".wrap_target",
        "set pins, 1 [31]",
        "set pins, 0 [31]",
        ".wrap"
    );
    common.load_program(&prg.program)
}

/// Electrical options of one motor driver
#[derive(Debug, Clone, Copy)]
pub struct StepperPins {
    /// Enable pin is active low
    pub enable_inverted: bool,
    /// Swap the meaning of the direction pin
    pub dir_inverted: bool,
}

impl Default for StepperPins {
    fn default() -> Self {
        Self {
            enable_inverted: true,
            dir_inverted: false,
        }
    }
}

pub struct PioStepper<'d, PIO: Instance, const SM: usize> {
    sm: StateMachine<'d, PIO, SM>,
    dir_pin: Output<'d>,
    enable_pin: Output<'d>,
    pins: StepperPins,
    current_freq_hz: u32,
    running: bool,
    forward: bool,
}

impl<'d, PIO: Instance, const SM: usize> PioStepper<'d, PIO, SM> {
    pub fn new<STEP: PioPin, DIR: Pin, EN: Pin>(
        common: &mut Common<'d, PIO>,
        program: &LoadedProgram<'d, PIO>,
        mut sm: StateMachine<'d, PIO, SM>,
        step_pin: Peri<'d, STEP>,
        dir_pin: Peri<'d, DIR>,
        enable_pin: Peri<'d, EN>,
        pins: StepperPins,
    ) -> Self {
        let step_pio_pin = common.make_pio_pin(step_pin);

        let mut cfg = Config::default();
        cfg.use_program(program, &[&step_pio_pin]);
        cfg.set_set_pins(&[&step_pio_pin]);
        // Slowest divider until a frequency is set
        cfg.clock_divider = U24F8::from_bits(0x00FF_FFFF);

        sm.set_config(&cfg);
        sm.set_pin_dirs(PioDirection::Out, &[&step_pio_pin]);

        let dir_pin = Output::new(dir_pin, Level::from(pins.dir_inverted));
        // Start disabled
        let enable_pin = Output::new(enable_pin, Level::from(pins.enable_inverted));

        Self {
            sm,
            dir_pin,
            enable_pin,
            pins,
            current_freq_hz: 0,
            running: false,
            forward: true,
        }
    }

    /// Energize the motor coils
    pub fn enable(&mut self) {
        self.enable_pin
            .set_level(Level::from(!self.pins.enable_inverted));
    }

    pub fn disable(&mut self) {
        self.stop();
        self.enable_pin
            .set_level(Level::from(self.pins.enable_inverted));
    }

    pub fn set_direction(&mut self, forward: bool) {
        if forward == self.forward {
            return;
        }
        self.forward = forward;
        self.dir_pin
            .set_level(Level::from(forward == self.pins.dir_inverted));
    }

    pub fn direction(&self) -> bool {
        self.forward
    }

    /// Set the step frequency; zero stops pulse generation
    pub fn set_frequency(&mut self, freq_hz: u32) {
        let freq = freq_hz.min(MAX_STEP_FREQ_HZ);
        if freq == 0 {
            self.stop();
            return;
        }
        if freq == self.current_freq_hz && self.running {
            return;
        }
        self.current_freq_hz = freq;

        let (int_div, frac_div) = calc_clock_divider(freq);
        let divider_bits = ((int_div as u32) << 8) | (frac_div as u32);
        self.sm.set_clock_divider(U24F8::from_bits(divider_bits));

        if !self.running {
            self.sm.set_enable(true);
            self.running = true;
        }
    }

    pub fn current_freq(&self) -> u32 {
        self.current_freq_hz
    }

    /// Stop pulse generation
    pub fn stop(&mut self) {
        if self.running {
            self.sm.set_enable(false);
        }
        self.running = false;
        self.current_freq_hz = 0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
