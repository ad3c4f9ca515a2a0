//! Pneumatic outputs and tool servo
//!
//! Each solenoid is one GPIO. The tool servo is a standard hobby servo on
//! a 50 Hz PWM channel.

use embedded_hal::digital::{OutputPin, PinState};
use embedded_hal::pwm::SetDutyCycle;
use sprayline_core::traits::ActuatorIo;

/// Servo frame period
pub const SERVO_PERIOD_US: u32 = 20_000;
/// Pulse width at 0 degrees
pub const SERVO_MIN_PULSE_US: u32 = 500;
/// Pulse width at 180 degrees
pub const SERVO_MAX_PULSE_US: u32 = 2_500;

/// Hobby servo on a PWM channel configured for a 20 ms period
pub struct ToolServo<PWM> {
    pwm: PWM,
    degrees: f32,
}

impl<PWM: SetDutyCycle> ToolServo<PWM> {
    pub fn new(pwm: PWM) -> Self {
        Self { pwm, degrees: 0.0 }
    }

    /// Pulse width for an angle, clamped to 0..=180
    pub fn pulse_us(degrees: f32) -> u32 {
        let degrees = if degrees.is_nan() { 0.0 } else { degrees.clamp(0.0, 180.0) };
        let span = (SERVO_MAX_PULSE_US - SERVO_MIN_PULSE_US) as f32;
        SERVO_MIN_PULSE_US + (degrees / 180.0 * span) as u32
    }

    pub fn set_degrees(&mut self, degrees: f32) {
        let pulse = Self::pulse_us(degrees);
        // u16 fraction: the period fits, the pulse is always shorter
        let _ = self
            .pwm
            .set_duty_cycle_fraction(pulse as u16, SERVO_PERIOD_US as u16);
        self.degrees = degrees;
    }

    pub fn degrees(&self) -> f32 {
        self.degrees
    }
}

/// Solenoids of the spray and pick heads, plus the tool servo
///
/// All outputs are active-high. Every output starts de-energized.
pub struct GpioActuators<V, R, C, K, S> {
    spray_valve: V,
    pressurizer: R,
    vacuum: C,
    pick_cylinder: K,
    servo: ToolServo<S>,
    state: [bool; 4],
}

const VALVE: usize = 0;
const POT: usize = 1;
const VACUUM: usize = 2;
const CYLINDER: usize = 3;

fn drive<P: OutputPin>(pin: &mut P, on: bool) {
    // RP2040 GPIO writes cannot fail
    let _ = pin.set_state(PinState::from(on));
}

impl<V, R, C, K, S> GpioActuators<V, R, C, K, S>
where
    V: OutputPin,
    R: OutputPin,
    C: OutputPin,
    K: OutputPin,
    S: SetDutyCycle,
{
    pub fn new(spray_valve: V, pressurizer: R, vacuum: C, pick_cylinder: K, servo: S) -> Self {
        let mut io = Self {
            spray_valve,
            pressurizer,
            vacuum,
            pick_cylinder,
            servo: ToolServo::new(servo),
            state: [false; 4],
        };
        io.all_off();
        io
    }
}

impl<V, R, C, K, S> ActuatorIo for GpioActuators<V, R, C, K, S>
where
    V: OutputPin,
    R: OutputPin,
    C: OutputPin,
    K: OutputPin,
    S: SetDutyCycle,
{
    fn set_spray_valve(&mut self, on: bool) {
        drive(&mut self.spray_valve, on);
        self.state[VALVE] = on;
    }

    fn set_pressurizer(&mut self, on: bool) {
        drive(&mut self.pressurizer, on);
        self.state[POT] = on;
    }

    fn set_vacuum(&mut self, on: bool) {
        drive(&mut self.vacuum, on);
        self.state[VACUUM] = on;
    }

    fn set_pick_cylinder(&mut self, extended: bool) {
        drive(&mut self.pick_cylinder, extended);
        self.state[CYLINDER] = extended;
    }

    fn set_tool_angle(&mut self, degrees: f32) {
        self.servo.set_degrees(degrees);
    }

    fn spray_valve(&self) -> bool {
        self.state[VALVE]
    }

    fn pressurizer(&self) -> bool {
        self.state[POT]
    }

    fn vacuum(&self) -> bool {
        self.state[VACUUM]
    }

    fn pick_cylinder(&self) -> bool {
        self.state[CYLINDER]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use core::convert::Infallible;

    struct MockPin<'a> {
        high: &'a Cell<bool>,
    }

    impl embedded_hal::digital::ErrorType for MockPin<'_> {
        type Error = Infallible;
    }

    impl OutputPin for MockPin<'_> {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high.set(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high.set(true);
            Ok(())
        }
    }

    /// PWM channel with a 20000-count period, one count per microsecond
    struct MockPwm<'a> {
        duty: &'a Cell<u16>,
    }

    impl embedded_hal::pwm::ErrorType for MockPwm<'_> {
        type Error = Infallible;
    }

    impl SetDutyCycle for MockPwm<'_> {
        fn max_duty_cycle(&self) -> u16 {
            20_000
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
            self.duty.set(duty);
            Ok(())
        }
    }

    #[test]
    fn test_servo_pulse_range() {
        assert_eq!(ToolServo::<MockPwm>::pulse_us(0.0), 500);
        assert_eq!(ToolServo::<MockPwm>::pulse_us(90.0), 1_500);
        assert_eq!(ToolServo::<MockPwm>::pulse_us(180.0), 2_500);
        assert_eq!(ToolServo::<MockPwm>::pulse_us(270.0), 2_500);
        assert_eq!(ToolServo::<MockPwm>::pulse_us(f32::NAN), 500);
    }

    #[test]
    fn test_servo_duty() {
        let duty = Cell::new(0);
        let mut servo = ToolServo::new(MockPwm { duty: &duty });
        servo.set_degrees(180.0);
        assert_eq!(duty.get(), 2_500);
        assert_eq!(servo.degrees(), 180.0);
    }

    #[test]
    fn test_outputs_start_off_and_follow_commands() {
        let pins = [Cell::new(true), Cell::new(true), Cell::new(true), Cell::new(true)];
        let duty = Cell::new(0);
        let mut io = GpioActuators::new(
            MockPin { high: &pins[0] },
            MockPin { high: &pins[1] },
            MockPin { high: &pins[2] },
            MockPin { high: &pins[3] },
            MockPwm { duty: &duty },
        );
        assert!(pins.iter().all(|p| !p.get()));

        io.set_spray_valve(true);
        io.set_pick_cylinder(true);
        assert!(pins[0].get() && io.spray_valve());
        assert!(pins[3].get() && io.pick_cylinder());
        assert!(!io.vacuum());

        io.all_off();
        assert!(pins.iter().all(|p| !p.get()));
    }
}
