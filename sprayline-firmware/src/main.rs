//! Sprayline - Paint and Pick-and-Place Machine Firmware
//!
//! Main firmware binary for the RP2040 gantry controller. Pin assignments
//! follow the SKR Pico layout; the fixture rotation motor, outputs and
//! panel inputs use the spare headers.
//!
//! | Function                     | GPIO                    |
//! |------------------------------|-------------------------|
//! | Console UART0                | TX 0, RX 1              |
//! | X step/dir/enable            | 11 / 10 / 12 (PIO0 SM0) |
//! | Y left                       | 6 / 5 / 7 (PIO0 SM1)    |
//! | Y right                      | 14 / 13 / 15 (PIO0 SM2) |
//! | Z                            | 19 / 28 / 2 (PIO0 SM3)  |
//! | Rotation                     | 8 / 9 / 20 (PIO1 SM0)   |
//! | Home X, Y left, Y right, Z   | 4, 3, 16, 25            |
//! | Cycle sensor                 | 24                      |
//! | Hold / abort button          | 22 / 26                 |
//! | Valve, pot, vacuum, cylinder | 23, 21, 17, 18          |
//! | Tool servo (PWM6 B)          | 29                      |

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::{PIO0, PIO1, UART0};
use embassy_rp::pio::Pio;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUart, Config as UartConfig};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use sprayline_core::config::machine::{
    CYCLE_SENSOR_DEBOUNCE_MS, DEBOUNCE_MS, HOME_SWITCH_DEBOUNCE_MS,
};
use sprayline_core::controller::Controller;
use sprayline_core::hardware::Hardware;
use sprayline_core::motion::GangAxis;
use sprayline_drivers::{Debouncer, GpioActuators};
use sprayline_hal_rp2040::flash::FlashStorage;
use sprayline_hal_rp2040::stepper::{load_step_program, PioStepper, StepperPins};
use sprayline_hal_rp2040::PioAxis;

use crate::board::{Board, ChannelTelemetry};
use crate::config::SettingsStore;

mod board;
mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
    PIO1_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO1>;
});

/// Servo PWM: 125 MHz / 64 = 1.953125 MHz counter, 39062 counts = 50 Hz
const SERVO_PWM_DIVIDER: u8 = 64;
const SERVO_PWM_TOP: u16 = 39_062;

static TX_BUF: StaticCell<[u8; 512]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

static X_STEPPER: StaticCell<PioStepper<'static, PIO0, 0>> = StaticCell::new();
static Y_LEFT_STEPPER: StaticCell<PioStepper<'static, PIO0, 1>> = StaticCell::new();
static Y_RIGHT_STEPPER: StaticCell<PioStepper<'static, PIO0, 2>> = StaticCell::new();
static Z_STEPPER: StaticCell<PioStepper<'static, PIO0, 3>> = StaticCell::new();
static ROTATION_STEPPER: StaticCell<PioStepper<'static, PIO1, 0>> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Sprayline firmware starting...");

    let p = embassy_rp::init(Default::default());

    let mut store = SettingsStore::new(FlashStorage::new(p.FLASH, p.DMA_CH0));
    let settings = store.load_or_default().await;

    // Console link, 115200 baud
    let tx_buf = TX_BUF.init([0u8; 512]);
    let rx_buf = RX_BUF.init([0u8; 256]);
    let uart = BufferedUart::new(
        p.UART0,
        p.PIN_0,
        p.PIN_1,
        Irqs,
        tx_buf,
        rx_buf,
        UartConfig::default(),
    );
    let (tx, rx) = uart.split();
    info!("Console UART initialized");

    // Step generators
    let Pio {
        mut common,
        sm0,
        sm1,
        sm2,
        sm3,
        ..
    } = Pio::new(p.PIO0, Irqs);
    let program0 = load_step_program(&mut common);

    let pins = StepperPins::default();
    let x = X_STEPPER.init(PioStepper::new(
        &mut common, &program0, sm0, p.PIN_11, p.PIN_10, p.PIN_12, pins,
    ));
    let y_left = Y_LEFT_STEPPER.init(PioStepper::new(
        &mut common, &program0, sm1, p.PIN_6, p.PIN_5, p.PIN_7, pins,
    ));
    // Right Y motor faces the left one across the gantry
    let y_right = Y_RIGHT_STEPPER.init(PioStepper::new(
        &mut common,
        &program0,
        sm2,
        p.PIN_14,
        p.PIN_13,
        p.PIN_15,
        StepperPins {
            dir_inverted: true,
            ..pins
        },
    ));
    let z = Z_STEPPER.init(PioStepper::new(
        &mut common, &program0, sm3, p.PIN_19, p.PIN_28, p.PIN_2, pins,
    ));

    let Pio {
        common: mut common1,
        sm0: pio1_sm0,
        ..
    } = Pio::new(p.PIO1, Irqs);
    let program1 = load_step_program(&mut common1);
    let rotation = ROTATION_STEPPER.init(PioStepper::new(
        &mut common1, &program1, pio1_sm0, p.PIN_8, p.PIN_9, p.PIN_20, pins,
    ));

    x.enable();
    y_left.enable();
    y_right.enable();
    z.enable();
    rotation.enable();
    info!("PIO steppers initialized");

    // Outputs and tool servo
    let mut servo_cfg = PwmConfig::default();
    servo_cfg.divider = SERVO_PWM_DIVIDER.into();
    servo_cfg.top = SERVO_PWM_TOP;
    let servo_pwm = Pwm::new_output_b(p.PWM_SLICE6, p.PIN_29, servo_cfg);
    let (_, servo) = servo_pwm.split();
    let Some(servo) = servo else {
        defmt::panic!("PWM channel B missing");
    };

    let io = GpioActuators::new(
        Output::new(p.PIN_23, Level::Low),
        Output::new(p.PIN_21, Level::Low),
        Output::new(p.PIN_17, Level::Low),
        Output::new(p.PIN_18, Level::Low),
        servo,
    );

    // Inputs
    let home_switch = |pin| Debouncer::new(pin, HOME_SWITCH_DEBOUNCE_MS, 0);
    let hw: Hardware<Board> = Hardware {
        x: PioAxis::new(x),
        y: GangAxis::new(PioAxis::new(y_left), PioAxis::new(y_right)),
        z: PioAxis::new(z),
        rotation: PioAxis::new(rotation),
        home_x: home_switch(Input::new(p.PIN_4, Pull::Down)),
        home_y_left: home_switch(Input::new(p.PIN_3, Pull::Down)),
        home_y_right: home_switch(Input::new(p.PIN_16, Pull::Down)),
        home_z: home_switch(Input::new(p.PIN_25, Pull::Down)),
        cycle_sensor: Debouncer::new(Input::new(p.PIN_24, Pull::Up), CYCLE_SENSOR_DEBOUNCE_MS, 0),
        hold_button: Debouncer::new(Input::new(p.PIN_22, Pull::Up), DEBOUNCE_MS, 0),
        io,
    };
    let abort_button = Debouncer::new(Input::new(p.PIN_26, Pull::Up), DEBOUNCE_MS, 0);
    info!("Inputs and outputs initialized");

    let controller = Controller::new(hw, settings, ChannelTelemetry);

    spawner.spawn(tasks::command_rx_task(rx)).unwrap();
    spawner.spawn(tasks::telemetry_tx_task(tx)).unwrap();
    spawner.spawn(tasks::settings_task(store)).unwrap();
    spawner
        .spawn(tasks::controller_task(controller, abort_button))
        .unwrap();

    info!("All tasks spawned, firmware running");

    // The PIO blocks stay owned here for the life of the program
    let _pio = (common, common1, program0, program1);
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
