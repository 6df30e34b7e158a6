//! Herald - Notification Appliance Firmware
//!
//! Firmware for a Pico W that announces pickups and emergencies. Requests
//! arrive from the network front end, staff accept or reject them with two
//! buttons, Resolume shows accepted names via OSC, and an OLED driven from
//! the second core mirrors what is going on.
//!
//! Named after the messenger who carried announcements between the crowd
//! and the stage.

#![no_std]
#![no_main]

use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};
use defmt::*;
use embassy_executor::{Executor, Spawner};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::peripherals::{I2C0, PIO0};
use embassy_rp::pio::{InterruptHandler as PioInterruptHandler, Pio};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use herald_core::config::HeraldConfig;
use herald_core::persist::RecordStore;
use herald_core::state::History;
use herald_hal_rp2040::{AlertLed, ButtonInput, Polarity, Rp2040FlashStorage};

use crate::config::ConfigLoader;
use crate::display::{Rotation, Sh1106};

mod channels;
mod config;
mod display;
mod submit;
mod tasks;

/// Embedded default configuration (compiled into firmware)
/// Edit herald.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../herald.toml");

/// OLED panel type driven by the render task
pub type Panel = Sh1106<I2c<'static, I2C0, i2c::Blocking>>;

/// I2C clock for the OLED
const PANEL_I2C_HZ: u32 = 400_000;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
});

// Static cells (must live forever for task references)
static CONFIG: StaticCell<HeraldConfig> = StaticCell::new();
static CORE1_STACK: StaticCell<Stack<8192>> = StaticCell::new();
static CORE1_EXECUTOR: StaticCell<Executor> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Herald firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Configuration and notification records share one flash partition
    let flash = Rp2040FlashStorage::new(p.FLASH, p.DMA_CH2);
    let mut loader = ConfigLoader::new(flash);
    let config = match loader.load(EMBEDDED_CONFIG).await {
        Ok(config) => config,
        Err(e) => defmt::panic!("No usable configuration: {:?}", e),
    };
    let config: &'static HeraldConfig = CONFIG.init(config);
    let mut store = RecordStore::new(loader.into_storage());
    info!("Configuration loaded");

    let history = match store.load_history().await {
        Ok(history) => history,
        Err(e) => {
            warn!("Stored history unusable, starting empty: {:?}", e);
            History::new()
        }
    };

    // OLED on I2C0 (SDA GP16, SCL GP17), rendered from core 1
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = PANEL_I2C_HZ;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_17, p.PIN_16, i2c_config);
    let panel: Panel = Sh1106::new(i2c, Rotation::Rotate180);
    let scroll_speed_px = config.display.scroll_speed_px;
    let frame_interval_ms = config.display.frame_interval_ms;

    spawn_core1(p.CORE1, CORE1_STACK.init(Stack::new()), move || {
        let executor = CORE1_EXECUTOR.init(Executor::new());
        executor.run(|spawner| {
            spawner
                .spawn(tasks::render_task(panel, scroll_speed_px, frame_interval_ms))
                .unwrap();
        });
    });
    info!("Render loop started on core 1");

    // Buttons to 3V3 with pull-downs, LED to ground
    let accept = ButtonInput::new(p.PIN_15, Polarity::ActiveHigh);
    let reject = ButtonInput::new(p.PIN_14, Polarity::ActiveHigh);
    let led = AlertLed::new(p.PIN_2, Polarity::ActiveHigh);

    // The state machine does not wait for the network
    spawner
        .spawn(tasks::coordinator_task(config, history.clone()))
        .unwrap();
    spawner.spawn(tasks::persist_task(store, history)).unwrap();
    spawner
        .spawn(tasks::button_task(
            accept,
            reject,
            config.timing.debounce_window_ms as u32,
        ))
        .unwrap();
    spawner.spawn(tasks::alert_task(led)).unwrap();

    // CYW43 radio on PIO0 (PWR GP23, CS GP25, DIO GP24, CLK GP29)
    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO0, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );

    let (stack, control) = tasks::net::start(spawner, pwr, spi).await;
    spawner.spawn(tasks::wifi_task(control, stack, &config.wifi)).unwrap();
    spawner.spawn(tasks::osc_task(stack, &config.resolume)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
