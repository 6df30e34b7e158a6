//! Radio and network bring-up
//!
//! The CYW43 radio and the embassy-net stack each need a runner task.
//! [`wifi_task`] joins the configured network and rejoins when the link
//! drops.

use cyw43::JoinOptions;
use cyw43_pio::PioSpi;
use defmt::*;
use embassy_executor::Spawner;
use embassy_net::{Stack, StackResources};
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::{DMA_CH0, PIO0};
use embassy_time::{Instant, Timer};
use static_cell::StaticCell;

use herald_core::config::WifiConfig;

/// SPI link to the radio over PIO
pub type RadioSpi = PioSpi<'static, PIO0, 0, DMA_CH0>;

/// Seconds between link checks
const LINK_CHECK_S: u64 = 5;

/// Sockets the stack can hold (OSC plus DHCP)
const SOCKETS: usize = 3;

static RADIO_STATE: StaticCell<cyw43::State> = StaticCell::new();
static STACK_RESOURCES: StaticCell<StackResources<SOCKETS>> = StaticCell::new();

#[embassy_executor::task]
async fn cyw43_task(runner: cyw43::Runner<'static, Output<'static>, RadioSpi>) -> ! {
    runner.run().await
}

#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

/// Power up the radio and start the IP stack (DHCPv4)
pub async fn start(
    spawner: Spawner,
    pwr: Output<'static>,
    spi: RadioSpi,
) -> (Stack<'static>, cyw43::Control<'static>) {
    let fw = include_bytes!("../../cyw43-firmware/43439A0.bin");
    let clm = include_bytes!("../../cyw43-firmware/43439A0_clm.bin");

    let state = RADIO_STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;
    spawner.spawn(cyw43_task(runner)).unwrap();

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;
    info!("Radio initialized");

    // The seed only randomises local ports and DHCP transaction ids
    let seed = Instant::now().as_ticks() ^ 0x4845_5241_4C44_0001;
    let (stack, runner) = embassy_net::new(
        net_device,
        embassy_net::Config::dhcpv4(Default::default()),
        STACK_RESOURCES.init(StackResources::new()),
        seed,
    );
    spawner.spawn(net_task(runner)).unwrap();

    (stack, control)
}

#[embassy_executor::task]
pub async fn wifi_task(
    mut control: cyw43::Control<'static>,
    stack: Stack<'static>,
    wifi: &'static WifiConfig,
) {
    info!("Wi-Fi task started");

    if wifi.ssid.is_empty() {
        warn!("No Wi-Fi network configured, staying offline");
        return;
    }

    loop {
        if !stack.is_link_up() {
            info!("Joining {}", wifi.ssid.as_str());
            let options = if wifi.password.is_empty() {
                JoinOptions::new_open()
            } else {
                JoinOptions::new(wifi.password.as_bytes())
            };

            match control.join(&wifi.ssid, options).await {
                Ok(()) => {
                    stack.wait_config_up().await;
                    if let Some(config) = stack.config_v4() {
                        info!("Network up, address {}", config.address);
                    }
                }
                Err(e) => warn!("Join failed with status {}", e.status),
            }
        }

        Timer::after_secs(LINK_CHECK_S).await;
    }
}
