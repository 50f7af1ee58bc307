//! WiFi bring-up and connectivity notifications
//!
//! Initializes the CYW43439 WiFi chip and the embassy-net stack, joins the
//! configured network, and watches the resulting connectivity. The watcher
//! owns the transport's link notifications: address acquired means
//! `notify_link_up` (which kicks off collector resolution), configuration
//! lost means `notify_link_down`.
//!
//! # Fallback strategy
//!
//! - Empty SSID: WiFi is skipped entirely; the beacon still transmits.
//! - Join failure: retry with exponential backoff (1s, 2s, 4s, 8s, 16s),
//!   then give up after five attempts.

use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, Stack, StackResources};
use embassy_time::{Duration, Timer};

use cyw43::JoinOptions;
use cyw43_pio::DEFAULT_CLOCK_DIVIDER;
use embassy_rp::{
    bind_interrupts,
    gpio::{Level, Output},
    peripherals::{DMA_CH0, PIO0},
    pio::{InterruptHandler as PioInterruptHandler, Pio},
};
use static_cell::StaticCell;

use crate::communication::syslog::catalog::Event;
use crate::platform::rp2350::net::with_transport;
use heapless::String;

/// Maximum WiFi join attempts before giving up
const MAX_JOIN_RETRIES: u8 = 5;

/// Initial retry delay (1 second)
const INITIAL_RETRY_DELAY_MS: u64 = 1000;

/// How often the watcher re-checks a configured link
const LINK_POLL_INTERVAL_MS: u64 = 1000;

/// WiFi configuration
#[derive(Debug, Clone)]
pub struct WifiConfig {
    /// Network SSID (max 32 chars)
    pub ssid: String<32>,
    /// WPA2 password (max 63 chars)
    pub password: String<63>,
}

impl WifiConfig {
    /// True when an SSID is configured; an empty SSID skips WiFi entirely
    pub fn is_configured(&self) -> bool {
        !self.ssid.is_empty()
    }
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            ssid: String::try_from(env!("WIFI_SSID")).unwrap_or_default(),
            password: String::try_from(env!("WIFI_PASSWORD")).unwrap_or_default(),
        }
    }
}

/// WiFi initialization error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum WifiError {
    /// WiFi not configured (empty SSID)
    NotConfigured,
    /// Join failed after all retries
    JoinFailed,
}

bind_interrupts!(struct PioIrqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
});

/// Initialize WiFi and the network stack, then join the configured network.
///
/// Returns the network stack handle on success; the caller spawns the pump
/// tasks (`dns_task`, `send_task`, `connectivity_task`) against it.
pub async fn initialize_wifi(
    spawner: Spawner,
    config: WifiConfig,
    p: embassy_rp::Peripherals,
) -> Result<Stack<'static>, WifiError> {
    if !config.is_configured() {
        crate::log_info!("wifi: no SSID configured, skipping");
        return Err(WifiError::NotConfigured);
    }

    crate::log_info!("wifi: initializing, SSID {}", config.ssid.as_str());

    let fw = include_bytes!("../../../cyw43-firmware/43439A0.bin");
    let clm = include_bytes!("../../../cyw43-firmware/43439A0_clm.bin");

    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO0, PioIrqs);
    let spi = cyw43_pio::PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );

    static STATE: StaticCell<cyw43::State> = StaticCell::new();
    let state = STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;
    spawner.spawn(wifi_task(runner)).unwrap();
    control.init(clm).await;

    static RESOURCES: StaticCell<StackResources<8>> = StaticCell::new();
    let seed = 0x7d4a_91c2_30f8_5e6b;
    let (stack, runner) = embassy_net::new(
        net_device,
        NetConfig::dhcpv4(Default::default()),
        RESOURCES.init(StackResources::<8>::new()),
        seed,
    );
    spawner.spawn(net_task(runner)).unwrap();

    with_transport(|transport| transport.emit(Event::WifiStarted));

    let mut retries = 0;
    loop {
        crate::log_info!(
            "wifi: joining (attempt {}/{})",
            retries + 1,
            MAX_JOIN_RETRIES
        );
        let options = JoinOptions::new(config.password.as_bytes());
        match control.join(config.ssid.as_str(), options).await {
            Ok(()) => break,
            Err(err) => {
                with_transport(|transport| {
                    transport.emit(Event::WifiEvent {
                        code: err.status,
                    })
                });
                retries += 1;
                if retries >= MAX_JOIN_RETRIES {
                    crate::log_error!("wifi: join failed after {} attempts", MAX_JOIN_RETRIES);
                    return Err(WifiError::JoinFailed);
                }
                let delay = retry_delay(retries - 1);
                crate::log_warn!("wifi: join failed, retrying in {} ms", delay.as_millis());
                Timer::after(delay).await;
            }
        }
    }

    with_transport(|transport| {
        transport.emit(Event::WifiConnected {
            ssid: config.ssid.clone(),
            channel: 0,
        })
    });
    crate::log_info!("wifi: joined {}", config.ssid.as_str());

    Ok(stack)
}

/// Exponential backoff for join retries, capped at 16 seconds
fn retry_delay(attempt: u8) -> Duration {
    let delay_ms = INITIAL_RETRY_DELAY_MS * (1 << attempt).min(16);
    Duration::from_millis(delay_ms)
}

/// Watches stack configuration and drives the transport's link state.
#[embassy_executor::task]
pub async fn connectivity_task(stack: Stack<'static>) -> ! {
    loop {
        stack.wait_config_up().await;

        let (ip, mask, gateway) = match stack.config_v4() {
            Some(config) => (
                config.address.address().octets(),
                prefix_to_mask(config.address.prefix_len()),
                config
                    .gateway
                    .map(|g| g.octets())
                    .unwrap_or([0, 0, 0, 0]),
            ),
            None => ([0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]),
        };

        with_transport(|transport| {
            transport.notify_link_up(ip);
            transport.emit(Event::WifiGotIp { ip, mask, gateway });
        });

        while stack.is_config_up() {
            Timer::after_millis(LINK_POLL_INTERVAL_MS).await;
        }

        // Queue the failure record first so it survives in the ring, then
        // deactivate.
        with_transport(|transport| {
            transport.emit(Event::WifiDisconnected {
                ssid: String::new(),
                reason: 0,
            });
            transport.notify_link_down();
        });
    }
}

/// CYW43439 driver event loop
#[embassy_executor::task]
async fn wifi_task(
    runner: cyw43::Runner<'static, Output<'static>, cyw43_pio::PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

/// embassy-net stack event loop
#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

/// Expand a CIDR prefix length into a dotted-quad mask
fn prefix_to_mask(prefix: u8) -> [u8; 4] {
    let bits: u32 = if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix.min(32)))
    };
    bits.to_be_bytes()
}
