//! Raspberry Pi Pico 2 W platform implementation
//!
//! Hardware-backed implementations of the platform traits: CYW43439 WiFi
//! bring-up, the embassy-net network link for the syslog transport, the
//! SNTP-fed wall clock, and the GPIO-driven 433 MHz signal driver.

pub mod clock;
pub mod net;
pub mod network;
pub mod radio;

pub use clock::SntpClock;
pub use net::{install_transport, with_transport, NetLink};
pub use network::{initialize_wifi, WifiConfig, WifiError};
pub use radio::Rp2350Radio;
