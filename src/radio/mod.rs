//! 433 MHz telemetry radio
//!
//! Frame encoding, the reference temperature producer, and the beacon
//! composition that ties them to the event transport.

pub mod frame;
pub mod walk;

pub use frame::{checksum, transmit, FrameConfig};
pub use walk::TemperatureWalk;

use crate::communication::syslog::catalog::Event;
use crate::communication::syslog::transport::EventTransport;
use crate::platform::traits::clock::WallClock;
use crate::platform::traits::net::LogLink;
use crate::platform::traits::radio::RadioSignalDriver;

/// One beacon period: take a reading, report it, encode and transmit.
///
/// Returns the encoded frame word. The `FrameSent` event follows separately
/// once the driver reports completion, since only the driver knows the
/// on-air time.
pub fn beacon_tick<D, L, K, const DEPTH: usize, const CAP: usize>(
    walk: &mut TemperatureWalk,
    config: &FrameConfig,
    driver: &mut D,
    transport: &mut EventTransport<L, K, DEPTH, CAP>,
) -> u32
where
    D: RadioSignalDriver,
    L: LogLink,
    K: WallClock,
{
    let tenths = walk.next_reading();
    transport.emit(Event::TempReading { tenths });
    let frame = config.encode(tenths);
    transmit(driver, frame);
    frame
}
