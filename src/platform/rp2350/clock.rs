//! SNTP-fed wall clock
//!
//! The time-sync collaborator stores the network epoch here whenever it
//! completes a sync; timestamps are then derived from the monotonic clock.
//! Before the first sync, timestamps count from the Unix epoch.

use embassy_time::Instant;

use crate::communication::syslog::catalog::Event;
use crate::core::traits::{EmbassyState, SharedState};
use crate::platform::traits::clock::{format_rfc3339, WallClock, TIMESTAMP_LEN};
use heapless::String;

struct EpochSync {
    /// Unix seconds at the moment of the last sync
    unix_at_sync: u64,
    /// Monotonic time at the moment of the last sync
    instant_at_sync: Instant,
    synced: bool,
}

static EPOCH: EmbassyState<EpochSync> = EmbassyState::new(EpochSync {
    unix_at_sync: 0,
    instant_at_sync: Instant::from_ticks(0),
    synced: false,
});

/// Wall clock backed by the last SNTP sync
pub struct SntpClock;

impl SntpClock {
    pub const fn new() -> Self {
        Self
    }

    /// Record a completed time sync; `unix_secs` is the current UTC time.
    pub fn set_epoch(unix_secs: u64) {
        let first = EPOCH.with_mut(|epoch| {
            let first = !epoch.synced;
            epoch.unix_at_sync = unix_secs;
            epoch.instant_at_sync = Instant::now();
            epoch.synced = true;
            first
        });
        if first {
            super::net::with_transport(|transport| transport.emit(Event::TimeSyncStarted));
        }
    }
}

impl Default for SntpClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WallClock for SntpClock {
    fn timestamp(&self) -> String<TIMESTAMP_LEN> {
        let now = EPOCH.with(|epoch| {
            epoch.unix_at_sync + epoch.instant_at_sync.elapsed().as_secs()
        });
        format_rfc3339(now)
    }
}
