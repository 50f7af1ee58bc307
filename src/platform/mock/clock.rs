//! Mock wall clock

use crate::platform::traits::clock::{WallClock, TIMESTAMP_LEN};
use heapless::String;

/// Wall clock returning a fixed timestamp
pub struct MockClock {
    timestamp: String<TIMESTAMP_LEN>,
}

impl MockClock {
    /// Create a clock pinned to `timestamp`
    pub fn new(timestamp: &str) -> Self {
        Self {
            timestamp: String::try_from(timestamp).unwrap_or_default(),
        }
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new("2026-01-01T00:00:00Z")
    }
}

impl WallClock for MockClock {
    fn timestamp(&self) -> String<TIMESTAMP_LEN> {
        self.timestamp.clone()
    }
}
