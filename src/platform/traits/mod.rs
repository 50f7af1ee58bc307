//! Platform abstraction traits
//!
//! This module defines the traits that platform implementations must provide.

pub mod clock;
pub mod net;
pub mod radio;

// Re-export trait interfaces
pub use clock::{WallClock, TIMESTAMP_LEN};
pub use net::{LogLink, Resolution, SendOutcome, SocketEndpoint};
pub use radio::RadioSignalDriver;
