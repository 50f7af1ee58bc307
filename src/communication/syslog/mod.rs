//! Syslog event transport
//!
//! Best-effort reporting of the device's operational events to a remote
//! collector over UDP. Events come from a small fixed catalog, are rendered
//! into RFC 5424-style records, buffered in a fixed-depth ring, and drained
//! one datagram at a time as connectivity allows.

pub mod catalog;
pub mod render;
pub mod ring;
pub mod transport;

pub use catalog::{Event, EventId, Severity, Subsystem};
pub use ring::{Record, RecordRing, RECORD_CAPACITY, RING_DEPTH};
pub use transport::{EventTransport, LinkState, SyslogConfig};
