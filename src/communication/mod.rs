//! Communication protocols

pub mod syslog;
