//! Platform error types
//!
//! This module defines error types for platform operations.

use core::fmt;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
///
/// All platform implementations map their stack-specific errors to these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum PlatformError {
    /// Network operation failed
    Net(NetError),
    /// Hostname resolution failed
    Dns(DnsError),
    /// Radio signal operation failed
    Radio(RadioError),
    /// Platform initialization failed
    InitializationFailed,
    /// Invalid configuration provided
    InvalidConfig,
    /// Resource not available
    ResourceUnavailable,
}

/// Network-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum NetError {
    /// No UDP flow has been opened
    NotOpen,
    /// A datagram is already outstanding
    Busy,
    /// Binding the local endpoint failed
    BindFailed,
    /// Datagram submission failed
    SendFailed,
}

/// DNS-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum DnsError {
    /// The hostname does not resolve
    NotFound,
    /// The resolver did not answer in time
    Timeout,
    /// Resolver failure (server error, no resolver configured)
    Failure,
}

/// Radio-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum RadioError {
    /// The signal buffer cannot hold the frame
    BufferFull,
    /// A frame transmission is already in progress
    Busy,
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Net(e) => write!(f, "network error: {:?}", e),
            PlatformError::Dns(e) => write!(f, "DNS error: {:?}", e),
            PlatformError::Radio(e) => write!(f, "radio error: {:?}", e),
            PlatformError::InitializationFailed => write!(f, "platform initialization failed"),
            PlatformError::InvalidConfig => write!(f, "invalid configuration"),
            PlatformError::ResourceUnavailable => write!(f, "resource not available"),
        }
    }
}

impl From<NetError> for PlatformError {
    fn from(e: NetError) -> Self {
        PlatformError::Net(e)
    }
}

impl From<DnsError> for PlatformError {
    fn from(e: DnsError) -> Self {
        PlatformError::Dns(e)
    }
}

impl From<RadioError> for PlatformError {
    fn from(e: RadioError) -> Self {
        PlatformError::Radio(e)
    }
}
