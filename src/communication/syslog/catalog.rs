//! Message catalog
//!
//! Every reportable event is declared here once: an [`Event`] variant
//! carrying its typed parameters, and a matching [`MessageTemplate`] with
//! the subsystem tag, severity and fixed text. Because the event id and its
//! parameters travel together in one enum, a mismatched or out-of-range id
//! cannot be expressed.

use heapless::String;

/// Maximum SSID length captured in an event payload (IEEE 802.11)
pub const EVENT_SSID_LEN: usize = 32;

/// Facility code for locally used messages (local0)
pub const FACILITY_LOCAL0: u8 = 16 << 3;

/// Syslog severity (RFC 5424 levels, 0 = most severe)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Severity {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Informational = 6,
    Debug = 7,
}

impl Severity {
    /// PRI value for the rendered record: facility OR'd with the level
    pub fn priority(self) -> u8 {
        FACILITY_LOCAL0 | self as u8
    }
}

/// Logical subsystem that raised an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsystem {
    Syslog,
    Wifi,
    Sntp,
    Radio,
    Temp,
}

impl Subsystem {
    /// Short tag used in the PROCID field of the rendered record
    pub fn tag(self) -> &'static str {
        match self {
            Subsystem::Syslog => "Syslog",
            Subsystem::Wifi => "WiFi",
            Subsystem::Sntp => "SNTP",
            Subsystem::Radio => "Radio",
            Subsystem::Temp => "Temp",
        }
    }
}

/// Immutable template for one catalogued event
#[derive(Debug, Clone, Copy)]
pub struct MessageTemplate {
    /// Subsystem tag for the PROCID field
    pub subsystem: Subsystem,
    /// Severity level for the PRI field
    pub severity: Severity,
    /// Fixed human-readable text
    pub text: &'static str,
}

/// Event identifiers (the MSGID field of the rendered record)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EventId {
    SyslogStarted = 0,
    WifiStarted = 1,
    WifiConnected = 2,
    WifiGotIp = 3,
    WifiDisconnected = 4,
    WifiEvent = 5,
    TimeSyncStarted = 6,
    RadioStarted = 7,
    TempReading = 8,
    FrameSent = 9,
}

/// Number of catalogued events
pub const CATALOG_LEN: usize = 10;

static CATALOG: [MessageTemplate; CATALOG_LEN] = [
    // Event transport is up; first record every boot.
    MessageTemplate {
        subsystem: Subsystem::Syslog,
        severity: Severity::Informational,
        text: "Event transport initialized.",
    },
    // WiFi stack configured.
    MessageTemplate {
        subsystem: Subsystem::Wifi,
        severity: Severity::Informational,
        text: "WiFi initialization successful.",
    },
    // Joined the WiFi network.
    MessageTemplate {
        subsystem: Subsystem::Wifi,
        severity: Severity::Notice,
        text: "WiFi connected to network.",
    },
    // DHCP (or static config) produced an address.
    MessageTemplate {
        subsystem: Subsystem::Wifi,
        severity: Severity::Notice,
        text: "WiFi obtained IP address.",
    },
    // Connectivity lost; the transport goes quiet until it returns.
    MessageTemplate {
        subsystem: Subsystem::Wifi,
        severity: Severity::Critical,
        text: "WiFi has failed.",
    },
    // Anything the WiFi stack reports that has no dedicated event.
    MessageTemplate {
        subsystem: Subsystem::Wifi,
        severity: Severity::Critical,
        text: "WiFi event occurred.",
    },
    // First successful network time sync.
    MessageTemplate {
        subsystem: Subsystem::Sntp,
        severity: Severity::Informational,
        text: "SNTP initialization.",
    },
    // Radio signal driver ready.
    MessageTemplate {
        subsystem: Subsystem::Radio,
        severity: Severity::Informational,
        text: "Radio transmitter initialized.",
    },
    // A temperature reading entered the telemetry pipeline.
    MessageTemplate {
        subsystem: Subsystem::Temp,
        severity: Severity::Debug,
        text: "Temperature reading.",
    },
    // A telemetry frame finished transmitting.
    MessageTemplate {
        subsystem: Subsystem::Radio,
        severity: Severity::Debug,
        text: "Telemetry frame sent.",
    },
];

impl EventId {
    /// Look up the immutable template for this event. Pure, infallible.
    pub fn template(self) -> &'static MessageTemplate {
        &CATALOG[self as usize]
    }
}

/// An operational event together with its typed parameters.
///
/// One variant per catalogued event; variants without structured data render
/// with the lone `-` NILVALUE.
#[derive(Debug, Clone)]
pub enum Event {
    SyslogStarted,
    WifiStarted,
    WifiConnected {
        ssid: String<EVENT_SSID_LEN>,
        channel: u8,
    },
    WifiGotIp {
        ip: [u8; 4],
        mask: [u8; 4],
        gateway: [u8; 4],
    },
    WifiDisconnected {
        ssid: String<EVENT_SSID_LEN>,
        reason: u8,
    },
    WifiEvent {
        code: u32,
    },
    TimeSyncStarted,
    RadioStarted,
    TempReading {
        /// Tenths of a degree Celsius
        tenths: i32,
    },
    FrameSent {
        /// The 32-bit frame word as transmitted
        frame: u32,
        /// On-air time in microseconds
        micros: u32,
    },
}

impl Event {
    /// The catalogued identifier of this event
    pub fn id(&self) -> EventId {
        match self {
            Event::SyslogStarted => EventId::SyslogStarted,
            Event::WifiStarted => EventId::WifiStarted,
            Event::WifiConnected { .. } => EventId::WifiConnected,
            Event::WifiGotIp { .. } => EventId::WifiGotIp,
            Event::WifiDisconnected { .. } => EventId::WifiDisconnected,
            Event::WifiEvent { .. } => EventId::WifiEvent,
            Event::TimeSyncStarted => EventId::TimeSyncStarted,
            Event::RadioStarted => EventId::RadioStarted,
            Event::TempReading { .. } => EventId::TempReading,
            Event::FrameSent { .. } => EventId::FrameSent,
        }
    }

    /// The immutable template of this event
    pub fn template(&self) -> &'static MessageTemplate {
        self.id().template()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_combines_facility_and_severity() {
        assert_eq!(Severity::Informational.priority(), 134);
        assert_eq!(Severity::Notice.priority(), 133);
        assert_eq!(Severity::Critical.priority(), 130);
        assert_eq!(Severity::Debug.priority(), 135);
        assert_eq!(Severity::Emergency.priority(), 128);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Emergency < Severity::Alert);
        assert!(Severity::Critical < Severity::Debug);
        assert!(Severity::Informational < Severity::Debug);
    }

    #[test]
    fn test_event_ids_match_catalog_order() {
        let events = [
            Event::SyslogStarted,
            Event::WifiStarted,
            Event::WifiConnected {
                ssid: String::new(),
                channel: 0,
            },
            Event::WifiGotIp {
                ip: [0; 4],
                mask: [0; 4],
                gateway: [0; 4],
            },
            Event::WifiDisconnected {
                ssid: String::new(),
                reason: 0,
            },
            Event::WifiEvent { code: 0 },
            Event::TimeSyncStarted,
            Event::RadioStarted,
            Event::TempReading { tenths: 0 },
            Event::FrameSent {
                frame: 0,
                micros: 0,
            },
        ];
        for (index, event) in events.iter().enumerate() {
            assert_eq!(event.id() as usize, index);
        }
    }

    #[test]
    fn test_template_lookup() {
        let tpl = EventId::WifiGotIp.template();
        assert_eq!(tpl.subsystem, Subsystem::Wifi);
        assert_eq!(tpl.severity, Severity::Notice);
        assert_eq!(tpl.text, "WiFi obtained IP address.");

        let tpl = EventId::TempReading.template();
        assert_eq!(tpl.subsystem, Subsystem::Temp);
        assert_eq!(tpl.severity, Severity::Debug);
    }

    #[test]
    fn test_subsystem_tags() {
        assert_eq!(Subsystem::Wifi.tag(), "WiFi");
        assert_eq!(Subsystem::Sntp.tag(), "SNTP");
        assert_eq!(Subsystem::Radio.tag(), "Radio");
    }
}
