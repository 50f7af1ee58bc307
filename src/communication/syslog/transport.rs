//! Event transport
//!
//! Owns the pending-record ring, the collector endpoint and the
//! connectivity state machine, and drains the ring over UDP one datagram at
//! a time.
//!
//! # State machine
//!
//! | State     | Entry                    | Exit                                   |
//! |-----------|--------------------------|----------------------------------------|
//! | Inactive  | initial / link down      | link up -> Resolving                   |
//! | Resolving | link up                  | resolve success -> Active; stays on failure |
//! | Active    | resolve success          | link down -> Inactive                  |
//!
//! "Sending" is a sub-flag of Active rather than a state of its own: link
//! loss can interrupt a send, in which case the flag is reset and the
//! abandoned datagram's completion (if it ever arrives) is ignored unless
//! its endpoint still matches.
//!
//! # Delivery model
//!
//! Best effort, strictly ordered, one datagram outstanding at a time.
//! `emit` never blocks and never reports failure to the caller: a record
//! that cannot be queued evicts under the ring policy, a record the link
//! rejects is dropped, and the telemetry path carries on regardless.

use core::fmt::Write;

use heapless::String;

use crate::platform::traits::clock::WallClock;
use crate::platform::traits::net::{LogLink, Resolution, SendOutcome, SocketEndpoint};

use super::catalog::Event;
use super::render::{self, DottedQuad};
use super::ring::{RecordRing, RECORD_CAPACITY, RING_DEPTH};

/// Maximum collector hostname length
pub const MAX_HOSTNAME_LEN: usize = 64;

/// HOST field value before the device address is known
const UNSPECIFIED_HOST: &str = "0.0.0.0";

/// Connectivity state of the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum LinkState {
    /// No IP connectivity; records accumulate in the ring
    Inactive,
    /// Link is up; the collector hostname is being resolved
    Resolving,
    /// Collector resolved and the UDP flow is open
    Active,
}

/// Runtime configuration for the event transport
#[derive(Debug, Clone)]
pub struct SyslogConfig {
    /// Collector hostname, or a literal IPv4 address
    pub hostname: String<MAX_HOSTNAME_LEN>,
    /// Collector UDP port
    pub port: u16,
    /// APP-NAME field of every rendered record
    pub app_name: &'static str,
}

impl Default for SyslogConfig {
    fn default() -> Self {
        Self {
            hostname: String::try_from(env!("SYSLOG_HOST")).unwrap_or_default(),
            port: env!("SYSLOG_PORT").parse::<u16>().unwrap_or(514),
            app_name: "pico-beacon",
        }
    }
}

/// Buffered, DNS-resolving UDP shipper for catalogued events
pub struct EventTransport<
    L,
    K,
    const DEPTH: usize = RING_DEPTH,
    const CAP: usize = RECORD_CAPACITY,
> where
    L: LogLink,
    K: WallClock,
{
    link: L,
    clock: K,
    config: SyslogConfig,
    ring: RecordRing<DEPTH, CAP>,
    state: LinkState,
    sending: bool,
    peer: Option<SocketEndpoint>,
    host: String<15>,
}

impl<L, K, const DEPTH: usize, const CAP: usize> EventTransport<L, K, DEPTH, CAP>
where
    L: LogLink,
    K: WallClock,
{
    /// Create the transport with its ring pre-allocated.
    ///
    /// Initial state is `Inactive`; events emitted before connectivity
    /// arrives accumulate in the ring.
    pub fn new(link: L, clock: K, config: SyslogConfig) -> Self {
        Self {
            link,
            clock,
            config,
            ring: RecordRing::new(),
            state: LinkState::Inactive,
            sending: false,
            peer: None,
            host: String::try_from(UNSPECIFIED_HOST).unwrap_or_default(),
        }
    }

    /// Current connectivity state
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// True while a datagram is outstanding
    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// Number of records waiting in the ring
    pub fn queued(&self) -> usize {
        self.ring.len()
    }

    /// Records overwritten by the ring's eviction policy
    pub fn dropped(&self) -> u32 {
        self.ring.dropped()
    }

    /// Platform link access (completion plumbing and tests)
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// IP connectivity achieved: record our address and (re-)resolve the
    /// collector hostname.
    ///
    /// When the link resolves synchronously (cached entry, or the hostname
    /// is a literal address) the resolution completion runs inline before
    /// this method returns; otherwise it arrives later through
    /// [`resolution_complete`](Self::resolution_complete).
    pub fn notify_link_up(&mut self, local_ip: [u8; 4]) {
        self.host.clear();
        let _ = write!(self.host, "{}", DottedQuad(local_ip));
        self.state = LinkState::Resolving;
        let hostname = self.config.hostname.clone();
        match self.link.resolve(&hostname) {
            Resolution::Resolved(addr) => self.resolution_complete(Some(addr)),
            Resolution::Pending => {}
            Resolution::Failed(err) => {
                crate::log_warn!("syslog: resolution of collector failed: {:?}", err);
            }
        }
    }

    /// IP connectivity lost: deactivate and abandon any in-flight send.
    ///
    /// Events are still accepted while down; they accumulate (and evict)
    /// until connectivity returns. The in-flight flag is reset here so a
    /// completion dropped during teardown cannot wedge the transport after
    /// a reconnect.
    pub fn notify_link_down(&mut self) {
        self.state = LinkState::Inactive;
        self.sending = false;
        self.host.clear();
        let _ = self.host.push_str(UNSPECIFIED_HOST);
    }

    /// Render `event`, queue it, and drain if possible.
    pub fn emit(&mut self, event: Event) {
        let timestamp = self.clock.timestamp();
        let host = &self.host;
        let app_name = self.config.app_name;
        self.ring.push_with(|record| {
            render::render(record, &event, timestamp.as_str(), host.as_str(), app_name);
            crate::log_debug!(
                "syslog: {}",
                core::str::from_utf8(record.bytes()).unwrap_or("<non-ascii record>")
            );
        });
        self.attempt_drain();
    }

    /// Completion of a hostname resolution, possibly run inline from
    /// [`notify_link_up`](Self::notify_link_up).
    ///
    /// On success the collector endpoint is stored, the UDP flow opened and
    /// the ring drained. On failure the transport stays `Resolving` and
    /// schedules no retry of its own; the connectivity manager's next
    /// `notify_link_up` resolves again. A completion arriving in any other
    /// state is stale (the link dropped since the request) and is ignored.
    pub fn resolution_complete(&mut self, addr: Option<[u8; 4]>) {
        if self.state != LinkState::Resolving {
            return;
        }
        let Some(addr) = addr else {
            crate::log_warn!("syslog: collector address lookup failed");
            return;
        };
        let peer = SocketEndpoint::new(addr, self.config.port);
        if let Err(err) = self.link.open(peer) {
            crate::log_warn!("syslog: opening UDP flow failed: {:?}", err);
            return;
        }
        self.peer = Some(peer);
        self.state = LinkState::Active;
        self.attempt_drain();
    }

    /// Completion of an asynchronous datagram send.
    ///
    /// The completed endpoint must match the current peer (address and
    /// port); completions for a previous peer or a foreign socket are
    /// ignored.
    pub fn send_complete(&mut self, peer: SocketEndpoint) {
        if self.peer != Some(peer) {
            return;
        }
        self.sending = false;
        self.attempt_drain();
    }

    /// Submit queued records until the ring empties or a send goes
    /// asynchronous.
    ///
    /// A record the link accepts synchronously is followed immediately by
    /// the next; a record that goes asynchronous leaves the drain to resume
    /// from the send completion; a rejected record is dropped and the drain
    /// moves on. Queue order is preserved throughout, and at most one
    /// datagram is ever outstanding.
    fn attempt_drain(&mut self) {
        if self.sending || self.state != LinkState::Active {
            return;
        }
        while let Some(record) = self.ring.pop_front() {
            match self.link.send(record.bytes()) {
                SendOutcome::Accepted => {}
                SendOutcome::Pending => {
                    self.sending = true;
                    return;
                }
                SendOutcome::Rejected(err) => {
                    crate::log_warn!("syslog: send rejected, record dropped: {:?}", err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::syslog::ring::Record;
    use crate::platform::error::{DnsError, NetError};
    use crate::platform::mock::{MockClock, MockLink};

    const COLLECTOR: [u8; 4] = [192, 0, 2, 10];
    const PORT: u16 = 514;
    const PEER: SocketEndpoint = SocketEndpoint::new(COLLECTOR, PORT);
    const LOCAL_IP: [u8; 4] = [192, 168, 1, 50];
    const TS: &str = "2026-01-01T00:00:00Z";

    fn config() -> SyslogConfig {
        SyslogConfig {
            hostname: String::try_from("logs.example.net").unwrap(),
            port: PORT,
            app_name: "pico-beacon",
        }
    }

    fn transport() -> EventTransport<MockLink, MockClock> {
        EventTransport::new(MockLink::resolving_to(COLLECTOR), MockClock::new(TS), config())
    }

    /// The line `emit` would render for `event` with the given HOST field
    fn expected_line(event: &Event, host: &str) -> std::string::String {
        let mut record: Record = Record::new();
        render::render(&mut record, event, TS, host, "pico-beacon");
        std::string::String::from_utf8(record.bytes().to_vec()).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let t = transport();
        assert_eq!(t.state(), LinkState::Inactive);
        assert!(!t.is_sending());
        assert_eq!(t.queued(), 0);
    }

    #[test]
    fn test_emit_while_inactive_accumulates() {
        let mut t = transport();
        t.emit(Event::SyslogStarted);
        t.emit(Event::WifiStarted);

        assert_eq!(t.queued(), 2);
        assert!(t.link_mut().sent().is_empty());
    }

    #[test]
    fn test_link_up_resolves_and_activates_inline() {
        let mut t = transport();
        t.notify_link_up(LOCAL_IP);

        assert_eq!(t.state(), LinkState::Active);
        assert_eq!(t.link_mut().resolve_calls().len(), 1);
        assert_eq!(t.link_mut().resolve_calls()[0].as_str(), "logs.example.net");
        assert_eq!(t.link_mut().opened(), Some(PEER));
    }

    #[test]
    fn test_activation_drains_queued_records_in_order() {
        let mut t = transport();
        for code in 0..3 {
            t.emit(Event::WifiEvent { code });
        }
        t.notify_link_up(LOCAL_IP);

        assert_eq!(t.queued(), 0);
        let link = t.link_mut();
        assert_eq!(link.sent().len(), 3);
        for (index, code) in (0u32..3).enumerate() {
            assert!(link.sent_str(index).contains(&format!("Event=\"{}\"", code)));
        }
    }

    #[test]
    fn test_eviction_preserves_oldest_history() {
        // Ten records into a depth-8 ring while inactive: the oldest seven
        // survive, the newest slot ends up holding the tenth.
        let mut t = transport();
        for code in 1..=10 {
            t.emit(Event::WifiEvent { code });
        }
        assert_eq!(t.queued(), 8);
        assert_eq!(t.dropped(), 2);

        t.notify_link_up(LOCAL_IP);
        let link = t.link_mut();
        assert_eq!(link.sent().len(), 8);
        let expected: [u32; 8] = [1, 2, 3, 4, 5, 6, 7, 10];
        for (index, code) in expected.iter().enumerate() {
            assert!(
                link.sent_str(index).contains(&format!("Event=\"{}\"", code)),
                "record {} was {:?}",
                index,
                link.sent_str(index)
            );
        }
    }

    #[test]
    fn test_end_to_end_rendered_bytes() {
        // Same scenario as above, byte-for-byte: every datagram must equal
        // its independently rendered form. Records queued while inactive
        // carry the placeholder HOST.
        let mut t = transport();
        for code in 1..=10 {
            t.emit(Event::WifiEvent { code });
        }
        t.notify_link_up(LOCAL_IP);

        let expected: [u32; 8] = [1, 2, 3, 4, 5, 6, 7, 10];
        let link = t.link_mut();
        for (index, code) in expected.iter().enumerate() {
            let line = expected_line(&Event::WifiEvent { code: *code }, "0.0.0.0");
            assert_eq!(link.sent_str(index), line, "record {}", index);
        }
    }

    #[test]
    fn test_host_field_follows_link_state() {
        let mut t = transport();
        t.notify_link_up(LOCAL_IP);
        t.emit(Event::SyslogStarted);
        assert!(t.link_mut().sent_str(0).contains(" 192.168.1.50 "));

        t.notify_link_down();
        t.emit(Event::WifiStarted);
        t.notify_link_up(LOCAL_IP);
        assert!(t.link_mut().sent_str(1).contains(" 0.0.0.0 "));
    }

    #[test]
    fn test_async_resolution() {
        let mut t = transport();
        t.link_mut().set_resolution(Resolution::Pending);
        t.emit(Event::SyslogStarted);
        t.notify_link_up(LOCAL_IP);
        assert_eq!(t.state(), LinkState::Resolving);
        assert!(t.link_mut().sent().is_empty());

        t.resolution_complete(Some(COLLECTOR));
        assert_eq!(t.state(), LinkState::Active);
        assert_eq!(t.link_mut().sent().len(), 1);
    }

    #[test]
    fn test_resolution_failure_stays_resolving() {
        let mut t = transport();
        t.link_mut()
            .set_resolution(Resolution::Failed(DnsError::NotFound));
        t.notify_link_up(LOCAL_IP);
        assert_eq!(t.state(), LinkState::Resolving);

        // No retry from the transport itself; records keep accumulating.
        t.emit(Event::SyslogStarted);
        assert_eq!(t.queued(), 1);
    }

    #[test]
    fn test_resolution_callback_failure_stays_resolving() {
        let mut t = transport();
        t.link_mut().set_resolution(Resolution::Pending);
        t.notify_link_up(LOCAL_IP);

        t.resolution_complete(None);
        assert_eq!(t.state(), LinkState::Resolving);
    }

    #[test]
    fn test_stale_resolution_ignored_after_link_down() {
        let mut t = transport();
        t.link_mut().set_resolution(Resolution::Pending);
        t.notify_link_up(LOCAL_IP);
        t.notify_link_down();

        t.resolution_complete(Some(COLLECTOR));
        assert_eq!(t.state(), LinkState::Inactive);
    }

    #[test]
    fn test_open_failure_stays_resolving() {
        let mut t = transport();
        t.link_mut().set_open_result(Err(NetError::BindFailed));
        t.notify_link_up(LOCAL_IP);
        assert_eq!(t.state(), LinkState::Resolving);
    }

    #[test]
    fn test_single_outstanding_send() {
        let mut t = transport();
        t.notify_link_up(LOCAL_IP);
        t.link_mut().script_send(SendOutcome::Pending);

        t.emit(Event::WifiEvent { code: 1 });
        assert!(t.is_sending());
        assert_eq!(t.link_mut().sent().len(), 1);

        // Further emits queue behind the outstanding datagram. The mock
        // panics if the transport were to submit a second send here.
        t.emit(Event::WifiEvent { code: 2 });
        t.emit(Event::WifiEvent { code: 3 });
        assert_eq!(t.queued(), 2);
        assert_eq!(t.link_mut().sent().len(), 1);

        t.link_mut().finish_send();
        t.send_complete(PEER);
        assert!(!t.is_sending());
        assert_eq!(t.queued(), 0);
        assert_eq!(t.link_mut().sent().len(), 3);
        assert!(t.link_mut().sent_str(1).contains("Event=\"2\""));
        assert!(t.link_mut().sent_str(2).contains("Event=\"3\""));
    }

    #[test]
    fn test_stray_send_completion_ignored() {
        let mut t = transport();
        t.notify_link_up(LOCAL_IP);
        t.link_mut().script_send(SendOutcome::Pending);
        t.emit(Event::WifiEvent { code: 1 });
        assert!(t.is_sending());

        // Wrong port, then wrong address: neither may clear the flag.
        t.send_complete(SocketEndpoint::new(COLLECTOR, PORT + 1));
        assert!(t.is_sending());
        t.send_complete(SocketEndpoint::new([10, 0, 0, 1], PORT));
        assert!(t.is_sending());
    }

    #[test]
    fn test_send_rejection_drops_record_and_continues() {
        let mut t = transport();
        t.emit(Event::WifiEvent { code: 1 });
        t.emit(Event::WifiEvent { code: 2 });
        t.emit(Event::WifiEvent { code: 3 });

        t.link_mut()
            .script_send(SendOutcome::Rejected(NetError::SendFailed));
        t.notify_link_up(LOCAL_IP);

        // All three were submitted; the first was rejected and dropped, the
        // drain carried on with the rest.
        assert_eq!(t.queued(), 0);
        assert_eq!(t.link_mut().sent().len(), 3);
    }

    #[test]
    fn test_link_down_resets_in_flight_flag() {
        let mut t = transport();
        t.notify_link_up(LOCAL_IP);
        t.link_mut().script_send(SendOutcome::Pending);
        t.emit(Event::WifiEvent { code: 1 });
        assert!(t.is_sending());

        t.notify_link_down();
        assert!(!t.is_sending());
        assert_eq!(t.state(), LinkState::Inactive);
    }

    #[test]
    fn test_down_then_up_resumes_draining() {
        let mut t = transport();
        t.notify_link_up(LOCAL_IP);
        t.emit(Event::WifiEvent { code: 1 });
        assert_eq!(t.link_mut().sent().len(), 1);

        t.notify_link_down();
        t.emit(Event::WifiEvent { code: 2 });
        t.emit(Event::WifiEvent { code: 3 });
        assert_eq!(t.queued(), 2);

        t.notify_link_up(LOCAL_IP);
        assert_eq!(t.state(), LinkState::Active);
        assert_eq!(t.queued(), 0);
        assert_eq!(t.link_mut().sent().len(), 3);
        assert!(t.link_mut().sent_str(1).contains("Event=\"2\""));
        assert!(t.link_mut().sent_str(2).contains("Event=\"3\""));
    }

    #[test]
    fn test_emit_during_active_sends_immediately() {
        let mut t = transport();
        t.notify_link_up(LOCAL_IP);
        t.emit(Event::TempReading { tenths: 57 });

        assert_eq!(t.queued(), 0);
        assert_eq!(t.link_mut().sent().len(), 1);
        assert!(t.link_mut().sent_str(0).contains("Temp=\"5.7degC\""));
    }

    #[test]
    fn test_truncated_record_within_capacity() {
        // A transport sized at 32-byte records must truncate, not overflow.
        let mut t: EventTransport<MockLink, MockClock, 8, 32> = EventTransport::new(
            MockLink::resolving_to(COLLECTOR),
            MockClock::new(TS),
            config(),
        );
        t.notify_link_up(LOCAL_IP);
        t.emit(Event::WifiGotIp {
            ip: LOCAL_IP,
            mask: [255, 255, 255, 0],
            gateway: [192, 168, 1, 1],
        });

        let link = t.link_mut();
        assert_eq!(link.sent().len(), 1);
        assert_eq!(link.sent()[0].len(), 32);
    }

    #[test]
    fn test_default_config_port_fallback() {
        let config = SyslogConfig::default();
        assert_eq!(config.app_name, "pico-beacon");
        assert!(config.port > 0);
    }
}
