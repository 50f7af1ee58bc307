//! Mock network link
//!
//! Records every resolve/open/send interaction and lets tests script the
//! outcomes. `send` panics if a second datagram is submitted while one is
//! outstanding, which is how the single-outstanding-send invariant of the
//! transport is checked.

use crate::platform::error::NetError;
use crate::platform::traits::net::{LogLink, Resolution, SendOutcome, SocketEndpoint};
use heapless::{Deque, String, Vec};

/// Capacity of one recorded payload
const PAYLOAD_CAPACITY: usize = 256;

/// Maximum number of recorded submissions
const SENT_CAPACITY: usize = 16;

/// Scriptable, recording [`LogLink`]
pub struct MockLink {
    resolution: Resolution,
    resolve_calls: Vec<String<64>, 4>,
    open_result: Result<(), NetError>,
    opened: Option<SocketEndpoint>,
    send_script: Deque<SendOutcome, SENT_CAPACITY>,
    sent: Vec<Vec<u8, PAYLOAD_CAPACITY>, SENT_CAPACITY>,
    in_flight: bool,
}

impl MockLink {
    /// Link that resolves synchronously to `addr`
    pub fn resolving_to(addr: [u8; 4]) -> Self {
        Self {
            resolution: Resolution::Resolved(addr),
            resolve_calls: Vec::new(),
            open_result: Ok(()),
            opened: None,
            send_script: Deque::new(),
            sent: Vec::new(),
            in_flight: false,
        }
    }

    /// Replace the outcome returned by `resolve`
    pub fn set_resolution(&mut self, resolution: Resolution) {
        self.resolution = resolution;
    }

    /// Replace the outcome returned by `open`
    pub fn set_open_result(&mut self, result: Result<(), NetError>) {
        self.open_result = result;
    }

    /// Queue the outcome for the next unscripted `send`.
    ///
    /// When the script runs dry, sends are `Accepted`.
    pub fn script_send(&mut self, outcome: SendOutcome) {
        self.send_script
            .push_back(outcome)
            .expect("send script full");
    }

    /// Hostnames passed to `resolve`, in order
    pub fn resolve_calls(&self) -> &[String<64>] {
        &self.resolve_calls
    }

    /// Endpoint passed to `open`, if any
    pub fn opened(&self) -> Option<SocketEndpoint> {
        self.opened
    }

    /// Payloads submitted to `send`, in order (including rejected ones)
    pub fn sent(&self) -> &[Vec<u8, PAYLOAD_CAPACITY>] {
        &self.sent
    }

    /// The submission at `index`, as text
    pub fn sent_str(&self, index: usize) -> &str {
        core::str::from_utf8(&self.sent[index]).expect("payload is not UTF-8")
    }

    /// True while an asynchronous send is outstanding
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Complete the outstanding asynchronous send.
    ///
    /// The test then delivers the completion to the transport itself.
    pub fn finish_send(&mut self) {
        assert!(self.in_flight, "no send outstanding");
        self.in_flight = false;
    }
}

impl LogLink for MockLink {
    fn resolve(&mut self, hostname: &str) -> Resolution {
        let _ = self
            .resolve_calls
            .push(String::try_from(hostname).unwrap_or_default());
        self.resolution
    }

    fn open(&mut self, remote: SocketEndpoint) -> Result<(), NetError> {
        self.opened = Some(remote);
        self.open_result
    }

    fn send(&mut self, payload: &[u8]) -> SendOutcome {
        assert!(
            !self.in_flight,
            "second datagram submitted while one is outstanding"
        );
        let mut copy = Vec::new();
        copy.extend_from_slice(payload)
            .expect("payload exceeds mock capacity");
        self.sent.push(copy).expect("too many sends recorded");

        let outcome = self
            .send_script
            .pop_front()
            .unwrap_or(SendOutcome::Accepted);
        if outcome == SendOutcome::Pending {
            self.in_flight = true;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_interactions() {
        let mut link = MockLink::resolving_to([192, 0, 2, 10]);
        assert_eq!(
            link.resolve("logs.example.net"),
            Resolution::Resolved([192, 0, 2, 10])
        );
        assert_eq!(link.resolve_calls().len(), 1);

        let peer = SocketEndpoint::new([192, 0, 2, 10], 514);
        assert!(link.open(peer).is_ok());
        assert_eq!(link.opened(), Some(peer));

        assert_eq!(link.send(b"hello"), SendOutcome::Accepted);
        assert_eq!(link.sent_str(0), "hello");
    }

    #[test]
    fn test_scripted_send_outcomes() {
        let mut link = MockLink::resolving_to([192, 0, 2, 10]);
        link.script_send(SendOutcome::Rejected(NetError::SendFailed));
        link.script_send(SendOutcome::Pending);

        assert_eq!(
            link.send(b"a"),
            SendOutcome::Rejected(NetError::SendFailed)
        );
        assert_eq!(link.send(b"b"), SendOutcome::Pending);
        assert!(link.in_flight());

        link.finish_send();
        assert_eq!(link.send(b"c"), SendOutcome::Accepted);
    }

    #[test]
    #[should_panic(expected = "second datagram")]
    fn test_send_while_in_flight_panics() {
        let mut link = MockLink::resolving_to([192, 0, 2, 10]);
        link.script_send(SendOutcome::Pending);
        let _ = link.send(b"a");
        let _ = link.send(b"b");
    }
}
