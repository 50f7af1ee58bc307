//! embassy-net network link
//!
//! Implements [`LogLink`] over the embassy-net stack. The trait methods are
//! synchronous, so the asynchronous pieces (DNS queries, datagram sends) are
//! handed to pump tasks through capacity-1 channels; the tasks deliver their
//! completions back into the transport. The send channel's single slot is
//! what makes a second outstanding datagram impossible at this layer too.

use embassy_net::dns::DnsQueryType;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{IpAddress, IpEndpoint, Ipv4Address, Stack};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::{String, Vec};

use crate::communication::syslog::catalog::Event;
use crate::communication::syslog::ring::RECORD_CAPACITY;
use crate::communication::syslog::transport::{EventTransport, SyslogConfig, MAX_HOSTNAME_LEN};
use crate::core::traits::{EmbassyState, SharedState};
use crate::platform::error::{DnsError, NetError};
use crate::platform::rp2350::clock::SntpClock;
use crate::platform::traits::net::{parse_ipv4, LogLink, Resolution, SendOutcome, SocketEndpoint};

/// Local UDP port the shipper binds
const LOCAL_PORT: u16 = 30514;

/// One datagram handed to the sender task
struct SendJob {
    payload: Vec<u8, RECORD_CAPACITY>,
    peer: SocketEndpoint,
}

static DNS_REQUESTS: Channel<CriticalSectionRawMutex, String<MAX_HOSTNAME_LEN>, 1> =
    Channel::new();
static SEND_JOBS: Channel<CriticalSectionRawMutex, SendJob, 1> = Channel::new();

/// The transport instance shared between application code and the pump tasks
pub static SYSLOG: EmbassyState<Option<EventTransport<NetLink, SntpClock>>> =
    EmbassyState::new(None);

/// Install the global transport. Call once, before spawning the pump tasks.
pub fn install_transport(config: SyslogConfig) {
    SYSLOG.with_mut(|slot| {
        let mut transport = EventTransport::new(NetLink::new(), SntpClock::new(), config);
        transport.emit(Event::SyslogStarted);
        *slot = Some(transport);
    });
}

/// Run `f` against the installed transport; a no-op until installation.
pub fn with_transport<F>(f: F)
where
    F: FnOnce(&mut EventTransport<NetLink, SntpClock>),
{
    SYSLOG.with_mut(|slot| {
        if let Some(transport) = slot.as_mut() {
            f(transport);
        }
    });
}

/// [`LogLink`] over embassy-net
pub struct NetLink {
    peer: Option<SocketEndpoint>,
}

impl NetLink {
    pub const fn new() -> Self {
        Self { peer: None }
    }
}

impl Default for NetLink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogLink for NetLink {
    fn resolve(&mut self, hostname: &str) -> Resolution {
        // A literal address needs no resolver round-trip.
        if let Some(addr) = parse_ipv4(hostname) {
            return Resolution::Resolved(addr);
        }
        match DNS_REQUESTS.try_send(String::try_from(hostname).unwrap_or_default()) {
            Ok(()) => Resolution::Pending,
            Err(_) => Resolution::Failed(DnsError::Failure),
        }
    }

    fn open(&mut self, remote: SocketEndpoint) -> Result<(), NetError> {
        // The socket itself lives in the sender task; the link only pins
        // the destination every datagram is addressed to.
        self.peer = Some(remote);
        Ok(())
    }

    fn send(&mut self, payload: &[u8]) -> SendOutcome {
        let Some(peer) = self.peer else {
            return SendOutcome::Rejected(NetError::NotOpen);
        };
        let mut copy = Vec::new();
        if copy.extend_from_slice(payload).is_err() {
            return SendOutcome::Rejected(NetError::SendFailed);
        }
        match SEND_JOBS.try_send(SendJob {
            payload: copy,
            peer,
        }) {
            Ok(()) => SendOutcome::Pending,
            Err(_) => SendOutcome::Rejected(NetError::Busy),
        }
    }
}

/// Resolver pump: answers the transport's asynchronous DNS requests.
#[embassy_executor::task]
pub async fn dns_task(stack: Stack<'static>) -> ! {
    loop {
        let hostname = DNS_REQUESTS.receive().await;
        let addr = match stack.dns_query(hostname.as_str(), DnsQueryType::A).await {
            Ok(addrs) => addrs.first().and_then(|a| match a {
                IpAddress::Ipv4(v4) => Some(v4.octets()),
                #[allow(unreachable_patterns)]
                _ => None,
            }),
            Err(_) => {
                crate::log_warn!("syslog: DNS query for {} failed", hostname.as_str());
                None
            }
        };
        with_transport(|transport| transport.resolution_complete(addr));
    }
}

/// Sender pump: puts queued datagrams on the wire and reports completions.
#[embassy_executor::task]
pub async fn send_task(stack: Stack<'static>) -> ! {
    let mut rx_meta = [PacketMetadata::EMPTY; 4];
    let mut rx_buffer = [0u8; 512];
    let mut tx_meta = [PacketMetadata::EMPTY; 4];
    let mut tx_buffer = [0u8; 1024];
    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    if socket.bind(LOCAL_PORT).is_err() {
        crate::log_error!("syslog: binding UDP port {} failed", LOCAL_PORT);
    }

    loop {
        let job = SEND_JOBS.receive().await;
        let endpoint = IpEndpoint::new(
            IpAddress::Ipv4(Ipv4Address::new(
                job.peer.addr[0],
                job.peer.addr[1],
                job.peer.addr[2],
                job.peer.addr[3],
            )),
            job.peer.port,
        );
        if socket.send_to(&job.payload, endpoint).await.is_err() {
            crate::log_warn!("syslog: datagram send failed");
        }
        // Success or not, the slot is free again; the transport decides
        // what to do next.
        with_transport(|transport| transport.send_complete(job.peer));
    }
}
