//! The two-thread mDNS discovery event loop (spec §4.4). Thread A (this
//! module's `run_event_loop`, spawned by `discover`) owns a non-blocking
//! UDP socket and watches socket-readable, the cancellation channel, and
//! a deadline; thread B is whichever caller holds the returned
//! `DiscoverySession` and eventually calls `join`.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use commissioner_types::{BorderAgent, Error, Result};
use crossbeam_channel::{bounded, Sender};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use tracing::{debug, warn};

use crate::query;
use crate::txt;
use crate::wire::{parse_message, RData};

const MDNS_MULTICAST_ADDR: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 251);
const MDNS_PORT: u16 = 5353;
// Bounds worst-case cancellation latency (spec §8 scenario 5: return
// within an additional 10 ms of the cancel signal).
const POLL_INTERVAL: Duration = Duration::from_millis(5);
const RECV_BUF_LEN: usize = 16 * 1024;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(4000);

/// A live discovery scan: a cancellation trigger and a handle to the
/// worker thread (spec §4.4 "Cancellation").
pub struct DiscoverySession {
    cancel_tx: Sender<()>,
    handle: JoinHandle<Result<usize>>,
}

impl DiscoverySession {
    /// Requests cancellation; safe to call from any thread (spec §4.2's
    /// cancellation contract applies equally here).
    pub fn cancel(&self) {
        let _ = self.cancel_tx.try_send(());
    }

    /// Joins the worker thread, returning the count of BorderAgents
    /// delivered to the handler (buffered records are delivered even on
    /// cancellation).
    pub fn join(self) -> Result<usize> {
        self.handle
            .join()
            .unwrap_or_else(|_| Err(Error::invalid_state("discovery worker panicked")))
    }
}

/// Broadcasts the PTR query and runs the receive loop on a dedicated
/// thread, delivering finished `BorderAgent` records to `handler` in
/// arrival order as they complete.
pub fn discover(
    interface: Option<String>,
    timeout: Duration,
    mut handler: impl FnMut(BorderAgent) + Send + 'static,
) -> DiscoverySession {
    let (cancel_tx, cancel_rx) = bounded::<()>(1);

    let handle = std::thread::spawn(move || -> Result<usize> {
        let socket = open_socket(interface.as_deref())?;
        let query_bytes = query::build_ptr_query();
        let dest = SocketAddr::V4(SocketAddrV4::new(MDNS_MULTICAST_ADDR, MDNS_PORT));
        socket
            .send_to(&query_bytes, &SockAddr::from(dest))
            .map_err(|e| Error::io_error(format!("sending mDNS query: {e}")))?;

        let deadline = Instant::now() + timeout;
        let mut state = DiscoveryState::default();
        let mut delivered = 0usize;
        let mut cancelled = false;

        loop {
            if cancel_rx.try_recv().is_ok() {
                cancelled = true;
                break;
            }
            if Instant::now() >= deadline {
                break;
            }
            socket
                .set_read_timeout(Some(POLL_INTERVAL))
                .map_err(|e| Error::io_error(e.to_string()))?;

            let mut buf = [std::mem::MaybeUninit::new(0u8); RECV_BUF_LEN];
            match socket.recv(&mut buf) {
                Ok(n) => {
                    let bytes: Vec<u8> = buf[..n].iter().map(|b| unsafe { b.assume_init() }).collect();
                    for agent in state.ingest(&bytes) {
                        handler(agent);
                        delivered += 1;
                    }
                }
                Err(e) if matches!(e.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut) => {
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, "mDNS recv failed, continuing scan");
                }
            }
        }

        if cancelled {
            return Err(Error::cancelled(format!(
                "discovery cancelled after delivering {delivered} record(s)"
            )));
        }
        Ok(delivered)
    });

    DiscoverySession { cancel_tx, handle }
}

fn open_socket(interface: Option<&str>) -> Result<Socket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
        .map_err(|e| Error::io_error(format!("opening mDNS socket: {e}")))?;
    socket
        .set_nonblocking(true)
        .map_err(|e| Error::io_error(e.to_string()))?;
    socket
        .set_reuse_address(true)
        .map_err(|e| Error::io_error(e.to_string()))?;

    #[cfg(any(target_os = "linux", target_os = "android"))]
    if let Some(name) = interface.filter(|n| !n.is_empty()) {
        socket
            .bind_device(Some(name.as_bytes()))
            .map_err(|e| Error::io_error(format!("binding to interface {name}: {e}")))?;
    }
    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    if interface.filter(|n| !n.is_empty()).is_some() {
        debug!("interface binding is only supported on linux/android in this build");
    }

    let bind_addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0));
    socket
        .bind(&SockAddr::from(bind_addr))
        .map_err(|e| Error::io_error(format!("binding mDNS socket: {e}")))?;
    Ok(socket)
}

/// Partial-record assembly state across one scan: PTR answers seed an
/// instance, TXT/SRV answers enrich it by owner name, and A/AAAA
/// answers resolve the SRV target hostname back to that instance.
#[derive(Default)]
struct DiscoveryState {
    agents: HashMap<String, BorderAgent>,
    hostname_to_instance: HashMap<String, String>,
}

impl DiscoveryState {
    /// Applies one datagram's records to the running state, returning
    /// any agents that just crossed from "unseen" to "has at least one
    /// field" (delivered at most once is not guaranteed across multiple
    /// datagrams, mirroring the append-only buffer the spec describes).
    fn ingest(&mut self, datagram: &[u8]) -> Vec<BorderAgent> {
        let records = match parse_message(datagram) {
            Some(r) => r,
            None => {
                warn!("failed to parse mDNS datagram, dropping");
                return Vec::new();
            }
        };

        let mut touched = Vec::new();

        for record in &records {
            match &record.rdata {
                RData::Ptr(instance) => {
                    self.agents
                        .entry(instance.clone())
                        .or_insert_with(|| BorderAgent::new("", 0, ""));
                    touched.push(instance.clone());
                }
                RData::Txt(pairs) => {
                    let agent = self
                        .agents
                        .entry(record.name.clone())
                        .or_insert_with(|| BorderAgent::new("", 0, ""));
                    for (key, value) in pairs {
                        txt::apply_txt_pair(agent, key, value);
                    }
                    touched.push(record.name.clone());
                }
                RData::Srv { target, port } => {
                    let agent = self
                        .agents
                        .entry(record.name.clone())
                        .or_insert_with(|| BorderAgent::new("", 0, ""));
                    agent.port = *port;
                    self.hostname_to_instance
                        .insert(target.clone(), record.name.clone());
                    touched.push(record.name.clone());
                }
                RData::A(ipv4) => {
                    if let Some(instance) = self.hostname_to_instance.get(&record.name).cloned() {
                        let agent = self.agents.entry(instance.clone()).or_insert_with(|| BorderAgent::new("", 0, ""));
                        if agent.address.is_empty() {
                            agent.address = IpAddr::from(*ipv4).to_string();
                        }
                        touched.push(instance);
                    }
                }
                RData::Aaaa(ipv6) => {
                    if let Some(instance) = self.hostname_to_instance.get(&record.name).cloned() {
                        let agent = self.agents.entry(instance.clone()).or_insert_with(|| BorderAgent::new("", 0, ""));
                        // AAAA beats A regardless of arrival order (spec §4.4).
                        agent.address = IpAddr::from(*ipv6).to_string();
                        touched.push(instance);
                    }
                }
                RData::Other => {}
            }
        }

        let mut out = Vec::new();
        for instance in touched {
            if let Some(agent) = self.agents.get(&instance) {
                if txt::any_field_present(agent) {
                    let mut finished = agent.clone();
                    finished.update_timestamp = Some(wall_clock_now());
                    out.push(finished);
                }
            }
        }
        out
    }
}

fn wall_clock_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
