//! In-memory transport: every host bound through the same [`LocalHub`]
//! can reach every other one, with no network I/O.
//!
//! Delivery is instantaneous and lossless. Connection attempts, deferred and
//! immediate disconnects, peer limits and channel limits behave like the
//! transport contract describes, which makes the hub suitable for driving a
//! server and its clients in the same process.

use std::{
    collections::{HashMap, VecDeque},
    net::{IpAddr, Ipv4Addr, SocketAddr},
    ops::RangeInclusive,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use log::{debug, warn};

use super::{
    DisconnectMode, EventReceiver, HostConfig, PeerHandle, PeerSender, Socket, TransportError,
    TransportEvent,
};
use crate::types::ChannelId;

const EPHEMERAL_PORTS: RangeInclusive<u16> = 49152..=65535;

/// A shared switchboard connecting local hosts
#[derive(Clone, Default)]
pub struct LocalHub {
    state: Arc<Mutex<HubState>>,
}

impl LocalHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// A socket that binds hosts on this hub
    pub fn socket(&self) -> LocalSocket {
        LocalSocket { hub: self.clone() }
    }

    /// Kills the host at `address` as if its process died: its peers see a
    /// disconnect with data 0 and its owner's next poll fails.
    /// Returns whether a host was bound there.
    pub fn close(&self, address: &SocketAddr) -> bool {
        self.lock().close_host(address)
    }

    pub fn is_bound(&self, address: &SocketAddr) -> bool {
        self.lock().hosts.contains_key(address)
    }

    /// Number of hosts currently bound
    pub fn host_count(&self) -> usize {
        self.lock().hosts.len()
    }

    /// Number of live connections the host at `address` holds
    pub fn connection_count(&self, address: &SocketAddr) -> usize {
        self.lock()
            .hosts
            .get(address)
            .map(|host| host.links.len())
            .unwrap_or(0)
    }

    /// Number of events waiting to be polled by the host at `address`
    pub fn pending_events(&self, address: &SocketAddr) -> usize {
        self.lock()
            .hosts
            .get(address)
            .map(|host| host.events.len())
            .unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Binds hosts on a [`LocalHub`]
#[derive(Clone)]
pub struct LocalSocket {
    hub: LocalHub,
}

impl LocalSocket {
    pub fn new(hub: &LocalHub) -> Self {
        hub.socket()
    }
}

impl Socket for LocalSocket {
    fn bind(
        self: Box<Self>,
        config: &HostConfig,
    ) -> Result<(Box<dyn PeerSender>, Box<dyn EventReceiver>), TransportError> {
        let address = self.hub.lock().bind(config)?;

        let sender = LocalPeerSender {
            hub: self.hub.clone(),
            address,
        };
        let receiver = LocalEventReceiver {
            hub: self.hub,
            address,
        };
        Ok((Box::new(sender), Box::new(receiver)))
    }
}

impl From<LocalSocket> for Box<dyn Socket> {
    fn from(socket: LocalSocket) -> Self {
        Box::new(socket)
    }
}

struct LocalPeerSender {
    hub: LocalHub,
    address: SocketAddr,
}

impl PeerSender for LocalPeerSender {
    fn connect(&mut self, address: &SocketAddr, data: u32) -> Result<PeerHandle, TransportError> {
        self.hub.lock().connect(self.address, address, data)
    }

    fn send(
        &mut self,
        peer: &PeerHandle,
        channel: ChannelId,
        payload: Box<[u8]>,
    ) -> Result<(), TransportError> {
        self.hub.lock().send(self.address, peer, channel, payload)
    }

    fn disconnect(&mut self, peer: &PeerHandle, mode: DisconnectMode, data: u32) {
        self.hub.lock().disconnect(self.address, peer, mode, data);
    }

    fn peer_address(&self, peer: &PeerHandle) -> Option<SocketAddr> {
        self.hub
            .lock()
            .hosts
            .get(&self.address)
            .and_then(|host| host.links.get(peer))
            .map(|link| link.remote_address)
    }

    fn local_address(&self) -> Option<SocketAddr> {
        Some(self.address)
    }
}

impl Drop for LocalPeerSender {
    fn drop(&mut self) {
        self.hub.lock().close_host(&self.address);
    }
}

struct LocalEventReceiver {
    hub: LocalHub,
    address: SocketAddr,
}

impl EventReceiver for LocalEventReceiver {
    // Delivery is instantaneous, so there is never anything worth waiting for
    fn poll(&mut self, _timeout: Duration) -> Result<Option<TransportEvent>, TransportError> {
        let mut hub = self.hub.lock();
        let host = hub
            .hosts
            .get_mut(&self.address)
            .ok_or(TransportError::HostClosed)?;
        Ok(host.events.pop_front())
    }
}

#[derive(Default)]
struct HubState {
    hosts: HashMap<SocketAddr, HostState>,
    next_peer_id: u64,
}

struct HostState {
    peer_count: usize,
    channel_count: usize,
    links: HashMap<PeerHandle, Link>,
    events: VecDeque<TransportEvent>,
}

#[derive(Clone, Copy)]
struct Link {
    remote_address: SocketAddr,
    remote_peer: PeerHandle,
}

fn event_peer(event: &TransportEvent) -> PeerHandle {
    match event {
        TransportEvent::Connect { peer, .. }
        | TransportEvent::Disconnect { peer, .. }
        | TransportEvent::Receive { peer, .. } => *peer,
    }
}

impl HubState {
    fn bind(&mut self, config: &HostConfig) -> Result<SocketAddr, TransportError> {
        let address = match config.address {
            Some(address) if address.port() == 0 => self.ephemeral_address(address.ip())?,
            Some(address) => {
                if self.hosts.contains_key(&address) {
                    return Err(TransportError::AddressInUse(address));
                }
                address
            }
            None => self.ephemeral_address(IpAddr::V4(Ipv4Addr::LOCALHOST))?,
        };

        self.hosts.insert(
            address,
            HostState {
                peer_count: config.peer_count,
                channel_count: config.channel_count,
                links: HashMap::new(),
                events: VecDeque::new(),
            },
        );
        debug!("local host bound at {}", address);
        Ok(address)
    }

    /// Picks a random free port in the ephemeral range, scanning onward from
    /// the random start so every port is tried at most once
    fn ephemeral_address(&self, ip: IpAddr) -> Result<SocketAddr, TransportError> {
        let first = u32::from(*EPHEMERAL_PORTS.start());
        let span = u32::from(*EPHEMERAL_PORTS.end()) - first + 1;
        let offset = fastrand::u32(0..span);

        (0..span)
            .filter_map(|step| u16::try_from(first + (offset + step) % span).ok())
            .map(|port| SocketAddr::new(ip, port))
            .find(|address| !self.hosts.contains_key(address))
            .ok_or_else(|| TransportError::Io(format!("no free ephemeral port left on {}", ip)))
    }

    fn allocate_peer(&mut self) -> PeerHandle {
        self.next_peer_id += 1;
        PeerHandle::new(self.next_peer_id)
    }

    fn connect(
        &mut self,
        from: SocketAddr,
        to: &SocketAddr,
        data: u32,
    ) -> Result<PeerHandle, TransportError> {
        let local = self.hosts.get(&from).ok_or(TransportError::HostClosed)?;
        if local.links.len() >= local.peer_count {
            return Err(TransportError::NoAvailablePeers {
                peer_count: local.peer_count,
            });
        }

        let local_peer = self.allocate_peer();
        let remote_peer = self.allocate_peer();

        let accepted = match self.hosts.get_mut(to) {
            Some(remote) if remote.links.len() < remote.peer_count => {
                remote.links.insert(
                    remote_peer,
                    Link {
                        remote_address: from,
                        remote_peer: local_peer,
                    },
                );
                remote.events.push_back(TransportEvent::Connect {
                    peer: remote_peer,
                    data,
                });
                true
            }
            Some(_) => {
                debug!("{} refused connection from {}: no free peers", to, from);
                false
            }
            None => {
                debug!("nothing is listening at {}", to);
                false
            }
        };

        let local = self.hosts.get_mut(&from).ok_or(TransportError::HostClosed)?;
        if accepted {
            local.links.insert(
                local_peer,
                Link {
                    remote_address: *to,
                    remote_peer,
                },
            );
            local.events.push_back(TransportEvent::Connect {
                peer: local_peer,
                data: 0,
            });
        } else {
            // the attempt times out from the initiator's point of view
            local.events.push_back(TransportEvent::Disconnect {
                peer: local_peer,
                data: 0,
            });
        }

        Ok(local_peer)
    }

    fn send(
        &mut self,
        from: SocketAddr,
        peer: &PeerHandle,
        channel: ChannelId,
        payload: Box<[u8]>,
    ) -> Result<(), TransportError> {
        let local = self.hosts.get(&from).ok_or(TransportError::HostClosed)?;
        let link = *local
            .links
            .get(peer)
            .ok_or(TransportError::PeerNotConnected(*peer))?;
        if usize::from(channel) >= local.channel_count {
            return Err(TransportError::ChannelOutOfRange {
                channel,
                channel_count: local.channel_count,
            });
        }

        match self.hosts.get_mut(&link.remote_address) {
            Some(remote) if remote.links.contains_key(&link.remote_peer) => {
                if usize::from(channel) >= remote.channel_count {
                    warn!(
                        "dropping packet on channel {}: {} only has {} channels",
                        channel, link.remote_address, remote.channel_count
                    );
                    return Ok(());
                }
                remote.events.push_back(TransportEvent::Receive {
                    peer: link.remote_peer,
                    channel,
                    payload,
                });
            }
            _ => {
                debug!("dropping packet for vanished peer at {}", link.remote_address);
            }
        }

        Ok(())
    }

    fn disconnect(&mut self, from: SocketAddr, peer: &PeerHandle, mode: DisconnectMode, data: u32) {
        let Some(local) = self.hosts.get_mut(&from) else {
            return;
        };
        let Some(link) = local.links.remove(peer) else {
            return;
        };

        match mode {
            DisconnectMode::Immediate => {
                local.events.retain(|event| event_peer(event) != *peer);
            }
            DisconnectMode::Deferred => {
                local
                    .events
                    .push_back(TransportEvent::Disconnect { peer: *peer, data });
            }
        }

        self.notify_remote(&link, data);
    }

    fn close_host(&mut self, address: &SocketAddr) -> bool {
        let Some(host) = self.hosts.remove(address) else {
            return false;
        };
        for link in host.links.into_values() {
            self.notify_remote(&link, 0);
        }
        debug!("local host at {} closed", address);
        true
    }

    fn notify_remote(&mut self, link: &Link, data: u32) {
        if let Some(remote) = self.hosts.get_mut(&link.remote_address) {
            if remote.links.remove(&link.remote_peer).is_some() {
                remote.events.push_back(TransportEvent::Disconnect {
                    peer: link.remote_peer,
                    data,
                });
            }
        }
    }
}
