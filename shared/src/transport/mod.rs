//! The contract a reliable, channel-based peer-to-peer transport must fulfil
//! for sessions to run on top of it.
//!
//! A [`Socket`] is bound once into a host, which is split in two halves: a
//! [`PeerSender`] that opens, feeds and closes connections, and an
//! [`EventReceiver`] that yields at most one [`TransportEvent`] per poll.

pub(crate) mod error;

cfg_if! {
    if #[cfg(feature = "transport_local")] {
        pub mod local;
    } else {}
}

use std::{fmt, net::SocketAddr, time::Duration};

pub use error::TransportError;

use crate::types::ChannelId;

/// Stable identity of one connection, issued by the transport.
///
/// Handles are plain values: holding one never keeps a connection alive, and
/// using one after its connection ended yields
/// [`TransportError::PeerNotConnected`] rather than touching another peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerHandle(u64);

impl PeerHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PeerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a connection should be torn down
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisconnectMode {
    /// Drop the peer at once. The remote side is told, but no disconnect
    /// event is generated locally, and pending local events for the peer are
    /// discarded.
    Immediate,
    /// Deliver everything already queued, then disconnect. Both sides
    /// eventually observe a disconnect event carrying the data.
    Deferred,
}

/// Parameters for binding a host
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostConfig {
    /// Address to listen on, or `None` for an outgoing-only host
    pub address: Option<SocketAddr>,
    /// Maximum simultaneous connections
    pub peer_count: usize,
    /// Channels available on every connection of this host
    pub channel_count: usize,
}

/// One thing that happened on a host
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    /// A connection was established. `data` is the value the initiator passed
    /// to [`PeerSender::connect`] (zero on the initiating side).
    Connect { peer: PeerHandle, data: u32 },
    /// A connection ended. `data` is the value given to
    /// [`PeerSender::disconnect`], or zero if the connection timed out.
    Disconnect { peer: PeerHandle, data: u32 },
    /// A reliable packet arrived
    Receive {
        peer: PeerHandle,
        channel: ChannelId,
        payload: Box<[u8]>,
    },
}

pub trait Socket {
    /// Binds a host, returning its sending and receiving halves
    fn bind(
        self: Box<Self>,
        config: &HostConfig,
    ) -> Result<(Box<dyn PeerSender>, Box<dyn EventReceiver>), TransportError>;
}

pub trait PeerSender: Send {
    /// Starts connecting to `address`, tagging the attempt with `data`
    fn connect(&mut self, address: &SocketAddr, data: u32) -> Result<PeerHandle, TransportError>;

    /// Queues a reliable, ordered packet on `channel`
    fn send(
        &mut self,
        peer: &PeerHandle,
        channel: ChannelId,
        payload: Box<[u8]>,
    ) -> Result<(), TransportError>;

    /// Tears down a connection. Unknown peers are ignored.
    fn disconnect(&mut self, peer: &PeerHandle, mode: DisconnectMode, data: u32);

    /// Address of the remote end of a connection
    fn peer_address(&self, peer: &PeerHandle) -> Option<SocketAddr>;

    /// Address this host is reachable at
    fn local_address(&self) -> Option<SocketAddr>;
}

pub trait EventReceiver: Send {
    /// Waits up to `timeout` for the next event. `Ok(None)` means nothing
    /// happened; `Err` means the host itself failed.
    fn poll(&mut self, timeout: Duration) -> Result<Option<TransportEvent>, TransportError>;
}
