use std::net::SocketAddr;

use thiserror::Error;

use crate::transport::PeerHandle;

/// Errors reported by a transport host
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Another host is already bound to the address
    #[error("Address {0} is already bound by another host")]
    AddressInUse(SocketAddr),

    /// The host has no free peer to start another connection with
    #[error("Host has no free peers: all {peer_count} are in use")]
    NoAvailablePeers { peer_count: usize },

    /// The peer is unknown to the host or its connection already ended
    #[error("Peer {0} is not connected")]
    PeerNotConnected(PeerHandle),

    /// The channel index is not below the host's channel count
    #[error("Channel {channel} is out of range: the host was created with {channel_count} channels")]
    ChannelOutOfRange { channel: u8, channel_count: usize },

    /// The host was shut down underneath its owner
    #[error("Transport host has been closed")]
    HostClosed,

    /// An underlying I/O failure, flattened to text so the error stays comparable
    #[error("Transport I/O failure: {0}")]
    Io(String),
}
