use thiserror::Error;

use netslot_shared::{ChannelId, ConfigError, TransportError};

/// Errors returned by a [`ClientSession`](crate::ClientSession) or a
/// [`ServerQuery`](crate::ServerQuery)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetClientError {
    /// The configuration was rejected at creation
    #[error("Invalid client configuration: {0}")]
    Config(#[from] ConfigError),

    /// The transport host failed. Sessions cannot recover from this.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// User packets can only be sent once the server accepted the client
    #[error("Client is not connected: the server has not accepted it, or the connection ended")]
    NotConnected,

    /// The channel is not one of the user channels
    #[error("Channel {channel} is not a user channel: the client has {channel_count} user channels")]
    ChannelOutOfRange {
        channel: ChannelId,
        channel_count: usize,
    },
}
