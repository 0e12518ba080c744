use thiserror::Error;

use netslot_shared::{ChannelId, ConfigError, SlotIndex, TransportError};

/// Errors returned by a [`ServerSession`](crate::ServerSession)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetServerError {
    /// The configuration was rejected at creation
    #[error("Invalid server configuration: {0}")]
    Config(#[from] ConfigError),

    /// The transport host failed. Sessions cannot recover from this.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The slot index is not below the slot count
    #[error("Slot {slot} is out of range: the server has {slot_count} slots")]
    SlotOutOfRange { slot: SlotIndex, slot_count: usize },

    /// The slot has no peer in it
    #[error("Slot {slot} is not occupied")]
    SlotNotOccupied { slot: SlotIndex },

    /// The slot has not completed the handshake, or is being disconnected
    #[error("Slot {slot} is not active")]
    SlotNotActive { slot: SlotIndex },

    /// The channel is not one of the user channels
    #[error("Channel {channel} is not a user channel: the server has {channel_count} user channels")]
    ChannelOutOfRange {
        channel: ChannelId,
        channel_count: usize,
    },
}
