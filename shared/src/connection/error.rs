use thiserror::Error;

use crate::messages::message_type::MessageType;

/// Ways a peer can break the session protocol.
///
/// None of these are fatal to a session: the offending connection is dropped
/// with [`DisconnectReason::Unknown`](crate::DisconnectReason::Unknown) and
/// every other peer keeps being served.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    /// The connection tag names a purpose this build does not know
    #[error("Unknown connection kind {kind} in connection tag. This may indicate a malformed or malicious peer")]
    UnknownConnectionKind { kind: u16 },

    /// The connection tag was produced by an incompatible protocol revision
    #[error("Peer speaks protocol version {version}, but only version {expected} is supported")]
    UnsupportedProtocolVersion { version: u16, expected: u16 },

    /// An internal-channel packet had no room for a message type
    #[error("Received an empty message on the internal channel")]
    EmptyMessage,

    /// The message type byte is outside the enumeration
    #[error("Unknown message type {value} received on the internal channel")]
    UnknownMessageType { value: u8 },

    /// A known message arrived where the state machine does not allow it
    #[error("Unexpected {message_type} message: {context}")]
    UnexpectedMessage {
        message_type: MessageType,
        context: &'static str,
    },

    /// User traffic arrived before the handshake completed
    #[error("Packet on user channel {channel} before authentication completed")]
    PacketBeforeAuthentication { channel: u8 },

    /// A message payload could not be decoded
    #[error("Malformed {message_type} payload of {length} bytes")]
    MalformedPayload {
        message_type: MessageType,
        length: usize,
    },

    /// A packet arrived on a channel the session never configured
    #[error("Packet on channel {channel}, but only {channel_count} channels are in use")]
    ChannelOutOfRange { channel: u8, channel_count: usize },
}
