use std::fmt;

use crate::{connection::error::ProtocolViolation, types::HostType};

/// Tag in the first byte of every internal-channel message.
///
/// Numbering is versioned by [`PROTOCOL_VERSION`](crate::PROTOCOL_VERSION).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    /// Client credentials, opaque to the protocol
    AuthRequest = 1,
    /// The server admitted the client: `[u16 LE slot][server name]`
    AuthAccepted = 2,
    /// Answer to a status query: `[u16 LE occupied][u16 LE capacity][server name]`
    ServerInfo = 3,
}

impl MessageType {
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    pub fn from_byte(value: u8) -> Result<Self, ProtocolViolation> {
        match value {
            1 => Ok(MessageType::AuthRequest),
            2 => Ok(MessageType::AuthAccepted),
            3 => Ok(MessageType::ServerInfo),
            value => Err(ProtocolViolation::UnknownMessageType { value }),
        }
    }

    /// The only side allowed to send this message
    pub fn sender(self) -> HostType {
        match self {
            MessageType::AuthRequest => HostType::Client,
            MessageType::AuthAccepted | MessageType::ServerInfo => HostType::Server,
        }
    }

    /// Rejects messages received on the same side that is supposed to send them
    pub fn check_received_by(self, receiver: HostType) -> Result<(), ProtocolViolation> {
        if self.sender() == receiver.invert() {
            Ok(())
        } else {
            Err(ProtocolViolation::UnexpectedMessage {
                message_type: self,
                context: "sent in the wrong direction",
            })
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::AuthRequest => "AuthRequest",
            MessageType::AuthAccepted => "AuthAccepted",
            MessageType::ServerInfo => "ServerInfo",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
