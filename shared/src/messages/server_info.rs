use crate::{
    connection::error::ProtocolViolation,
    messages::{
        internal_message::{build_internal_message, InternalMessage},
        message_type::MessageType,
    },
    name::BoundedName,
    transport::PeerHandle,
};

fn read_u16(bytes: &[u8]) -> u16 {
    u16::from_le_bytes([bytes[0], bytes[1]])
}

fn read_name(
    bytes: &[u8],
    message_type: MessageType,
    length: usize,
) -> Result<BoundedName, ProtocolViolation> {
    let malformed = ProtocolViolation::MalformedPayload {
        message_type,
        length,
    };
    let text = std::str::from_utf8(bytes).map_err(|_| malformed.clone())?;
    BoundedName::new(text).map_err(|_| malformed)
}

/// Server status, answered to query connections
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerInfo {
    /// Slots not `Unused`
    pub occupied: u16,
    pub capacity: u16,
    pub name: BoundedName,
}

impl ServerInfo {
    const FIXED_SIZE: usize = 4;

    pub fn encoded_len(&self) -> usize {
        Self::FIXED_SIZE + self.name.len()
    }

    /// Builds the filled-in message for `peer`
    pub fn to_message(&self, peer: PeerHandle, user_channel_count: usize) -> InternalMessage {
        let mut message = build_internal_message(
            peer,
            MessageType::ServerInfo,
            self.encoded_len(),
            user_channel_count,
        );
        let (counts, name) = message.payload_mut().split_at_mut(Self::FIXED_SIZE);
        counts[..2].copy_from_slice(&self.occupied.to_le_bytes());
        counts[2..].copy_from_slice(&self.capacity.to_le_bytes());
        name.copy_from_slice(self.name.as_bytes());
        message
    }

    pub fn read(payload: &[u8]) -> Result<Self, ProtocolViolation> {
        if payload.len() < Self::FIXED_SIZE {
            return Err(ProtocolViolation::MalformedPayload {
                message_type: MessageType::ServerInfo,
                length: payload.len(),
            });
        }
        let (counts, name) = payload.split_at(Self::FIXED_SIZE);
        Ok(Self {
            occupied: read_u16(&counts[..2]),
            capacity: read_u16(&counts[2..]),
            name: read_name(name, MessageType::ServerInfo, payload.len())?,
        })
    }
}

/// Activation notice telling a client which slot it holds
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthAccepted {
    pub slot: u16,
    pub server_name: BoundedName,
}

impl AuthAccepted {
    const FIXED_SIZE: usize = 2;

    pub fn encoded_len(&self) -> usize {
        Self::FIXED_SIZE + self.server_name.len()
    }

    pub fn to_message(&self, peer: PeerHandle, user_channel_count: usize) -> InternalMessage {
        let mut message = build_internal_message(
            peer,
            MessageType::AuthAccepted,
            self.encoded_len(),
            user_channel_count,
        );
        let (slot, name) = message.payload_mut().split_at_mut(Self::FIXED_SIZE);
        slot.copy_from_slice(&self.slot.to_le_bytes());
        name.copy_from_slice(self.server_name.as_bytes());
        message
    }

    pub fn read(payload: &[u8]) -> Result<Self, ProtocolViolation> {
        if payload.len() < Self::FIXED_SIZE {
            return Err(ProtocolViolation::MalformedPayload {
                message_type: MessageType::AuthAccepted,
                length: payload.len(),
            });
        }
        let (slot, name) = payload.split_at(Self::FIXED_SIZE);
        Ok(Self {
            slot: read_u16(slot),
            server_name: read_name(name, MessageType::AuthAccepted, payload.len())?,
        })
    }
}
