use crate::{
    connection::error::ProtocolViolation,
    messages::message_type::MessageType,
    transport::{PeerHandle, PeerSender, TransportError},
    types::ChannelId,
};

/// Size of the type tag in front of every internal message
pub const MESSAGE_HEADER_SIZE: usize = 1;

/// Position of the internal channel relative to the last user channel
pub const INTERNAL_CHANNEL_OFFSET: usize = 0;

/// Index of the internal channel for a session with `user_channel_count` user channels.
///
/// Channel counts are validated at session creation, so the index always fits.
pub fn internal_channel(user_channel_count: usize) -> ChannelId {
    ChannelId::try_from(user_channel_count + INTERNAL_CHANNEL_OFFSET).unwrap_or(ChannelId::MAX)
}

/// An internal message whose payload is being filled in.
///
/// The message only reaches the wire through [`InternalMessage::send`], which
/// consumes it, so the payload can never change after it was queued.
#[derive(Debug)]
pub struct InternalMessage {
    peer: PeerHandle,
    channel: ChannelId,
    message_type: MessageType,
    buffer: Box<[u8]>,
}

impl InternalMessage {
    pub fn peer(&self) -> PeerHandle {
        self.peer
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    pub fn payload(&self) -> &[u8] {
        &self.buffer[MESSAGE_HEADER_SIZE..]
    }

    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.buffer[MESSAGE_HEADER_SIZE..]
    }

    /// Whole packet, header included
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Queues the message on its peer's internal channel
    pub fn send(self, sender: &mut dyn PeerSender) -> Result<(), TransportError> {
        sender.send(&self.peer, self.channel, self.buffer)
    }
}

/// Allocates a message of `payload_size` zeroed bytes addressed to `peer`'s
/// internal channel. Fill it through [`InternalMessage::payload_mut`], then
/// [`send`](InternalMessage::send) it.
pub fn build_internal_message(
    peer: PeerHandle,
    message_type: MessageType,
    payload_size: usize,
    user_channel_count: usize,
) -> InternalMessage {
    let mut buffer = vec![0u8; MESSAGE_HEADER_SIZE + payload_size].into_boxed_slice();
    buffer[0] = message_type.to_byte();

    InternalMessage {
        peer,
        channel: internal_channel(user_channel_count),
        message_type,
        buffer,
    }
}

/// Splits an internal-channel packet into its type and payload
pub fn read_internal_message(packet: &[u8]) -> Result<(MessageType, &[u8]), ProtocolViolation> {
    let (&tag, payload) = packet
        .split_first()
        .ok_or(ProtocolViolation::EmptyMessage)?;
    Ok((MessageType::from_byte(tag)?, payload))
}
