use std::time::Duration;

use log::debug;

use crate::{
    connection::connection_tag::ConnectionTag,
    disconnect_reason::DisconnectReason,
    transport::{EventReceiver, PeerHandle, TransportError, TransportEvent},
    types::ChannelId,
};

/// Receives the events demultiplexed by [`dispatch_transport_event`]
pub trait EventHandler {
    fn on_connect(&mut self, peer: PeerHandle, tag: ConnectionTag);

    fn on_disconnect(&mut self, peer: PeerHandle, reason: DisconnectReason);

    /// `packet` is released as soon as this returns; copy what must outlive the call
    fn on_receive(&mut self, peer: PeerHandle, channel: ChannelId, packet: &[u8]);
}

/// Polls `receiver` exactly once and routes the event, if any, to `handler`.
///
/// Returns `Ok(true)` if an event was handled, `Ok(false)` if the poll timed
/// out, and the transport's error if the host itself failed.
pub fn dispatch_transport_event<H: EventHandler + ?Sized>(
    receiver: &mut dyn EventReceiver,
    timeout: Duration,
    handler: &mut H,
) -> Result<bool, TransportError> {
    let Some(event) = receiver.poll(timeout)? else {
        return Ok(false);
    };

    match event {
        TransportEvent::Connect { peer, data } => {
            handler.on_connect(peer, ConnectionTag::from_raw(data));
        }
        TransportEvent::Disconnect { peer, data } => {
            let reason = DisconnectReason::from_code(data).unwrap_or_else(|| {
                debug!("peer {} disconnected with unrecognized code {}", peer, data);
                DisconnectReason::Unknown
            });
            handler.on_disconnect(peer, reason);
        }
        TransportEvent::Receive {
            peer,
            channel,
            payload,
        } => {
            handler.on_receive(peer, channel, &payload);
        }
    }

    Ok(true)
}
