use netslot_shared::{ChannelId, DisconnectReason, SlotIndex};

use crate::ClientContext;

/// Application hooks invoked by [`ClientSession::service`](crate::ClientSession::service)
pub trait ClientCallbacks {
    /// The server accepted the client into `slot`
    fn connected(&mut self, _ctx: &mut ClientContext, _slot: SlotIndex) {}

    /// The connection ended. Fires exactly once per session.
    fn disconnected(&mut self, reason: DisconnectReason);

    /// The server sent `packet` on a user channel. Never fires before
    /// [`connected`](Self::connected): packets that arrive ahead of the
    /// activation are held and delivered right after it.
    fn received_packet(&mut self, ctx: &mut ClientContext, channel: ChannelId, packet: &[u8]);
}
