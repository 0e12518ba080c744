use netslot_shared::{ChannelId, DisconnectReason, SlotIndex};

use crate::ServerContext;

/// Application hooks invoked by [`ServerSession::service`](crate::ServerSession::service).
///
/// Every hook receives the [`ServerContext`], so it can inspect slots, send
/// packets or disconnect clients while it runs.
pub trait ServerCallbacks {
    /// Per-slot application state, reset to `Default` whenever a slot is freed
    type SlotData: Default;

    /// A client in `slot` presented `auth` bytes. Call
    /// [`ServerContext::disconnect_client`] to reject it; otherwise the slot
    /// becomes active once this returns.
    fn client_connecting(
        &mut self,
        ctx: &mut ServerContext<Self::SlotData>,
        slot: SlotIndex,
        auth: &[u8],
    );

    /// The client in `slot` completed the handshake
    fn client_connected(&mut self, _ctx: &mut ServerContext<Self::SlotData>, _slot: SlotIndex) {}

    /// The client in `slot` is gone. The slot still holds its data and name
    /// until this returns.
    fn client_disconnected(
        &mut self,
        _ctx: &mut ServerContext<Self::SlotData>,
        _slot: SlotIndex,
        _reason: DisconnectReason,
    ) {
    }

    /// An active client sent `packet` on a user channel
    fn client_sent_packet(
        &mut self,
        _ctx: &mut ServerContext<Self::SlotData>,
        _slot: SlotIndex,
        _channel: ChannelId,
        _packet: &[u8],
    ) {
    }
}
