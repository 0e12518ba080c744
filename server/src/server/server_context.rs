use std::{
    collections::{HashMap, HashSet, VecDeque},
    net::SocketAddr,
    time::{Duration, Instant},
};

use log::{info, warn};

use netslot_shared::{
    AuthAccepted, BoundedName, ChannelId, DisconnectMode, DisconnectReason, PeerHandle,
    PeerSender, ProtocolViolation, ServerInfo, SlotIndex, QUERY_CHANNEL,
};

use crate::{slot::ClientSlot, NetServerError};

fn slot_count_u16(count: usize) -> u16 {
    u16::try_from(count).unwrap_or(u16::MAX)
}

fn occupied_slot<D>(
    slots: &mut [ClientSlot<D>],
    index: SlotIndex,
) -> Result<&mut ClientSlot<D>, NetServerError> {
    let slot_count = slots.len();
    let slot = slots
        .get_mut(index)
        .ok_or(NetServerError::SlotOutOfRange {
            slot: index,
            slot_count,
        })?;
    if !slot.is_occupied() {
        return Err(NetServerError::SlotNotOccupied { slot: index });
    }
    Ok(slot)
}

/// The server state that callbacks can see and act on: the slot table and
/// the sending half of the transport host.
pub struct ServerContext<D> {
    sender: Box<dyn PeerSender>,
    name: BoundedName,
    user_channel_count: usize,
    reply_timeout: Duration,
    slots: Vec<ClientSlot<D>>,
    peer_slots: HashMap<PeerHandle, SlotIndex>,
    query_peers: HashSet<PeerHandle>,
    // slots cut off from their peer, waiting for `client_disconnected`
    finalized: VecDeque<SlotIndex>,
}

impl<D: Default> ServerContext<D> {
    pub(crate) fn new(
        sender: Box<dyn PeerSender>,
        name: BoundedName,
        user_channel_count: usize,
        max_clients: usize,
        reply_timeout: Duration,
    ) -> Self {
        Self {
            sender,
            name,
            user_channel_count,
            reply_timeout,
            slots: (0..max_clients).map(ClientSlot::new).collect(),
            peer_slots: HashMap::new(),
            query_peers: HashSet::new(),
            finalized: VecDeque::new(),
        }
    }

    /// Puts a newly connected client in the lowest free slot
    pub(crate) fn admit(&mut self, peer: PeerHandle) -> Option<SlotIndex> {
        let deadline = Instant::now().checked_add(self.reply_timeout);
        let slot = self.slots.iter_mut().find(|slot| !slot.is_occupied())?;
        slot.occupy(peer, deadline);
        self.peer_slots.insert(peer, slot.index());
        Some(slot.index())
    }

    pub(crate) fn release(&mut self, index: SlotIndex) {
        let Some(slot) = self.slots.get_mut(index) else {
            return;
        };
        if let Some(peer) = slot.peer() {
            self.peer_slots.remove(&peer);
        }
        slot.reset();
    }
}

impl<D> ServerContext<D> {
    pub fn name(&self) -> &BoundedName {
        &self.name
    }

    pub fn local_address(&self) -> Option<SocketAddr> {
        self.sender.local_address()
    }

    pub fn user_channel_count(&self) -> usize {
        self.user_channel_count
    }

    pub fn reply_timeout(&self) -> Duration {
        self.reply_timeout
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Slots that are not `Unused`
    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_occupied()).count()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_active()).count()
    }

    pub fn slot(&self, index: SlotIndex) -> Option<&ClientSlot<D>> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> impl Iterator<Item = &ClientSlot<D>> {
        self.slots.iter()
    }

    pub fn slot_data_mut(&mut self, index: SlotIndex) -> Option<&mut D> {
        self.slots.get_mut(index).map(ClientSlot::user_data_mut)
    }

    /// The peer occupying a slot, or `None` if the slot is unused or out of range
    pub fn peer_at_slot(&self, index: SlotIndex) -> Option<PeerHandle> {
        self.slots.get(index).and_then(ClientSlot::peer)
    }

    pub fn slot_of_peer(&self, peer: &PeerHandle) -> Option<SlotIndex> {
        self.peer_slots.get(peer).copied()
    }

    pub fn peer_address(&self, index: SlotIndex) -> Option<SocketAddr> {
        let peer = self.peer_at_slot(index)?;
        self.sender.peer_address(&peer)
    }

    /// Stores a display name for the client in `index`
    pub fn set_client_name(&mut self, index: SlotIndex, name: &str) -> Result<(), NetServerError> {
        let name = BoundedName::new(name)?;
        occupied_slot(&mut self.slots, index)?.set_name(name);
        Ok(())
    }

    /// Asks the transport to disconnect the client after everything already
    /// queued for it was delivered. `client_disconnected` fires once the
    /// transport confirms. Later calls for the same slot are ignored.
    pub fn disconnect_client(
        &mut self,
        index: SlotIndex,
        reason: DisconnectReason,
    ) -> Result<(), NetServerError> {
        let slot = occupied_slot(&mut self.slots, index)?;
        if slot.pending_disconnect().is_some() {
            return Ok(());
        }
        if let Some(peer) = slot.peer() {
            self.sender
                .disconnect(&peer, DisconnectMode::Deferred, reason.to_code());
        }
        slot.mark_disconnecting(reason);
        info!("disconnecting slot {}: {}", index, reason);
        Ok(())
    }

    /// Drops the client at once. `client_disconnected` fires before the
    /// session returns control: right away when called on the session, or as
    /// soon as the running callback returns when called from one.
    pub fn disconnect_client_now(
        &mut self,
        index: SlotIndex,
        reason: DisconnectReason,
    ) -> Result<(), NetServerError> {
        let slot = occupied_slot(&mut self.slots, index)?;
        if slot.is_detached() {
            return Ok(());
        }
        if let Some(peer) = slot.peer() {
            self.sender
                .disconnect(&peer, DisconnectMode::Immediate, reason.to_code());
        }
        slot.detach(reason);
        self.finalized.push_back(index);
        info!("dropped slot {}: {}", index, reason);
        Ok(())
    }

    /// Sends `packet` on a user channel to an active client
    pub fn send_packet(
        &mut self,
        index: SlotIndex,
        channel: ChannelId,
        packet: &[u8],
    ) -> Result<(), NetServerError> {
        self.check_user_channel(channel)?;
        let slot_count = self.slots.len();
        let slot = self
            .slots
            .get(index)
            .ok_or(NetServerError::SlotOutOfRange {
                slot: index,
                slot_count,
            })?;
        match slot.peer() {
            Some(peer) if slot.is_active() => {
                self.sender.send(&peer, channel, packet.into())?;
                Ok(())
            }
            _ => Err(NetServerError::SlotNotActive { slot: index }),
        }
    }

    /// Sends `packet` on a user channel to every active client. Returns how
    /// many clients it was sent to.
    pub fn broadcast_packet(
        &mut self,
        channel: ChannelId,
        packet: &[u8],
    ) -> Result<usize, NetServerError> {
        self.check_user_channel(channel)?;
        let mut sent = 0;
        for slot in self.slots.iter().filter(|slot| slot.is_active()) {
            if let Some(peer) = slot.peer() {
                self.sender.send(&peer, channel, packet.into())?;
                sent += 1;
            }
        }
        Ok(sent)
    }

    fn check_user_channel(&self, channel: ChannelId) -> Result<(), NetServerError> {
        if usize::from(channel) >= self.user_channel_count {
            return Err(NetServerError::ChannelOutOfRange {
                channel,
                channel_count: self.user_channel_count,
            });
        }
        Ok(())
    }

    /// Turns away a peer that never got a slot
    pub(crate) fn reject(&mut self, peer: &PeerHandle, reason: DisconnectReason) {
        self.sender
            .disconnect(peer, DisconnectMode::Immediate, reason.to_code());
    }

    /// Makes the slot active and tells its client which slot it holds
    pub(crate) fn accept(&mut self, index: SlotIndex) {
        let Some(slot) = self.slots.get_mut(index) else {
            return;
        };
        let Some(peer) = slot.peer() else {
            return;
        };
        slot.activate();

        let accepted = AuthAccepted {
            slot: slot_count_u16(index),
            server_name: self.name.clone(),
        };
        if let Err(error) = accepted
            .to_message(peer, self.user_channel_count)
            .send(self.sender.as_mut())
        {
            warn!("could not notify slot {} of its activation: {}", index, error);
        }
        info!("slot {} is active", index);
    }

    /// Answers a status query and hangs up on it
    pub(crate) fn answer_query(&mut self, peer: PeerHandle) {
        let info = ServerInfo {
            occupied: slot_count_u16(self.occupied_count()),
            capacity: slot_count_u16(self.slots.len()),
            name: self.name.clone(),
        };
        if let Err(error) = info
            .to_message(peer, usize::from(QUERY_CHANNEL))
            .send(self.sender.as_mut())
        {
            warn!("could not answer status query from peer {}: {}", peer, error);
        }
        self.sender.disconnect(
            &peer,
            DisconnectMode::Deferred,
            DisconnectReason::Manual.to_code(),
        );
        self.query_peers.insert(peer);
    }

    pub(crate) fn is_query_peer(&self, peer: &PeerHandle) -> bool {
        self.query_peers.contains(peer)
    }

    pub(crate) fn forget_query_peer(&mut self, peer: &PeerHandle) -> bool {
        self.query_peers.remove(peer)
    }

    /// The transport reported the slot's peer gone
    pub(crate) fn peer_disconnected(&mut self, index: SlotIndex, reason: DisconnectReason) {
        let Some(slot) = self.slots.get_mut(index) else {
            return;
        };
        if slot.is_detached() {
            return;
        }
        // a disconnect the server issued keeps its own reason
        let reason = slot.pending_disconnect().unwrap_or(reason);
        slot.detach(reason);
        self.finalized.push_back(index);
    }

    pub(crate) fn protocol_violation(&mut self, index: SlotIndex, violation: ProtocolViolation) {
        warn!("slot {} broke protocol: {}", index, violation);
        if let Err(error) = self.disconnect_client_now(index, DisconnectReason::Unknown) {
            warn!("could not drop slot {}: {}", index, error);
        }
    }

    pub(crate) fn next_finalized(&mut self) -> Option<SlotIndex> {
        self.finalized.pop_front()
    }

    /// Issues a deferred `ReplyTimeout` disconnect for every slot that did
    /// not authenticate in time
    pub(crate) fn sweep_reply_timeouts(&mut self, now: Instant) {
        for slot in self.slots.iter_mut().filter(|slot| slot.reply_overdue(now)) {
            if let Some(peer) = slot.peer() {
                self.sender.disconnect(
                    &peer,
                    DisconnectMode::Deferred,
                    DisconnectReason::ReplyTimeout.to_code(),
                );
            }
            slot.mark_disconnecting(DisconnectReason::ReplyTimeout);
            info!(
                "slot {} did not authenticate within {:?}",
                slot.index(),
                self.reply_timeout
            );
        }
    }

    /// Drops every connected peer with `ServerShutdown`
    pub(crate) fn shutdown(&mut self) {
        let code = DisconnectReason::ServerShutdown.to_code();
        for slot in self.slots.iter().filter(|slot| !slot.is_detached()) {
            if let Some(peer) = slot.peer() {
                self.sender
                    .disconnect(&peer, DisconnectMode::Immediate, code);
            }
        }
        for peer in self.query_peers.drain() {
            self.sender
                .disconnect(&peer, DisconnectMode::Immediate, code);
        }
    }
}
