use std::time::Instant;

use netslot_shared::{BoundedName, DisconnectReason, PeerHandle, SlotIndex};

use crate::slot::SlotState;

/// One entry of the server's slot table.
///
/// Slots are allocated with the session and reset in place, so a
/// [`SlotIndex`] stays valid for the session's whole lifetime.
#[derive(Debug)]
pub struct ClientSlot<D> {
    index: SlotIndex,
    state: SlotState,
    user_data: D,
    name: BoundedName,
    peer: Option<PeerHandle>,
    deadline: Option<Instant>,
    pending_disconnect: Option<DisconnectReason>,
    // the transport link is gone; only the disconnect callback remains
    detached: bool,
}

impl<D: Default> ClientSlot<D> {
    pub(crate) fn new(index: SlotIndex) -> Self {
        Self {
            index,
            state: SlotState::Unused,
            user_data: D::default(),
            name: BoundedName::default(),
            peer: None,
            deadline: None,
            pending_disconnect: None,
            detached: false,
        }
    }

    pub(crate) fn occupy(&mut self, peer: PeerHandle, deadline: Option<Instant>) {
        self.state = SlotState::Unauthenticated;
        self.peer = Some(peer);
        self.deadline = deadline;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new(self.index);
    }
}

impl<D> ClientSlot<D> {
    pub fn index(&self) -> SlotIndex {
        self.index
    }

    pub fn state(&self) -> SlotState {
        self.state
    }

    pub fn is_occupied(&self) -> bool {
        self.state != SlotState::Unused
    }

    /// Active and not on its way out
    pub fn is_active(&self) -> bool {
        self.state == SlotState::Active && self.pending_disconnect.is_none()
    }

    pub fn user_data(&self) -> &D {
        &self.user_data
    }

    pub fn user_data_mut(&mut self) -> &mut D {
        &mut self.user_data
    }

    pub fn name(&self) -> &BoundedName {
        &self.name
    }

    /// The occupying peer, `None` while `Unused`
    pub fn peer(&self) -> Option<PeerHandle> {
        self.peer
    }

    /// When the handshake must be complete by, if it still has to complete
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The reason of a disconnect the server already issued for this slot
    pub fn pending_disconnect(&self) -> Option<DisconnectReason> {
        self.pending_disconnect
    }

    pub(crate) fn is_detached(&self) -> bool {
        self.detached
    }

    pub(crate) fn set_name(&mut self, name: BoundedName) {
        self.name = name;
    }

    pub(crate) fn activate(&mut self) {
        self.state = SlotState::Active;
        self.deadline = None;
    }

    pub(crate) fn mark_disconnecting(&mut self, reason: DisconnectReason) {
        self.pending_disconnect = Some(reason);
        self.deadline = None;
    }

    /// Records the final reason and cuts the slot off from any further traffic
    pub(crate) fn detach(&mut self, reason: DisconnectReason) {
        self.mark_disconnecting(reason);
        self.detached = true;
    }

    pub(crate) fn reply_overdue(&self, now: Instant) -> bool {
        self.state == SlotState::Unauthenticated
            && self.pending_disconnect.is_none()
            && self.deadline.is_some_and(|deadline| now >= deadline)
    }
}
