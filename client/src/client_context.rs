use std::{collections::VecDeque, mem, net::SocketAddr};

use log::{info, warn};

use netslot_shared::{
    build_internal_message, AuthAccepted, BoundedName, ChannelId, DisconnectMode,
    DisconnectReason, MessageType, PeerHandle, PeerSender, SlotIndex,
};

use crate::{ClientState, NetClientError};

/// The client state that callbacks can see and act on
pub struct ClientContext {
    sender: Box<dyn PeerSender>,
    server_peer: PeerHandle,
    state: ClientState,
    user_channel_count: usize,
    slot_index: Option<SlotIndex>,
    server_name: Option<BoundedName>,
    auth_data: Option<Box<[u8]>>,
    /// User packets that overtook the activation message
    held_packets: VecDeque<(ChannelId, Box<[u8]>)>,
}

impl ClientContext {
    pub(crate) fn new(
        sender: Box<dyn PeerSender>,
        server_peer: PeerHandle,
        user_channel_count: usize,
        auth_data: Option<Box<[u8]>>,
    ) -> Self {
        Self {
            sender,
            server_peer,
            state: ClientState::Connecting,
            user_channel_count,
            slot_index: None,
            server_name: None,
            auth_data,
            held_packets: VecDeque::new(),
        }
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ClientState::Connected
    }

    /// Slot assigned by the server, once accepted
    pub fn slot_index(&self) -> Option<SlotIndex> {
        self.slot_index
    }

    /// Display name of the server, once accepted
    pub fn server_name(&self) -> Option<&BoundedName> {
        self.server_name.as_ref()
    }

    pub fn server_peer(&self) -> PeerHandle {
        self.server_peer
    }

    pub fn user_channel_count(&self) -> usize {
        self.user_channel_count
    }

    pub fn local_address(&self) -> Option<SocketAddr> {
        self.sender.local_address()
    }

    pub fn server_address(&self) -> Option<SocketAddr> {
        self.sender.peer_address(&self.server_peer)
    }

    /// Sends `packet` to the server on a user channel
    pub fn send_packet(&mut self, channel: ChannelId, packet: &[u8]) -> Result<(), NetClientError> {
        if usize::from(channel) >= self.user_channel_count {
            return Err(NetClientError::ChannelOutOfRange {
                channel,
                channel_count: self.user_channel_count,
            });
        }
        if self.state != ClientState::Connected {
            return Err(NetClientError::NotConnected);
        }
        self.sender.send(&self.server_peer, channel, packet.into())?;
        Ok(())
    }

    /// Leaves the server once everything already sent was delivered. The
    /// `disconnected` callback fires when the transport confirms.
    pub fn disconnect(&mut self) {
        match self.state {
            ClientState::Disconnecting | ClientState::Disconnected => {}
            _ => {
                self.sender.disconnect(
                    &self.server_peer,
                    DisconnectMode::Deferred,
                    DisconnectReason::Manual.to_code(),
                );
                self.state = ClientState::Disconnecting;
            }
        }
    }

    /// Presents the credentials, once
    pub(crate) fn send_auth_request(&mut self) {
        if self.state != ClientState::Connecting {
            return;
        }
        let auth = self.auth_data.take().unwrap_or_default();

        let mut message = build_internal_message(
            self.server_peer,
            MessageType::AuthRequest,
            auth.len(),
            self.user_channel_count,
        );
        message.payload_mut().copy_from_slice(&auth);
        if let Err(error) = message.send(self.sender.as_mut()) {
            warn!("could not send authentication request: {}", error);
        }
        self.state = ClientState::Authenticating;
    }

    /// Records the activation. Returns the slot if this was the first one.
    pub(crate) fn accept(&mut self, accepted: AuthAccepted) -> Option<SlotIndex> {
        match self.state {
            ClientState::Connecting | ClientState::Authenticating => {
                let slot = SlotIndex::from(accepted.slot);
                info!(
                    "accepted into slot {} of server '{}'",
                    slot, accepted.server_name
                );
                self.state = ClientState::Connected;
                self.slot_index = Some(slot);
                self.server_name = Some(accepted.server_name);
                Some(slot)
            }
            state => {
                warn!("ignoring activation while {:?}", state);
                None
            }
        }
    }

    /// Returns `false` if the session had already ended
    pub(crate) fn end(&mut self) -> bool {
        if self.state == ClientState::Disconnected {
            return false;
        }
        self.state = ClientState::Disconnected;
        self.auth_data = None;
        self.held_packets.clear();
        true
    }

    /// Keeps a user packet until the server's activation arrives
    pub(crate) fn hold_packet(&mut self, channel: ChannelId, packet: &[u8]) {
        self.held_packets.push_back((channel, packet.into()));
    }

    pub(crate) fn take_held_packets(&mut self) -> VecDeque<(ChannelId, Box<[u8]>)> {
        mem::take(&mut self.held_packets)
    }

    pub(crate) fn reject_stranger(&mut self, peer: &PeerHandle) {
        self.sender.disconnect(
            peer,
            DisconnectMode::Immediate,
            DisconnectReason::Unknown.to_code(),
        );
    }

    pub(crate) fn shutdown(&mut self) {
        if self.state != ClientState::Disconnected {
            self.sender.disconnect(
                &self.server_peer,
                DisconnectMode::Immediate,
                DisconnectReason::Manual.to_code(),
            );
            self.end();
        }
    }
}
