use std::{net::SocketAddr, time::Duration};

use log::{debug, info, warn};

use netslot_shared::{
    dispatch_transport_event, internal_channel, read_internal_message, total_channel_count,
    AuthAccepted, BoundedName, ChannelId, ConnectionKind, ConnectionTag, DisconnectReason,
    EventHandler, EventReceiver, HostConfig, HostType, MessageType, PeerHandle, SlotIndex,
    Socket,
};

use crate::{ClientCallbacks, ClientConfig, ClientContext, ClientState, NetClientError};

/// One connection to a server: runs the authentication handshake and routes
/// user traffic to the callbacks
pub struct ClientSession<C: ClientCallbacks> {
    receiver: Box<dyn EventReceiver>,
    context: ClientContext,
    callbacks: C,
}

impl<C: ClientCallbacks> ClientSession<C> {
    /// Validates `config`, binds an unaddressed host on `socket` and starts
    /// connecting to the server
    pub fn new<S: Into<Box<dyn Socket>>>(
        config: ClientConfig,
        socket: S,
        callbacks: C,
    ) -> Result<Self, NetClientError> {
        config.validate()?;

        let socket: Box<dyn Socket> = socket.into();
        let (mut sender, receiver) = socket.bind(&HostConfig {
            address: None,
            peer_count: 1,
            channel_count: total_channel_count(config.channel_count),
        })?;
        let server_peer = sender.connect(
            &config.server_address,
            ConnectionTag::new(ConnectionKind::Client).raw(),
        )?;
        info!("connecting to {}", config.server_address);

        Ok(Self {
            receiver,
            context: ClientContext::new(
                sender,
                server_peer,
                config.channel_count,
                config.auth_data.map(Vec::into_boxed_slice),
            ),
            callbacks,
        })
    }

    /// Handles at most one transport event, waiting up to `timeout` for it.
    /// Returns whether an event was handled.
    pub fn service(&mut self, timeout: Duration) -> Result<bool, NetClientError> {
        let mut dispatch = Dispatch {
            context: &mut self.context,
            callbacks: &mut self.callbacks,
        };
        let handled = dispatch_transport_event(self.receiver.as_mut(), timeout, &mut dispatch)?;
        Ok(handled)
    }

    pub fn context(&self) -> &ClientContext {
        &self.context
    }

    pub fn callbacks(&self) -> &C {
        &self.callbacks
    }

    pub fn callbacks_mut(&mut self) -> &mut C {
        &mut self.callbacks
    }

    pub fn state(&self) -> ClientState {
        self.context.state()
    }

    pub fn slot_index(&self) -> Option<SlotIndex> {
        self.context.slot_index()
    }

    pub fn server_name(&self) -> Option<&BoundedName> {
        self.context.server_name()
    }

    pub fn server_peer(&self) -> PeerHandle {
        self.context.server_peer()
    }

    pub fn local_address(&self) -> Option<SocketAddr> {
        self.context.local_address()
    }

    pub fn send_packet(&mut self, channel: ChannelId, packet: &[u8]) -> Result<(), NetClientError> {
        self.context.send_packet(channel, packet)
    }

    /// See [`ClientContext::disconnect`]
    pub fn disconnect(&mut self) {
        self.context.disconnect();
    }
}

impl<C: ClientCallbacks> Drop for ClientSession<C> {
    fn drop(&mut self) {
        self.context.shutdown();
    }
}

struct Dispatch<'s, C: ClientCallbacks> {
    context: &'s mut ClientContext,
    callbacks: &'s mut C,
}

impl<C: ClientCallbacks> Dispatch<'_, C> {
    fn is_server(&self, peer: &PeerHandle) -> bool {
        *peer == self.context.server_peer()
    }

    fn release_held_packets(&mut self) {
        for (channel, packet) in self.context.take_held_packets() {
            if self.context.state() == ClientState::Disconnected {
                break;
            }
            self.callbacks
                .received_packet(self.context, channel, &packet);
        }
    }

    fn receive_internal(&mut self, packet: &[u8]) {
        let message = read_internal_message(packet).and_then(|(message_type, payload)| {
            message_type.check_received_by(HostType::Client)?;
            Ok((message_type, payload))
        });

        match message {
            Ok((MessageType::AuthAccepted, payload)) => match AuthAccepted::read(payload) {
                Ok(accepted) => {
                    if let Some(slot) = self.context.accept(accepted) {
                        self.callbacks.connected(self.context, slot);
                        self.release_held_packets();
                    }
                }
                Err(violation) => warn!("ignoring server message: {}", violation),
            },
            Ok((message_type, _)) => {
                warn!("ignoring unexpected {} message from server", message_type);
            }
            Err(violation) => warn!("ignoring server message: {}", violation),
        }
    }
}

impl<C: ClientCallbacks> EventHandler for Dispatch<'_, C> {
    fn on_connect(&mut self, peer: PeerHandle, _tag: ConnectionTag) {
        if !self.is_server(&peer) {
            warn!("unexpected connection from peer {}", peer);
            self.context.reject_stranger(&peer);
            return;
        }
        info!("connected to server, authenticating");
        self.context.send_auth_request();
    }

    fn on_disconnect(&mut self, peer: PeerHandle, reason: DisconnectReason) {
        if !self.is_server(&peer) {
            debug!("disconnect from unknown peer {}", peer);
            return;
        }
        if self.context.end() {
            info!("disconnected from server: {}", reason);
            self.callbacks.disconnected(reason);
        }
    }

    fn on_receive(&mut self, peer: PeerHandle, channel: ChannelId, packet: &[u8]) {
        if !self.is_server(&peer) {
            warn!("dropping packet from unknown peer {}", peer);
            return;
        }
        if self.context.state() == ClientState::Disconnected {
            debug!("dropping packet received after disconnecting");
            return;
        }

        let user_channel_count = self.context.user_channel_count();
        if usize::from(channel) < user_channel_count {
            match self.context.state() {
                // channels are only ordered among themselves, so user traffic
                // can overtake the activation
                ClientState::Connecting | ClientState::Authenticating => {
                    debug!("holding packet on channel {} until activation", channel);
                    self.context.hold_packet(channel, packet);
                }
                _ if self.context.slot_index().is_some() => {
                    self.callbacks
                        .received_packet(self.context, channel, packet);
                }
                _ => debug!("dropping packet on channel {} from unaccepted session", channel),
            }
        } else if channel == internal_channel(user_channel_count) {
            self.receive_internal(packet);
        } else {
            warn!("dropping packet on unknown channel {}", channel);
        }
    }
}
