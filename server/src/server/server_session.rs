use std::{
    net::SocketAddr,
    time::{Duration, Instant},
};

use log::{debug, info, warn};

use netslot_shared::{
    dispatch_transport_event, internal_channel, read_internal_message, total_channel_count,
    BoundedName, ChannelId, ConnectionKind, ConnectionTag, DisconnectReason, EventHandler,
    EventReceiver, HostConfig, HostType, MessageType, PeerHandle, ProtocolViolation, SlotIndex,
    Socket, RESERVED_PEERS,
};

use crate::{
    slot::{ClientSlot, SlotState},
    NetServerError, ServerCallbacks, ServerConfig, ServerContext,
};

/// A server that hands out a fixed number of client slots, authenticates
/// clients over the internal channel and evicts the ones that take too long
pub struct ServerSession<C: ServerCallbacks> {
    receiver: Box<dyn EventReceiver>,
    context: ServerContext<C::SlotData>,
    callbacks: C,
}

impl<C: ServerCallbacks> ServerSession<C> {
    /// Validates `config` and binds a host on `socket` at `config.address`
    pub fn new<S: Into<Box<dyn Socket>>>(
        config: ServerConfig,
        socket: S,
        callbacks: C,
    ) -> Result<Self, NetServerError> {
        config.validate()?;
        let name = BoundedName::new(&config.name)?;

        let socket: Box<dyn Socket> = socket.into();
        let (sender, receiver) = socket.bind(&HostConfig {
            address: Some(config.address),
            // headroom so a full server can still answer and turn peers away
            peer_count: config.max_clients + RESERVED_PEERS,
            channel_count: total_channel_count(config.channel_count),
        })?;

        info!(
            "server '{}' listening on {} with {} slots",
            name,
            sender
                .local_address()
                .map_or_else(|| config.address.to_string(), |address| address.to_string()),
            config.max_clients
        );

        Ok(Self {
            receiver,
            context: ServerContext::new(
                sender,
                name,
                config.channel_count,
                config.max_clients,
                config.reply_timeout,
            ),
            callbacks,
        })
    }

    /// Handles at most one transport event, waiting up to `timeout` for it,
    /// then evicts clients whose reply deadline passed. Returns whether an
    /// event was handled.
    ///
    /// Misbehaving peers never cause an error here; only a failure of the
    /// transport host does.
    pub fn service(&mut self, timeout: Duration) -> Result<bool, NetServerError> {
        let mut dispatch = Dispatch {
            context: &mut self.context,
            callbacks: &mut self.callbacks,
        };
        let handled = dispatch_transport_event(self.receiver.as_mut(), timeout, &mut dispatch)?;
        dispatch.finalize_disconnects();

        self.context.sweep_reply_timeouts(Instant::now());
        Ok(handled)
    }

    pub fn context(&self) -> &ServerContext<C::SlotData> {
        &self.context
    }

    pub fn callbacks(&self) -> &C {
        &self.callbacks
    }

    pub fn callbacks_mut(&mut self) -> &mut C {
        &mut self.callbacks
    }

    pub fn name(&self) -> &BoundedName {
        self.context.name()
    }

    pub fn local_address(&self) -> Option<SocketAddr> {
        self.context.local_address()
    }

    pub fn slot_count(&self) -> usize {
        self.context.slot_count()
    }

    pub fn active_count(&self) -> usize {
        self.context.active_count()
    }

    pub fn slot(&self, index: SlotIndex) -> Option<&ClientSlot<C::SlotData>> {
        self.context.slot(index)
    }

    pub fn slot_data_mut(&mut self, index: SlotIndex) -> Option<&mut C::SlotData> {
        self.context.slot_data_mut(index)
    }

    pub fn peer_at_slot(&self, index: SlotIndex) -> Option<PeerHandle> {
        self.context.peer_at_slot(index)
    }

    pub fn set_client_name(&mut self, index: SlotIndex, name: &str) -> Result<(), NetServerError> {
        self.context.set_client_name(index, name)
    }

    /// See [`ServerContext::disconnect_client`]
    pub fn disconnect_client(
        &mut self,
        index: SlotIndex,
        reason: DisconnectReason,
    ) -> Result<(), NetServerError> {
        self.context.disconnect_client(index, reason)
    }

    /// Drops the client at once; `client_disconnected` has fired by the time
    /// this returns
    pub fn disconnect_client_now(
        &mut self,
        index: SlotIndex,
        reason: DisconnectReason,
    ) -> Result<(), NetServerError> {
        self.context.disconnect_client_now(index, reason)?;
        Dispatch {
            context: &mut self.context,
            callbacks: &mut self.callbacks,
        }
        .finalize_disconnects();
        Ok(())
    }

    pub fn send_packet(
        &mut self,
        index: SlotIndex,
        channel: ChannelId,
        packet: &[u8],
    ) -> Result<(), NetServerError> {
        self.context.send_packet(index, channel, packet)
    }

    pub fn broadcast_packet(
        &mut self,
        channel: ChannelId,
        packet: &[u8],
    ) -> Result<usize, NetServerError> {
        self.context.broadcast_packet(channel, packet)
    }
}

impl<C: ServerCallbacks> Drop for ServerSession<C> {
    fn drop(&mut self) {
        self.context.shutdown();
        info!("server '{}' shut down", self.context.name());
    }
}

/// Routes transport events into the slot state machine while keeping the
/// context and the callbacks separately borrowable
struct Dispatch<'s, C: ServerCallbacks> {
    context: &'s mut ServerContext<C::SlotData>,
    callbacks: &'s mut C,
}

impl<C: ServerCallbacks> Dispatch<'_, C> {
    /// Fires `client_disconnected` for every slot cut off from its peer, then
    /// frees the slot
    fn finalize_disconnects(&mut self) {
        while let Some(index) = self.context.next_finalized() {
            let reason = self
                .context
                .slot(index)
                .and_then(ClientSlot::pending_disconnect)
                .unwrap_or(DisconnectReason::Unknown);
            self.callbacks
                .client_disconnected(self.context, index, reason);
            self.context.release(index);
        }
    }

    fn receive_internal(&mut self, index: SlotIndex, state: SlotState, packet: &[u8]) {
        let message = read_internal_message(packet).and_then(|(message_type, payload)| {
            message_type.check_received_by(HostType::Server)?;
            Ok((message_type, payload))
        });

        match message {
            Ok((MessageType::AuthRequest, auth)) if state == SlotState::Unauthenticated => {
                self.authenticate(index, auth);
            }
            Ok((message_type, _)) => {
                self.context.protocol_violation(
                    index,
                    ProtocolViolation::UnexpectedMessage {
                        message_type,
                        context: "client is already authenticated",
                    },
                );
            }
            Err(violation) => self.context.protocol_violation(index, violation),
        }
    }

    fn authenticate(&mut self, index: SlotIndex, auth: &[u8]) {
        self.callbacks.client_connecting(self.context, index, auth);

        let still_waiting = self.context.slot(index).is_some_and(|slot| {
            slot.state() == SlotState::Unauthenticated && slot.pending_disconnect().is_none()
        });
        if !still_waiting {
            info!("slot {} was rejected during authentication", index);
            return;
        }

        self.context.accept(index);
        self.callbacks.client_connected(self.context, index);
    }
}

impl<C: ServerCallbacks> EventHandler for Dispatch<'_, C> {
    fn on_connect(&mut self, peer: PeerHandle, tag: ConnectionTag) {
        match tag.kind() {
            Ok(ConnectionKind::Client) => match self.context.admit(peer) {
                Some(index) => info!("peer {} connected into slot {}", peer, index),
                None => {
                    warn!("peer {} turned away: every slot is taken", peer);
                    self.context.reject(&peer, DisconnectReason::ServerFull);
                }
            },
            Ok(ConnectionKind::Query) => {
                debug!("status query from peer {}", peer);
                self.context.answer_query(peer);
            }
            Err(violation) => {
                warn!("peer {} connected with tag {}: {}", peer, tag, violation);
                self.context.reject(&peer, DisconnectReason::Unknown);
            }
        }
    }

    fn on_disconnect(&mut self, peer: PeerHandle, reason: DisconnectReason) {
        if self.context.forget_query_peer(&peer) {
            return;
        }
        match self.context.slot_of_peer(&peer) {
            Some(index) => {
                info!("slot {} disconnected: {}", index, reason);
                self.context.peer_disconnected(index, reason);
            }
            None => debug!("disconnect from unknown peer {}", peer),
        }
    }

    fn on_receive(&mut self, peer: PeerHandle, channel: ChannelId, packet: &[u8]) {
        if self.context.is_query_peer(&peer) {
            debug!("ignoring packet from status query peer {}", peer);
            return;
        }
        let Some(index) = self.context.slot_of_peer(&peer) else {
            debug!("dropping packet from unknown peer {}", peer);
            return;
        };
        let Some(slot) = self.context.slot(index) else {
            return;
        };
        if slot.pending_disconnect().is_some() {
            debug!("dropping packet from disconnecting slot {}", index);
            return;
        }
        let state = slot.state();

        let user_channel_count = self.context.user_channel_count();
        if usize::from(channel) < user_channel_count {
            if state == SlotState::Active {
                self.callbacks
                    .client_sent_packet(self.context, index, channel, packet);
            } else {
                self.context.protocol_violation(
                    index,
                    ProtocolViolation::PacketBeforeAuthentication { channel },
                );
            }
        } else if channel == internal_channel(user_channel_count) {
            self.receive_internal(index, state, packet);
        } else {
            self.context.protocol_violation(
                index,
                ProtocolViolation::ChannelOutOfRange {
                    channel,
                    channel_count: total_channel_count(user_channel_count),
                },
            );
        }
    }
}
