use std::{net::SocketAddr, time::Duration};

use log::{debug, warn};

use netslot_shared::{
    dispatch_transport_event, read_internal_message, ChannelId, ConnectionKind, ConnectionTag,
    DisconnectMode, DisconnectReason, EventHandler, EventReceiver, HostConfig, MessageType,
    PeerHandle, PeerSender, ServerInfo, Socket, QUERY_CHANNEL,
};

use crate::NetClientError;

/// Outcome of a [`ServerQuery`] so far
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryStatus {
    Pending,
    Answered(ServerInfo),
    /// The connection ended without an answer
    Failed(DisconnectReason),
}

/// Asks a server for its name and occupancy without taking a slot
pub struct ServerQuery {
    sender: Box<dyn PeerSender>,
    receiver: Box<dyn EventReceiver>,
    server_peer: PeerHandle,
    status: QueryStatus,
}

impl ServerQuery {
    pub fn new<S: Into<Box<dyn Socket>>>(
        server_address: SocketAddr,
        socket: S,
    ) -> Result<Self, NetClientError> {
        let socket: Box<dyn Socket> = socket.into();
        let (mut sender, receiver) = socket.bind(&HostConfig {
            address: None,
            peer_count: 1,
            channel_count: usize::from(QUERY_CHANNEL) + 1,
        })?;
        let server_peer = sender.connect(
            &server_address,
            ConnectionTag::new(ConnectionKind::Query).raw(),
        )?;

        Ok(Self {
            sender,
            receiver,
            server_peer,
            status: QueryStatus::Pending,
        })
    }

    /// Handles at most one transport event and reports where the query stands.
    /// Once answered or failed, the status no longer changes.
    pub fn poll(&mut self, timeout: Duration) -> Result<QueryStatus, NetClientError> {
        if self.status == QueryStatus::Pending {
            let mut handler = QueryHandler {
                server_peer: self.server_peer,
                status: &mut self.status,
            };
            dispatch_transport_event(self.receiver.as_mut(), timeout, &mut handler)?;
        }
        Ok(self.status.clone())
    }

    pub fn status(&self) -> &QueryStatus {
        &self.status
    }
}

impl Drop for ServerQuery {
    fn drop(&mut self) {
        if self.status == QueryStatus::Pending {
            self.sender.disconnect(
                &self.server_peer,
                DisconnectMode::Immediate,
                DisconnectReason::Manual.to_code(),
            );
        }
    }
}

struct QueryHandler<'q> {
    server_peer: PeerHandle,
    status: &'q mut QueryStatus,
}

impl EventHandler for QueryHandler<'_> {
    fn on_connect(&mut self, peer: PeerHandle, _tag: ConnectionTag) {
        if peer == self.server_peer {
            debug!("status query connected, waiting for answer");
        }
    }

    fn on_disconnect(&mut self, peer: PeerHandle, reason: DisconnectReason) {
        if peer == self.server_peer {
            *self.status = QueryStatus::Failed(reason);
        }
    }

    fn on_receive(&mut self, peer: PeerHandle, channel: ChannelId, packet: &[u8]) {
        if peer != self.server_peer || channel != QUERY_CHANNEL {
            debug!("dropping stray packet on channel {}", channel);
            return;
        }
        let answer = read_internal_message(packet).and_then(|(message_type, payload)| {
            match message_type {
                MessageType::ServerInfo => ServerInfo::read(payload).map(Some),
                _ => Ok(None),
            }
        });
        match answer {
            Ok(Some(info)) => *self.status = QueryStatus::Answered(info),
            Ok(None) => warn!("status query got an unrelated message"),
            Err(violation) => warn!("malformed status answer: {}", violation),
        }
    }
}
