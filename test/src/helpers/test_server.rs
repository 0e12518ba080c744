use std::{net::SocketAddr, time::Duration};

use log::debug;

use netslot_server::{ServerCallbacks, ServerConfig, ServerContext, ServerSession};
use netslot_shared::{transport::local::LocalHub, ChannelId, DisconnectReason, SlotIndex};

/// Credentials the recording server turns away with `AuthFailure`
pub const REJECTED_AUTH: &[u8] = b"NOPE";

pub const USER_CHANNELS: usize = 2;

pub type TestServer = ServerSession<ServerRecorder>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerEvent {
    Connecting(SlotIndex, Vec<u8>),
    Connected(SlotIndex),
    Disconnected(SlotIndex, DisconnectReason),
    Packet(SlotIndex, ChannelId, Vec<u8>),
}

/// Server callbacks that log every hook in order. Rejects [`REJECTED_AUTH`]
/// and can echo user packets back to their sender.
#[derive(Default)]
pub struct ServerRecorder {
    pub events: Vec<ServerEvent>,
    pub echo: bool,
}

impl ServerRecorder {
    pub fn connected_slots(&self) -> Vec<SlotIndex> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ServerEvent::Connected(slot) => Some(*slot),
                _ => None,
            })
            .collect()
    }

    pub fn disconnects(&self) -> Vec<(SlotIndex, DisconnectReason)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ServerEvent::Disconnected(slot, reason) => Some((*slot, *reason)),
                _ => None,
            })
            .collect()
    }

    pub fn auth_seen(&self) -> Vec<Vec<u8>> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ServerEvent::Connecting(_, auth) => Some(auth.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn packets(&self) -> Vec<(SlotIndex, ChannelId, Vec<u8>)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ServerEvent::Packet(slot, channel, packet) => {
                    Some((*slot, *channel, packet.clone()))
                }
                _ => None,
            })
            .collect()
    }
}

impl ServerCallbacks for ServerRecorder {
    /// Packets received from the slot's current occupant
    type SlotData = usize;

    fn client_connecting(&mut self, ctx: &mut ServerContext<usize>, slot: SlotIndex, auth: &[u8]) {
        self.events.push(ServerEvent::Connecting(slot, auth.to_vec()));
        if auth == REJECTED_AUTH {
            debug!("turning away slot {}", slot);
            let _ = ctx.disconnect_client(slot, DisconnectReason::AuthFailure);
        }
    }

    fn client_connected(&mut self, _ctx: &mut ServerContext<usize>, slot: SlotIndex) {
        self.events.push(ServerEvent::Connected(slot));
    }

    fn client_disconnected(
        &mut self,
        _ctx: &mut ServerContext<usize>,
        slot: SlotIndex,
        reason: DisconnectReason,
    ) {
        self.events.push(ServerEvent::Disconnected(slot, reason));
    }

    fn client_sent_packet(
        &mut self,
        ctx: &mut ServerContext<usize>,
        slot: SlotIndex,
        channel: ChannelId,
        packet: &[u8],
    ) {
        self.events
            .push(ServerEvent::Packet(slot, channel, packet.to_vec()));
        if let Some(count) = ctx.slot_data_mut(slot) {
            *count += 1;
        }
        if self.echo {
            let _ = ctx.send_packet(slot, channel, packet);
        }
    }
}

/// Fixed loopback address; every test uses its own hub, so ports never clash
pub fn server_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 7777))
}

pub fn test_server(hub: &LocalHub, max_clients: usize) -> TestServer {
    test_server_with(
        hub,
        ServerConfig {
            name: "test server".to_string(),
            address: server_address(),
            channel_count: USER_CHANNELS,
            max_clients,
            reply_timeout: Duration::from_secs(60),
        },
    )
}

pub fn test_server_with(hub: &LocalHub, config: ServerConfig) -> TestServer {
    ServerSession::new(config, hub.socket(), ServerRecorder::default())
        .expect("test server should start")
}
