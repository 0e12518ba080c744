use netslot_client::{ClientCallbacks, ClientConfig, ClientContext, ClientSession};
use netslot_shared::{transport::local::LocalHub, ChannelId, DisconnectReason, SlotIndex};

use super::{server_address, USER_CHANNELS};

pub type TestClient = ClientSession<ClientRecorder>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientEvent {
    Connected(SlotIndex),
    Disconnected(DisconnectReason),
    Packet(ChannelId, Vec<u8>),
}

#[derive(Default)]
pub struct ClientRecorder {
    pub events: Vec<ClientEvent>,
}

impl ClientRecorder {
    pub fn disconnects(&self) -> Vec<DisconnectReason> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ClientEvent::Disconnected(reason) => Some(*reason),
                _ => None,
            })
            .collect()
    }

    pub fn packets(&self) -> Vec<(ChannelId, Vec<u8>)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ClientEvent::Packet(channel, packet) => Some((*channel, packet.clone())),
                _ => None,
            })
            .collect()
    }
}

impl ClientCallbacks for ClientRecorder {
    fn connected(&mut self, _ctx: &mut ClientContext, slot: SlotIndex) {
        self.events.push(ClientEvent::Connected(slot));
    }

    fn disconnected(&mut self, reason: DisconnectReason) {
        self.events.push(ClientEvent::Disconnected(reason));
    }

    fn received_packet(&mut self, _ctx: &mut ClientContext, channel: ChannelId, packet: &[u8]) {
        self.events.push(ClientEvent::Packet(channel, packet.to_vec()));
    }
}

pub fn test_client(hub: &LocalHub, auth: &[u8]) -> TestClient {
    let config = ClientConfig {
        server_address: server_address(),
        channel_count: USER_CHANNELS,
        auth_data: Some(auth.to_vec()),
    };
    ClientSession::new(config, hub.socket(), ClientRecorder::default())
        .expect("test client should start")
}
