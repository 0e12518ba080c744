use std::{default::Default, net::SocketAddr};

use netslot_shared::{validate_channel_count, ConfigError};

/// Contains Config properties which will be used by a Client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Address of the server to connect to
    pub server_address: SocketAddr,
    /// Number of user channels. Must match the server's.
    pub channel_count: usize,
    /// Credentials presented to the server once, right after connecting.
    /// `None` sends an empty authentication request.
    pub auth_data: Option<Vec<u8>>,
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_channel_count(self.channel_count)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_address: SocketAddr::from(([127, 0, 0, 1], 1234)),
            channel_count: 1,
            auth_data: None,
        }
    }
}
