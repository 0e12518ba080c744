use std::{default::Default, net::SocketAddr, time::Duration};

use netslot_shared::{validate_channel_count, validate_max_clients, BoundedName, ConfigError};

/// Contains Config properties which will be used by the Server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Display name reported to clients and status queries. Must fit in
    /// [`MAX_NAME_LEN`](netslot_shared::MAX_NAME_LEN) bytes.
    pub name: String,
    /// Address the transport host listens on
    pub address: SocketAddr,
    /// Number of user channels. One more channel is reserved for the protocol.
    pub channel_count: usize,
    /// Number of client slots
    pub max_clients: usize,
    /// How long a freshly connected client has to authenticate
    pub reply_timeout: Duration,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        BoundedName::new(&self.name)?;
        validate_channel_count(self.channel_count)?;
        validate_max_clients(self.max_clients)?;
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "server".to_string(),
            address: SocketAddr::from(([0, 0, 0, 0], 1234)),
            channel_count: 1,
            max_clients: 32,
            reply_timeout: Duration::from_secs(5),
        }
    }
}
