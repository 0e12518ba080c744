//! # Netslot Client
//! A session client that connects to a netslot server, presents its
//! credentials over the internal channel, and exchanges packets on user
//! channels once admitted.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

#[macro_use]
extern crate cfg_if;

pub mod transport;
pub mod shared {
    pub use netslot_shared::{
        disconnect_reason_as_text, BoundedName, ChannelId, ConfigError, DisconnectReason,
        ServerInfo, SlotIndex,
    };
}

mod callbacks;
mod client_config;
mod client_context;
mod client_session;
mod client_state;
mod error;
mod query;

pub use callbacks::ClientCallbacks;
pub use client_config::ClientConfig;
pub use client_context::ClientContext;
pub use client_session::ClientSession;
pub use client_state::ClientState;
pub use error::NetClientError;
pub use query::{QueryStatus, ServerQuery};
