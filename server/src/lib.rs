//! # Netslot Server
//! A session server that admits clients into a fixed table of slots,
//! authenticates them over an internal channel, and evicts peers that never
//! finish the handshake.

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
        ProtocolViolation, SlotIndex, MAX_CLIENTS, MAX_NAME_LEN,
    };
}

mod callbacks;
mod error;
mod server;
mod slot;

pub use callbacks::ServerCallbacks;
pub use error::NetServerError;
pub use server::{ServerConfig, ServerContext, ServerSession};
pub use slot::{ClientSlot, SlotState};
