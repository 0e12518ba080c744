//! # Netslot Shared
//! Common functionality shared between netslot-server & netslot-client crates:
//! the transport contract, the internal-channel codec and the disconnect
//! reasons both ends agree on.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

mod config;
mod connection;
mod constants;
mod disconnect_reason;
mod messages;
mod name;
mod types;

pub mod transport;

pub use config::{
    max_user_channels, total_channel_count, validate_channel_count, validate_max_clients,
    ConfigError,
};
pub use connection::{
    connection_tag::{ConnectionKind, ConnectionTag},
    dispatch::{dispatch_transport_event, EventHandler},
    error::ProtocolViolation,
};
pub use constants::{
    INTERNAL_CHANNEL_COUNT, MAX_CHANNEL_COUNT, MAX_CLIENTS, MAX_NAME_LEN, PROTOCOL_VERSION,
    QUERY_CHANNEL, RESERVED_PEERS,
};
pub use disconnect_reason::{disconnect_reason_as_text, DisconnectReason};
pub use messages::{
    internal_message::{
        build_internal_message, internal_channel, read_internal_message, InternalMessage,
        INTERNAL_CHANNEL_OFFSET, MESSAGE_HEADER_SIZE,
    },
    message_type::MessageType,
    server_info::{AuthAccepted, ServerInfo},
};
pub use name::{copy_string, BoundedName};
pub use transport::{
    DisconnectMode, EventReceiver, HostConfig, PeerHandle, PeerSender, Socket, TransportError,
    TransportEvent,
};
pub use types::{ChannelId, HostType, SlotIndex};
