/// Version of the internal wire enumerations (connection kinds, message
/// types, disconnect reasons). Client and server must agree on it.
pub const PROTOCOL_VERSION: u16 = 1;

/// Longest display name, in bytes, that a server or a slot may carry
pub const MAX_NAME_LEN: usize = 63;

/// Channels reserved after the user channels for protocol traffic
pub const INTERNAL_CHANNEL_COUNT: usize = 1;

/// Upper bound on channels per connection imposed by the transport
pub const MAX_CHANNEL_COUNT: usize = 255;

/// Slot indices travel as u16 in the activation message
pub const MAX_CLIENTS: usize = 4096;

/// Extra transport peers a server host reserves beyond its slots, so that a
/// full server can still answer status queries and send `ServerFull`
pub const RESERVED_PEERS: usize = 4;

/// Channel used to answer status queries, which know nothing of the server's
/// user channel layout
pub const QUERY_CHANNEL: u8 = 0;
