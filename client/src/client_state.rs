/// Progress of a client through the connection handshake
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClientState {
    /// Waiting for the transport to establish the connection
    Connecting,
    /// Credentials sent, waiting for the server's answer
    Authenticating,
    /// Accepted into a slot
    Connected,
    /// A disconnect was requested locally and is being delivered
    Disconnecting,
    /// The connection is over. No callback fires after this.
    Disconnected,
}
