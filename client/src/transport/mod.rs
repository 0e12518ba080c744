pub use netslot_shared::transport::{
    DisconnectMode, EventReceiver, HostConfig, PeerHandle, PeerSender, Socket, TransportError,
    TransportEvent,
};

cfg_if! {
    if #[cfg(feature = "transport_local")] {
        pub use netslot_shared::transport::local::{LocalHub, LocalSocket};
    } else {}
}
