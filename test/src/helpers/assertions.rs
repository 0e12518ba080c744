/// Assert that the client reached the active state in `slot`
#[macro_export]
macro_rules! assert_active {
    ($client:expr, $slot:expr) => {
        assert_eq!(
            $client.state(),
            netslot_client::ClientState::Connected,
            "client should be connected"
        );
        assert_eq!($client.slot_index(), Some($slot));
    };
}

/// Assert that exactly one disconnect with `reason` was reported to the client
#[macro_export]
macro_rules! assert_single_disconnect {
    ($client:expr, $reason:expr) => {
        assert_eq!(
            $client.callbacks().disconnects(),
            vec![$reason],
            "client should see exactly one disconnect"
        );
        assert_eq!($client.state(), netslot_client::ClientState::Disconnected);
    };
}
