/// PROPERTY-BASED TESTS: session invariants
///
/// Uses proptest to verify the handshake across random inputs.
///
/// Key invariants:
/// 1. Credentials reach the server byte for byte, exactly once
/// 2. Slots fill up to capacity and every extra client sees ServerFull
/// 3. Internal messages read back as they were built

use proptest::prelude::*;

use netslot_shared::{
    build_internal_message, read_internal_message, transport::local::LocalHub, DisconnectReason,
    MessageType, PeerHandle,
};
use netslot_test::{exchange_packets, test_client, test_server, TestClient};

fn message_type_strategy() -> impl Strategy<Value = MessageType> {
    prop_oneof![
        Just(MessageType::AuthRequest),
        Just(MessageType::AuthAccepted),
        Just(MessageType::ServerInfo),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The server sees the client's credentials unaltered, once
    #[test]
    fn prop_auth_bytes_arrive_exactly(auth in proptest::collection::vec(any::<u8>(), 0..512)) {
        prop_assume!(auth != netslot_test::REJECTED_AUTH);

        let hub = LocalHub::new();
        let mut server = test_server(&hub, 1);
        let mut client = test_client(&hub, &auth);
        exchange_packets(&mut server, &mut [&mut client]);

        prop_assert_eq!(server.callbacks().auth_seen(), vec![auth]);
        prop_assert_eq!(server.callbacks().connected_slots(), vec![0]);
        prop_assert!(client.context().is_connected());
    }

    /// Never more clients are admitted than there are slots
    #[test]
    fn prop_slots_fill_to_capacity(max_clients in 0usize..6, client_count in 0usize..10) {
        let hub = LocalHub::new();
        let mut server = test_server(&hub, max_clients);
        let mut clients: Vec<TestClient> = Vec::new();
        // one at a time, so slot order follows creation order
        for _ in 0..client_count {
            clients.push(test_client(&hub, b"hello"));
            let mut refs: Vec<&mut TestClient> = clients.iter_mut().collect();
            exchange_packets(&mut server, &mut refs);
        }

        let admitted = client_count.min(max_clients);
        prop_assert_eq!(server.active_count(), admitted);
        for (index, client) in clients.iter().enumerate() {
            if index < admitted {
                prop_assert_eq!(client.slot_index(), Some(index));
            } else {
                prop_assert_eq!(
                    client.callbacks().disconnects(),
                    vec![DisconnectReason::ServerFull]
                );
            }
        }
    }

    /// A built message reads back with its type and payload intact
    #[test]
    fn prop_internal_message_reads_back(
        message_type in message_type_strategy(),
        payload in proptest::collection::vec(any::<u8>(), 0..256),
        user_channels in 0usize..8,
    ) {
        let mut message = build_internal_message(
            PeerHandle::new(1),
            message_type,
            payload.len(),
            user_channels,
        );
        message.payload_mut().copy_from_slice(&payload);

        let (read_type, read_payload) = read_internal_message(message.as_bytes()).unwrap();
        prop_assert_eq!(read_type, message_type);
        prop_assert_eq!(read_payload, &payload[..]);
        prop_assert_eq!(usize::from(message.channel()), user_channels);
    }
}
