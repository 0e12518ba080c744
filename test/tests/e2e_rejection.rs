/// END-TO-END: every way a server turns a client away
///
/// Each rejected client must observe exactly one disconnect carrying the
/// server's reason, and must never be activated.

use std::time::Duration;

use netslot_client::ClientState;
use netslot_server::{ServerConfig, SlotState};
use netslot_shared::{transport::local::LocalHub, DisconnectReason};
use netslot_test::{
    assert_active, assert_single_disconnect, exchange_packets, exchange_packets_n_times,
    init_logger, server_address, test_client, test_server, test_server_with, ClientEvent,
    ServerEvent, REJECTED_AUTH, USER_CHANNELS,
};

#[test]
fn rejected_credentials_end_in_auth_failure() {
    init_logger();
    let hub = LocalHub::new();
    let mut server = test_server(&hub, 2);
    let mut client = test_client(&hub, REJECTED_AUTH);

    exchange_packets(&mut server, &mut [&mut client]);

    assert_single_disconnect!(client, DisconnectReason::AuthFailure);
    assert_eq!(
        client.callbacks().events,
        vec![ClientEvent::Disconnected(DisconnectReason::AuthFailure)]
    );
    assert!(server.callbacks().connected_slots().is_empty());
    assert_eq!(
        server.callbacks().disconnects(),
        vec![(0, DisconnectReason::AuthFailure)]
    );
    assert_eq!(server.context().occupied_count(), 0);
}

#[test]
fn rejected_client_receives_no_user_packets() {
    init_logger();
    let hub = LocalHub::new();
    let mut server = test_server(&hub, 2);
    let mut client = test_client(&hub, REJECTED_AUTH);

    // deliver the credentials, then try to reach the rejected slot
    exchange_packets_n_times(&mut server, &mut [&mut client], 2);
    assert!(server.send_packet(0, 0, b"late").is_err());
    assert_eq!(server.broadcast_packet(0, b"late").unwrap(), 0);
    exchange_packets(&mut server, &mut [&mut client]);

    assert!(client.callbacks().packets().is_empty());
    assert_single_disconnect!(client, DisconnectReason::AuthFailure);
}

#[test]
fn full_server_turns_away_the_extra_client() {
    init_logger();
    let hub = LocalHub::new();
    let mut server = test_server(&hub, 1);
    let mut first = test_client(&hub, b"a");
    exchange_packets(&mut server, &mut [&mut first]);

    let mut second = test_client(&hub, b"b");
    exchange_packets(&mut server, &mut [&mut first, &mut second]);

    assert_active!(first, 0);
    assert_single_disconnect!(second, DisconnectReason::ServerFull);
    assert_eq!(server.callbacks().auth_seen(), vec![b"a".to_vec()]);
    assert!(server.callbacks().disconnects().is_empty());
}

#[test]
fn zero_slot_server_refuses_everyone() {
    init_logger();
    let hub = LocalHub::new();
    let mut server = test_server(&hub, 0);
    let mut client = test_client(&hub, b"");

    exchange_packets(&mut server, &mut [&mut client]);

    assert_single_disconnect!(client, DisconnectReason::ServerFull);
    assert!(server.callbacks().events.is_empty());
}

#[test]
fn silent_client_is_timed_out() {
    init_logger();
    let hub = LocalHub::new();
    let mut server = test_server_with(
        &hub,
        ServerConfig {
            name: "impatient".to_string(),
            address: server_address(),
            channel_count: USER_CHANNELS,
            max_clients: 2,
            reply_timeout: Duration::ZERO,
        },
    );
    let mut client = test_client(&hub, b"too late");

    exchange_packets(&mut server, &mut [&mut client]);

    assert_single_disconnect!(client, DisconnectReason::ReplyTimeout);
    assert_ne!(client.state(), ClientState::Connected);
    assert!(server.callbacks().connected_slots().is_empty());
    assert_eq!(
        server.callbacks().disconnects(),
        vec![(0, DisconnectReason::ReplyTimeout)]
    );
}

#[test]
fn credentials_queued_behind_a_timeout_are_ignored() {
    init_logger();
    let hub = LocalHub::new();
    let mut server = test_server_with(
        &hub,
        ServerConfig {
            name: "impatient".to_string(),
            address: server_address(),
            channel_count: USER_CHANNELS,
            max_clients: 2,
            reply_timeout: Duration::ZERO,
        },
    );
    let mut client = test_client(&hub, b"just in time");

    // the credentials are already queued when the sweep evicts the slot
    while client.service(Duration::ZERO).unwrap() {}
    assert_eq!(client.state(), ClientState::Authenticating);
    exchange_packets(&mut server, &mut [&mut client]);

    assert_eq!(
        server.callbacks().events,
        vec![ServerEvent::Disconnected(0, DisconnectReason::ReplyTimeout)]
    );
    assert_eq!(
        client.callbacks().events,
        vec![ClientEvent::Disconnected(DisconnectReason::ReplyTimeout)]
    );
    assert_eq!(server.slot(0).map(|slot| slot.state()), Some(SlotState::Unused));
}

#[test]
fn packets_queued_behind_a_kick_are_dropped() {
    init_logger();
    let hub = LocalHub::new();
    let mut server = test_server(&hub, 2);
    let mut client = test_client(&hub, b"ok");
    exchange_packets(&mut server, &mut [&mut client]);
    assert_active!(client, 0);

    client.send_packet(0, b"too late").unwrap();
    server
        .disconnect_client(0, DisconnectReason::Manual)
        .unwrap();
    exchange_packets(&mut server, &mut [&mut client]);

    assert_eq!(
        server.callbacks().events,
        vec![
            ServerEvent::Connecting(0, b"ok".to_vec()),
            ServerEvent::Connected(0),
            ServerEvent::Disconnected(0, DisconnectReason::Manual),
        ]
    );
    assert_single_disconnect!(client, DisconnectReason::Manual);
    assert_eq!(server.slot(0).map(|slot| slot.state()), Some(SlotState::Unused));
}

#[test]
fn unreachable_server_is_an_unknown_disconnect() {
    init_logger();
    let hub = LocalHub::new();
    let mut client = test_client(&hub, b"");

    while client.service(Duration::ZERO).unwrap() {}

    assert_single_disconnect!(client, DisconnectReason::Unknown);
}
