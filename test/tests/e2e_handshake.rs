/// END-TO-END: authentication handshake between real sessions
///
/// A client connects, presents its credentials once, and is activated into
/// the lowest free slot. Only then does user traffic flow in either direction.

use netslot_client::ClientState;
use netslot_server::SlotState;
use netslot_shared::{transport::local::LocalHub, DisconnectReason};
use netslot_test::{
    assert_active, assert_single_disconnect, exchange_packets, init_logger, test_client,
    test_server, ClientEvent, ServerEvent,
};

#[test]
fn client_is_activated_after_presenting_credentials() {
    init_logger();
    let hub = LocalHub::new();
    let mut server = test_server(&hub, 4);
    let mut client = test_client(&hub, b"letmein");

    exchange_packets(&mut server, &mut [&mut client]);

    assert_active!(client, 0);
    assert_eq!(
        client.server_name().map(|name| name.as_str()),
        Some("test server")
    );
    assert_eq!(
        server.callbacks().events,
        vec![
            ServerEvent::Connecting(0, b"letmein".to_vec()),
            ServerEvent::Connected(0),
        ]
    );
    assert_eq!(client.callbacks().events, vec![ClientEvent::Connected(0)]);
    assert_eq!(server.slot(0).map(|slot| slot.state()), Some(SlotState::Active));
    assert_eq!(server.active_count(), 1);
}

#[test]
fn each_client_takes_the_lowest_free_slot() {
    init_logger();
    let hub = LocalHub::new();
    let mut server = test_server(&hub, 4);
    let mut first = test_client(&hub, b"a");
    let mut second = test_client(&hub, b"b");
    exchange_packets(&mut server, &mut [&mut first, &mut second]);

    assert_active!(first, 0);
    assert_active!(second, 1);

    drop(first);
    exchange_packets(&mut server, &mut [&mut second]);
    assert_eq!(server.callbacks().disconnects(), vec![(0, DisconnectReason::Manual)]);

    let mut third = test_client(&hub, b"c");
    exchange_packets(&mut server, &mut [&mut second, &mut third]);
    assert_active!(third, 0);
}

#[test]
fn user_packets_flow_both_ways_once_active() {
    init_logger();
    let hub = LocalHub::new();
    let mut server = test_server(&hub, 2);
    server.callbacks_mut().echo = true;
    let mut client = test_client(&hub, b"");
    exchange_packets(&mut server, &mut [&mut client]);

    client.send_packet(1, b"ping").unwrap();
    exchange_packets(&mut server, &mut [&mut client]);

    assert_eq!(server.callbacks().packets(), vec![(0, 1, b"ping".to_vec())]);
    assert_eq!(client.callbacks().packets(), vec![(1, b"ping".to_vec())]);
    assert_eq!(server.slot(0).map(|slot| *slot.user_data()), Some(1));
}

#[test]
fn broadcast_reaches_only_active_clients() {
    init_logger();
    let hub = LocalHub::new();
    let mut server = test_server(&hub, 4);
    let mut active = test_client(&hub, b"ok");
    exchange_packets(&mut server, &mut [&mut active]);

    // connected but not yet authenticated
    let mut pending = test_client(&hub, b"ok");
    server.service(std::time::Duration::ZERO).unwrap();
    assert_eq!(server.slot(1).map(|slot| slot.state()), Some(SlotState::Unauthenticated));

    assert_eq!(server.broadcast_packet(0, b"news").unwrap(), 1);
    exchange_packets(&mut server, &mut [&mut active, &mut pending]);

    assert_eq!(active.callbacks().packets(), vec![(0, b"news".to_vec())]);
    assert!(pending.callbacks().packets().is_empty());
    assert_active!(pending, 1);
}

#[test]
fn client_disconnect_is_reported_on_both_ends() {
    init_logger();
    let hub = LocalHub::new();
    let mut server = test_server(&hub, 2);
    let mut client = test_client(&hub, b"");
    exchange_packets(&mut server, &mut [&mut client]);

    client.disconnect();
    assert_eq!(client.state(), ClientState::Disconnecting);
    exchange_packets(&mut server, &mut [&mut client]);

    assert_single_disconnect!(client, DisconnectReason::Manual);
    assert_eq!(server.callbacks().disconnects(), vec![(0, DisconnectReason::Manual)]);
    assert_eq!(server.slot(0).map(|slot| slot.state()), Some(SlotState::Unused));
}

#[test]
fn server_kick_is_reported_with_its_reason() {
    init_logger();
    let hub = LocalHub::new();
    let mut server = test_server(&hub, 2);
    let mut client = test_client(&hub, b"");
    exchange_packets(&mut server, &mut [&mut client]);

    server
        .disconnect_client(0, DisconnectReason::AuthFailure)
        .unwrap();
    exchange_packets(&mut server, &mut [&mut client]);

    assert_single_disconnect!(client, DisconnectReason::AuthFailure);
    assert_eq!(
        server.callbacks().disconnects(),
        vec![(0, DisconnectReason::AuthFailure)]
    );
}
