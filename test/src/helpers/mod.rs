pub mod assertions;
pub mod test_client;
pub mod test_server;

pub use packet_exchange::{exchange_packets, exchange_packets_n_times};
pub use test_client::{test_client, ClientEvent, ClientRecorder, TestClient};
pub use test_server::{
    server_address, test_server, test_server_with, ServerEvent, ServerRecorder, TestServer,
    REJECTED_AUTH, USER_CHANNELS,
};

/// Routes `log` output through the test harness. Safe to call from every test.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
