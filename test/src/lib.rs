//! Harness for driving real server and client sessions against each other
//! over an in-process [`LocalHub`](netslot_shared::transport::local::LocalHub).

pub mod helpers;

pub use helpers::*;
