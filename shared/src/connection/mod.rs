pub mod connection_tag;
pub mod dispatch;
pub mod error;
