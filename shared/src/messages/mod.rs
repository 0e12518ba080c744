pub mod internal_message;
pub mod message_type;
pub mod server_info;
