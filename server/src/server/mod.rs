mod server_config;
pub use server_config::ServerConfig;

mod server_context;
pub use server_context::ServerContext;

mod server_session;
pub use server_session::ServerSession;
