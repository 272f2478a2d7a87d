//! HTTP server configuration object.

use std::net::SocketAddr;

use newsroom::inbound::http::session_config::SessionSettings;

/// Everything the listener needs besides handler state.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
}

impl ServerConfig {
    /// Construct a server configuration.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        Self { session, bind_addr }
    }
}
