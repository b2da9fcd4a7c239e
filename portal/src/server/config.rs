//! Edge server configuration object.

use std::net::SocketAddr;
use std::sync::Arc;

use portal::PortalSettings;
use portal::config::SettingsError;
use portal::domain::RouteTable;

/// Everything the edge server needs, resolved from [`PortalSettings`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) routes: Arc<RouteTable>,
    pub(crate) cookie_name: String,
}

impl ServerConfig {
    /// Construct a server configuration from explicit parts.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, routes: RouteTable, cookie_name: impl Into<String>) -> Self {
        Self {
            bind_addr,
            routes: Arc::new(routes),
            cookie_name: cookie_name.into(),
        }
    }

    /// Resolve the bind address, route table and cookie name from settings.
    ///
    /// # Errors
    /// Returns [`SettingsError`] when the bind address or route table is
    /// invalid.
    pub fn from_settings(settings: &PortalSettings) -> Result<Self, SettingsError> {
        Ok(Self::new(
            settings.bind_addr()?,
            settings.route_table()?,
            settings.cookie_name(),
        ))
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
