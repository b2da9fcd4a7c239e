//! Portal configuration loaded via OrthoConfig.
//!
//! Values layer configuration files and `PORTAL_*` environment variables;
//! the binary then applies its global flags on top. The request timeout
//! carries a loader default and every other field is optional, with
//! accessors supplying the defaults, so an empty environment yields a
//! working local setup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use pagination::DEFAULT_PAGE_SIZE;
use serde::Deserialize;
use url::Url;

use crate::domain::{
    DEFAULT_AUTH_ONLY_PREFIXES, DEFAULT_LANDING_PATH, DEFAULT_LOGIN_PATH,
    DEFAULT_PROTECTED_PREFIXES, RouteTable, RouteTableError,
};
use crate::outbound::DEFAULT_COOKIE_NAME;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TOKEN_DIR: &str = ".portal";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Errors raised when a configured value cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The API base URL did not parse.
    #[error("invalid API base URL '{value}': {source}")]
    ApiBaseUrl {
        /// Configured value.
        value: String,
        /// Parser failure.
        source: url::ParseError,
    },
    /// The bind address did not parse.
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        /// Configured value.
        value: String,
        /// Parser failure.
        source: std::net::AddrParseError,
    },
    /// The route table entries are inconsistent.
    #[error(transparent)]
    Routes(#[from] RouteTableError),
}

/// Configuration values for the portal client and edge server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PORTAL")]
pub struct PortalSettings {
    /// Base URL of the REST API.
    pub api_base_url: Option<String>,
    /// Per-request timeout in seconds.
    #[ortho_config(default = 10)]
    pub request_timeout_secs: u64,
    /// Directory holding the stored credential.
    pub token_dir: Option<PathBuf>,
    /// Name of the credential cookie.
    pub cookie_name: Option<String>,
    /// Cases requested per feed page.
    pub page_size: Option<u32>,
    /// Edge server listen address.
    pub bind_addr: Option<String>,
    /// Prefixes that need a session.
    pub protected_prefixes: Option<Vec<String>>,
    /// Prefixes only anonymous visitors may open.
    pub auth_only_prefixes: Option<Vec<String>>,
    /// Where anonymous visitors are sent.
    pub login_path: Option<String>,
    /// Where signed-in visitors are sent.
    pub landing_path: Option<String>,
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            api_base_url: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            token_dir: None,
            cookie_name: None,
            page_size: None,
            bind_addr: None,
            protected_prefixes: None,
            auth_only_prefixes: None,
            login_path: None,
            landing_path: None,
        }
    }
}

fn prefix_list<'a>(configured: Option<&'a [String]>, defaults: &[&'a str]) -> Vec<&'a str> {
    configured.map_or_else(
        || defaults.to_vec(),
        |entries| {
            entries
                .iter()
                .map(|entry| entry.trim())
                .filter(|entry| !entry.is_empty())
                .collect()
        },
    )
}

impl PortalSettings {
    /// API base URL, defaulting to a local server.
    pub fn api_base_url(&self) -> Result<Url, SettingsError> {
        let value = self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL);
        Url::parse(value).map_err(|source| SettingsError::ApiBaseUrl {
            value: value.to_owned(),
            source,
        })
    }

    /// Request timeout; zero is raised to one second.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Token directory, relative to the working directory by default.
    pub fn token_dir(&self) -> PathBuf {
        self.token_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_DIR))
    }

    /// Credential cookie name.
    pub fn cookie_name(&self) -> &str {
        self.cookie_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_COOKIE_NAME)
    }

    /// Feed page size.
    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Edge server listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Origin of the edge server, the scope of the credential cookie.
    pub fn edge_origin(&self) -> Result<Url, SettingsError> {
        let addr = self.bind_addr()?;
        let value = format!("http://{addr}/");
        Url::parse(&value).map_err(|source| SettingsError::ApiBaseUrl { value, source })
    }

    /// Login path.
    pub fn login_path(&self) -> &str {
        self.login_path.as_deref().unwrap_or(DEFAULT_LOGIN_PATH)
    }

    /// Landing path.
    pub fn landing_path(&self) -> &str {
        self.landing_path.as_deref().unwrap_or(DEFAULT_LANDING_PATH)
    }

    /// Route table built from the configured lists, or the defaults for any
    /// list left unset.
    pub fn route_table(&self) -> Result<RouteTable, SettingsError> {
        let protected = prefix_list(
            self.protected_prefixes.as_deref(),
            &DEFAULT_PROTECTED_PREFIXES,
        );
        let auth_only = prefix_list(
            self.auth_only_prefixes.as_deref(),
            &DEFAULT_AUTH_ONLY_PREFIXES,
        );
        Ok(RouteTable::try_new(
            protected,
            auth_only,
            self.login_path(),
            self.landing_path(),
        )?)
    }
}
