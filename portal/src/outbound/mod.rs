//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of domain port traits:
//!
//! - **http**: reqwest clients for the auth and case REST endpoints
//! - **token_store**: `cap_std` file storage for the session credential
//! - **cookie_mirror**: the shared cookie jar as the credential mirror
//! - **navigation**: a logging navigator for headless runs
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod cookie_mirror;
pub mod http;
pub mod navigation;
pub mod token_store;

pub use cookie_mirror::{CookieJarMirror, DEFAULT_COOKIE_NAME, cookie_value};
pub use http::{ApiClient, ApiClientError, HttpAuthGateway, HttpCaseRepository};
pub use navigation::TracingNavigator;
pub use token_store::FileTokenStore;
