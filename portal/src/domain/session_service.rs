//! Session lifecycle: login, registration, logout and request headers.
//!
//! The service is the only writer of the token store. Every write and clear
//! is repeated on the credential mirror so request-time guards agree with
//! the process about whether a session exists.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::ports::{
    AuthGateway, AuthGatewayError, CredentialMirror, Navigator, TokenStore, TokenStoreError,
};
use super::{Credential, Error, ErrorCode, Identity, LoginCredentials, RegisterCredentials};

/// Header carrying the bearer token.
pub const AUTHORIZATION: &str = "Authorization";
/// Header declaring the JSON request body.
pub const CONTENT_TYPE: &str = "Content-Type";
/// Media type sent with every API call.
pub const APPLICATION_JSON: &str = "application/json";

/// Request headers for an API call, keyed by header name.
pub type AuthHeaders = BTreeMap<&'static str, String>;

/// Headers for a call made with `credential`.
///
/// `Content-Type` is always present; `Authorization` only when a credential
/// is supplied.
///
/// # Examples
/// ```
/// use portal::domain::{auth_headers, Credential, AUTHORIZATION, CONTENT_TYPE};
///
/// let anonymous = auth_headers(None);
/// assert!(!anonymous.contains_key(AUTHORIZATION));
/// assert_eq!(anonymous[CONTENT_TYPE], "application/json");
///
/// let credential = Credential::new("t").expect("token");
/// assert_eq!(auth_headers(Some(&credential))[AUTHORIZATION], "Bearer t");
/// ```
pub fn auth_headers(credential: Option<&Credential>) -> AuthHeaders {
    let mut headers = AuthHeaders::new();
    headers.insert(CONTENT_TYPE, APPLICATION_JSON.to_owned());
    if let Some(credential) = credential {
        headers.insert(AUTHORIZATION, credential.bearer());
    }
    headers
}

fn map_gateway_error(error: AuthGatewayError, fallback: &str) -> Error {
    match error {
        AuthGatewayError::Rejected { message, .. } => {
            Error::from_boundary(ErrorCode::Auth, Some(message), fallback)
        }
        AuthGatewayError::Transport { message } => Error::network(message),
        AuthGatewayError::Decode { message } => {
            Error::internal(format!("{fallback}: unreadable response ({message})"))
        }
    }
}

fn map_store_error(error: TokenStoreError) -> Error {
    Error::internal(error.to_string())
}

/// Adapters the session service drives.
#[derive(Clone)]
pub struct SessionPorts {
    /// Durable credential storage.
    pub store: Arc<dyn TokenStore>,
    /// Request-visible credential copy.
    pub mirror: Arc<dyn CredentialMirror>,
    /// Remote auth boundary.
    pub gateway: Arc<dyn AuthGateway>,
    /// Page navigation.
    pub navigator: Arc<dyn Navigator>,
}

/// Owns the session credential.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use portal::domain::ports::{
///     FixtureAuthGateway, FixtureNavigator, InMemoryTokenStore, NoopCredentialMirror,
/// };
/// use portal::domain::{SessionPorts, SessionService};
///
/// let session = SessionService::new(
///     SessionPorts {
///         store: Arc::new(InMemoryTokenStore::default()),
///         mirror: Arc::new(NoopCredentialMirror),
///         gateway: Arc::new(FixtureAuthGateway),
///         navigator: Arc::new(FixtureNavigator),
///     },
///     "/auth/login",
/// );
/// assert!(!session.is_authenticated());
/// ```
#[derive(Clone)]
pub struct SessionService {
    ports: SessionPorts,
    login_path: String,
}

impl SessionService {
    /// Service redirecting to `login_path` on logout.
    pub fn new(ports: SessionPorts, login_path: impl Into<String>) -> Self {
        Self {
            ports,
            login_path: login_path.into(),
        }
    }

    fn persist(&self, credential: &Credential) -> Result<(), Error> {
        self.ports.store.set(credential).map_err(map_store_error)?;
        self.ports.mirror.mirror(credential);
        info!(credential = %credential.fingerprint(), "session established");
        Ok(())
    }

    /// Exchange credentials for a session.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Identity, Error> {
        let grant = self
            .ports
            .gateway
            .login(credentials)
            .await
            .map_err(|err| map_gateway_error(err, "login failed"))?;
        self.persist(&grant.credential)?;
        Ok(grant.identity)
    }

    /// Create an account and start its session.
    pub async fn register(&self, credentials: &RegisterCredentials) -> Result<Identity, Error> {
        let grant = self
            .ports
            .gateway
            .register(credentials)
            .await
            .map_err(|err| map_gateway_error(err, "registration failed"))?;
        self.persist(&grant.credential)?;
        Ok(grant.identity)
    }

    /// End the session and navigate to the login page.
    ///
    /// The mirror is cleared and navigation happens even when the durable
    /// delete fails; that failure is still returned.
    pub fn logout(&self) -> Result<(), Error> {
        let cleared = self.invalidate();
        self.ports.navigator.redirect(&self.login_path);
        cleared
    }

    /// Forget the credential without navigating.
    pub fn invalidate(&self) -> Result<(), Error> {
        let fingerprint = self.ports.store.get().map(|credential| credential.fingerprint());
        self.ports.mirror.clear();
        let cleared = self.ports.store.clear().map_err(map_store_error);
        match (&cleared, fingerprint) {
            (Ok(()), Some(fingerprint)) => info!(credential = %fingerprint, "session cleared"),
            (Ok(()), None) => debug!("no session to clear"),
            (Err(err), _) => warn!(error = %err, "failed to clear stored credential"),
        }
        cleared
    }

    /// Whether a credential is stored.
    pub fn is_authenticated(&self) -> bool {
        self.ports.store.get().is_some()
    }

    /// The stored credential.
    pub fn credential(&self) -> Option<Credential> {
        self.ports.store.get()
    }

    /// Headers for the next API call.
    pub fn auth_headers(&self) -> AuthHeaders {
        auth_headers(self.credential().as_ref())
    }

    /// Resolve who the stored credential belongs to.
    pub async fn whoami(&self) -> Result<Identity, Error> {
        let credential = self
            .credential()
            .ok_or_else(|| Error::auth("not signed in"))?;
        self.identify(&credential).await
    }

    /// Resolve who `credential` belongs to, whether or not it is stored.
    pub async fn identify(&self, credential: &Credential) -> Result<Identity, Error> {
        self.ports
            .gateway
            .current_identity(credential)
            .await
            .map_err(|err| map_gateway_error(err, "session is no longer valid"))
    }

    /// Forget the stored credential only while it is still `expected`.
    ///
    /// Returns `Ok(false)` when another login or logout replaced it first.
    pub fn invalidate_if_current(&self, expected: &Credential) -> Result<bool, Error> {
        match self.ports.store.get() {
            Some(stored) if stored == *expected => self.invalidate().map(|()| true),
            _ => {
                debug!(
                    credential = %expected.fingerprint(),
                    "credential already replaced; leaving session in place"
                );
                Ok(false)
            }
        }
    }

    /// Re-publish the stored credential to the mirror.
    pub fn restore_mirror(&self) {
        if let Some(credential) = self.credential() {
            self.ports.mirror.mirror(&credential);
        }
    }
}

#[cfg(test)]
#[path = "session_service_tests.rs"]
mod tests;
