//! Driven port for the remote authentication boundary.
//!
//! The session service calls this port to exchange credentials for a bearer
//! token and to ask who a token belongs to. Adapters translate transport
//! failures into [`AuthGatewayError`] so the service can map them onto the
//! domain error taxonomy without knowing about HTTP.

use async_trait::async_trait;

use crate::domain::{Credential, Identity, LoginCredentials, RegisterCredentials, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by auth gateway adapters.
    pub enum AuthGatewayError {
        /// The boundary answered but refused the request. `message` is the
        /// boundary-supplied text and may be blank.
        Rejected { status: u16, message: String } =>
            "auth boundary rejected the request ({status}): {message}",
        /// The boundary could not be reached.
        Transport { message: String } => "auth boundary unreachable: {message}",
        /// The boundary answered with a payload that could not be read.
        Decode { message: String } => "auth boundary response unreadable: {message}",
    }
}

/// Successful login or registration outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGrant {
    /// Bearer token for subsequent calls.
    pub credential: Credential,
    /// The user the token belongs to.
    pub identity: Identity,
}

/// Port for exchanging credentials with the auth boundary.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchange an email/password pair for a token.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthGrant, AuthGatewayError>;

    /// Create an account and return its first token.
    async fn register(
        &self,
        credentials: &RegisterCredentials,
    ) -> Result<AuthGrant, AuthGatewayError>;

    /// Resolve the identity that owns `credential`.
    async fn current_identity(&self, credential: &Credential)
    -> Result<Identity, AuthGatewayError>;
}

/// Fixture email accepted by [`FixtureAuthGateway`].
pub const FIXTURE_EMAIL: &str = "demo@portal.test";
/// Fixture password accepted by [`FixtureAuthGateway`].
pub const FIXTURE_PASSWORD: &str = "password";
/// Token issued by [`FixtureAuthGateway`].
pub const FIXTURE_TOKEN: &str = "fixture-token";

/// In-process auth boundary for tests and offline runs.
///
/// `demo@portal.test` / `password` logs in; registration always succeeds
/// and echoes the submitted names back. Only [`FIXTURE_TOKEN`] resolves to
/// an identity.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAuthGateway;

impl FixtureAuthGateway {
    fn grant(email: &str, first_name: &str, last_name: &str) -> Result<AuthGrant, AuthGatewayError> {
        let credential =
            Credential::new(FIXTURE_TOKEN).map_err(|err| AuthGatewayError::decode(err.to_string()))?;
        let identity = UserId::new("fixture-user")
            .map_err(|err| AuthGatewayError::decode(err.to_string()))
            .and_then(|id| {
                Identity::try_new(id, email, first_name, last_name, None)
                    .map_err(|err| AuthGatewayError::decode(err.to_string()))
            })?;
        Ok(AuthGrant {
            credential,
            identity,
        })
    }
}

#[async_trait]
impl AuthGateway for FixtureAuthGateway {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthGrant, AuthGatewayError> {
        if credentials.email() == FIXTURE_EMAIL && credentials.password() == FIXTURE_PASSWORD {
            Self::grant(FIXTURE_EMAIL, "Demo", "User")
        } else {
            Err(AuthGatewayError::rejected(401_u16, "invalid credentials"))
        }
    }

    async fn register(
        &self,
        credentials: &RegisterCredentials,
    ) -> Result<AuthGrant, AuthGatewayError> {
        Self::grant(
            credentials.email(),
            credentials.first_name(),
            credentials.last_name(),
        )
    }

    async fn current_identity(
        &self,
        credential: &Credential,
    ) -> Result<Identity, AuthGatewayError> {
        if credential.expose() == FIXTURE_TOKEN {
            Self::grant(FIXTURE_EMAIL, "Demo", "User").map(|grant| grant.identity)
        } else {
            Err(AuthGatewayError::rejected(401_u16, ""))
        }
    }
}
