//! Reqwest-backed auth boundary adapter.

use async_trait::async_trait;
use reqwest::Method;

use super::client::{ApiClient, ApiFailure, decode};
use super::dto::{AuthResponseDto, LoginRequestDto, RegisterRequestDto};
use crate::domain::ports::{AuthGateway, AuthGatewayError, AuthGrant};
use crate::domain::{Credential, Identity, LoginCredentials, RegisterCredentials};

/// Auth gateway calling `/auth/login`, `/auth/register` and `/auth/me`.
#[derive(Debug, Clone)]
pub struct HttpAuthGateway {
    client: ApiClient,
}

impl HttpAuthGateway {
    /// Gateway issuing requests through `client`.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

fn map_failure(failure: ApiFailure) -> AuthGatewayError {
    match failure {
        ApiFailure::Transport(message) => AuthGatewayError::transport(message),
        ApiFailure::Status { status, message } => {
            AuthGatewayError::rejected(status.as_u16(), message.unwrap_or_default())
        }
    }
}

fn parse_grant(body: &[u8]) -> Result<AuthGrant, AuthGatewayError> {
    decode::<AuthResponseDto>(body)
        .and_then(AuthResponseDto::into_grant)
        .map_err(AuthGatewayError::decode)
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthGrant, AuthGatewayError> {
        let request = self
            .client
            .request(Method::POST, self.client.endpoint(&["auth", "login"]), None)
            .json(&LoginRequestDto::from(credentials));
        let body = self.client.send(request).await.map_err(map_failure)?;
        parse_grant(&body)
    }

    async fn register(
        &self,
        credentials: &RegisterCredentials,
    ) -> Result<AuthGrant, AuthGatewayError> {
        let request = self
            .client
            .request(Method::POST, self.client.endpoint(&["auth", "register"]), None)
            .json(&RegisterRequestDto::from(credentials));
        let body = self.client.send(request).await.map_err(map_failure)?;
        parse_grant(&body)
    }

    async fn current_identity(
        &self,
        credential: &Credential,
    ) -> Result<Identity, AuthGatewayError> {
        let request = self.client.request(
            Method::GET,
            self.client.endpoint(&["auth", "me"]),
            Some(credential),
        );
        let body = self.client.send(request).await.map_err(map_failure)?;
        decode::<Identity>(&body).map_err(AuthGatewayError::decode)
    }
}
