//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (token storage, the credential mirror, navigation, the auth
//! and case boundaries) are traits the services hold as `Arc<dyn Port>`.
//! Each port ships a fixture implementation so the binary can run offline
//! and tests can wire services without a network.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_gateway;
mod case_repository;
mod credential_mirror;
mod navigator;
mod token_store;

#[cfg(test)]
pub use auth_gateway::MockAuthGateway;
pub use auth_gateway::{
    AuthGateway, AuthGatewayError, AuthGrant, FIXTURE_EMAIL, FIXTURE_PASSWORD, FIXTURE_TOKEN,
    FixtureAuthGateway,
};
#[cfg(test)]
pub use case_repository::MockCaseRepository;
pub use case_repository::{
    CaseQuery, CaseRepository, CaseRepositoryError, FixtureCaseRepository, sample_cases,
};
#[cfg(test)]
pub use credential_mirror::MockCredentialMirror;
pub use credential_mirror::{CredentialMirror, NoopCredentialMirror};
#[cfg(test)]
pub use navigator::MockNavigator;
pub use navigator::{FixtureNavigator, Navigator};
#[cfg(test)]
pub use token_store::MockTokenStore;
pub use token_store::{InMemoryTokenStore, TokenStore, TokenStoreError};
