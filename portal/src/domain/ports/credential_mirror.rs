//! Driven port for the request-visible copy of the credential.
//!
//! The token store answers "is there a session" for this process; the
//! mirror makes the same credential visible to whatever inspects incoming
//! requests before any handler runs (the route guard reads it as a cookie).

use crate::domain::Credential;

/// Keeps a second, request-visible copy of the credential.
///
/// Mirroring cannot fail from the caller's perspective: a missing mirror
/// only degrades guard decisions, never the session itself.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialMirror: Send + Sync {
    /// Publish `credential` where request inspection can see it.
    fn mirror(&self, credential: &Credential);

    /// Withdraw any published credential.
    fn clear(&self);
}

/// Mirror that publishes nowhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCredentialMirror;

impl CredentialMirror for NoopCredentialMirror {
    fn mirror(&self, _credential: &Credential) {}

    fn clear(&self) {}
}
