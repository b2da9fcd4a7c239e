//! Opaque bearer credential.
//!
//! The client never inspects a credential's structure. It only needs to hold
//! it, send it, and be able to say which credential a log line refers to
//! without printing it.

use std::fmt;

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

const FINGERPRINT_LEN: usize = 12;

/// Validation errors returned by [`Credential::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialValidationError {
    /// The token was empty.
    #[error("credential must not be empty")]
    Empty,
}

/// Bearer token proving an authenticated session.
///
/// ## Invariants
/// - The token is a non-empty string; no other shape is assumed.
/// - `Debug` output is redacted; use [`Credential::fingerprint`] in logs.
///
/// # Examples
/// ```
/// use portal::domain::Credential;
///
/// let credential = Credential::new("abc.def").expect("non-empty token");
/// assert_eq!(credential.expose(), "abc.def");
/// assert!(!format!("{credential:?}").contains("abc.def"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(Zeroizing<String>);

impl Credential {
    /// Wrap a raw token.
    pub fn new(token: impl Into<String>) -> Result<Self, CredentialValidationError> {
        let token = Zeroizing::new(token.into());
        if token.is_empty() {
            return Err(CredentialValidationError::Empty);
        }
        Ok(Self(token))
    }

    /// Raw token for transport headers and storage.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Short SHA-256 digest prefix identifying this credential in logs.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        let mut encoded = hex::encode(digest);
        encoded.truncate(FINGERPRINT_LEN);
        encoded
    }

    /// `Authorization` header value for this credential.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.expose())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential")
            .field(&format_args!("fingerprint={}", self.fingerprint()))
            .finish()
    }
}
