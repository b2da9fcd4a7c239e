//! Domain-level error types.
//!
//! These errors are transport agnostic. Services convert port failures into
//! one [`ErrorCode`] kind carrying a human-readable message, so the flow that
//! triggered the failure can surface it next to its own control.

use serde::{Deserialize, Serialize};

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// A local precondition failed; nothing reached the network.
    Validation,
    /// Login or registration was rejected by the auth boundary.
    Auth,
    /// Listing or loading cases failed.
    Fetch,
    /// A donation submission was rejected.
    Donation,
    /// The transport failed before the boundary could answer.
    Network,
    /// Local storage or decoding failed unexpectedly.
    Internal,
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` must be non-empty once trimmed of whitespace.
///
/// # Examples
/// ```
/// use portal::domain::{Error, ErrorCode};
///
/// let err = Error::validation("amount must be greater than zero");
/// assert_eq!(err.code(), ErrorCode::Validation);
/// assert!(!err.is_retryable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "ErrorDto", into = "ErrorDto")]
pub struct Error {
    code: ErrorCode,
    message: String,
}

/// Validation errors emitted by the constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorValidationError {
    /// The message was blank.
    #[error("error message must not be empty")]
    EmptyMessage,
}

impl Error {
    /// Create a new error, panicking if validation fails.
    ///
    /// Reserve this for messages written in code; boundary-sourced text goes
    /// through [`Error::from_boundary`].
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        match Self::try_new(code, message) {
            Ok(value) => value,
            Err(err) => panic!("error messages must satisfy validation: {err}"),
        }
    }

    /// Fallible constructor that validates the message content.
    pub fn try_new(code: ErrorCode, message: impl Into<String>) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self { code, message })
    }

    /// Build an error from a message reported by the API boundary.
    ///
    /// Absent or blank boundary messages are replaced by `fallback`.
    ///
    /// # Examples
    /// ```
    /// use portal::domain::{Error, ErrorCode};
    ///
    /// let err = Error::from_boundary(ErrorCode::Auth, Some("  ".to_owned()), "login failed");
    /// assert_eq!(err.message(), "login failed");
    /// ```
    pub fn from_boundary(code: ErrorCode, message: Option<String>, fallback: &str) -> Self {
        message
            .and_then(|text| Self::try_new(code, text).ok())
            .unwrap_or_else(|| Self::new(code, fallback))
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message for the triggering control.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Whether repeating the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self.code, ErrorCode::Fetch | ErrorCode::Network)
    }

    /// Convenience constructor for [`ErrorCode::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }

    /// Convenience constructor for [`ErrorCode::Auth`].
    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Auth, message)
    }

    /// Convenience constructor for [`ErrorCode::Fetch`].
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Fetch, message)
    }

    /// Convenience constructor for [`ErrorCode::Donation`].
    pub fn donation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Donation, message)
    }

    /// Convenience constructor for [`ErrorCode::Network`].
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Network, message)
    }

    /// Convenience constructor for [`ErrorCode::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    code: ErrorCode,
    message: String,
}

impl From<Error> for ErrorDto {
    fn from(value: Error) -> Self {
        Self {
            code: value.code,
            message: value.message,
        }
    }
}

impl TryFrom<ErrorDto> for Error {
    type Error = ErrorValidationError;

    fn try_from(value: ErrorDto) -> Result<Self, Self::Error> {
        Error::try_new(value.code, value.message)
    }
}

#[cfg(test)]
mod tests;
