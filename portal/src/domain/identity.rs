//! Authenticated identity model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors returned when building an [`Identity`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityValidationError {
    /// Identifier was blank.
    #[error("user id must not be empty")]
    EmptyId,
    /// Email was blank.
    #[error("email must not be empty")]
    EmptyEmail,
}

/// Stable user identifier assigned by the API.
///
/// The API issues opaque identifiers, so only non-blankness is checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    pub fn new(id: impl Into<String>) -> Result<Self, IdentityValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(IdentityValidationError::EmptyId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = IdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// The signed-in user as reported by the auth boundary.
///
/// ## Invariants
/// - `id` and `email` are non-blank.
///
/// # Examples
/// ```
/// use portal::domain::Identity;
///
/// let identity: Identity = serde_json::from_value(serde_json::json!({
///     "id": "42",
///     "email": "ada@example.com",
///     "firstName": "Ada",
///     "lastName": "Lovelace"
/// }))
/// .expect("valid identity");
/// assert_eq!(identity.full_name(), "Ada Lovelace");
/// assert!(identity.avatar().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IdentityDto", into = "IdentityDto")]
pub struct Identity {
    id: UserId,
    email: String,
    first_name: String,
    last_name: String,
    avatar: Option<String>,
}

impl Identity {
    /// Build an identity from its parts.
    pub fn try_new(
        id: UserId,
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        avatar: Option<String>,
    ) -> Result<Self, IdentityValidationError> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(IdentityValidationError::EmptyEmail);
        }
        Ok(Self {
            id,
            email,
            first_name: first_name.into(),
            last_name: last_name.into(),
            avatar: avatar.filter(|value| !value.trim().is_empty()),
        })
    }

    /// Stable identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Contact email.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Given name.
    pub fn first_name(&self) -> &str {
        self.first_name.as_str()
    }

    /// Family name.
    pub fn last_name(&self) -> &str {
        self.last_name.as_str()
    }

    /// Avatar image reference, when the user has one.
    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    /// Name for greetings and headers.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityDto {
    id: String,
    email: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    avatar: Option<String>,
}

impl From<Identity> for IdentityDto {
    fn from(value: Identity) -> Self {
        Self {
            id: value.id.into(),
            email: value.email,
            first_name: value.first_name,
            last_name: value.last_name,
            avatar: value.avatar,
        }
    }
}

impl TryFrom<IdentityDto> for Identity {
    type Error = IdentityValidationError;

    fn try_from(value: IdentityDto) -> Result<Self, Self::Error> {
        Identity::try_new(
            UserId::new(value.id)?,
            value.email,
            value.first_name,
            value.last_name,
            value.avatar,
        )
    }
}
