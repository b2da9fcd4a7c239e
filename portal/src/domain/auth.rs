//! Authentication primitives such as login and registration credentials.
//!
//! Keep raw form input outside the session service by exposing constructors
//! that validate string inputs before anything talks to the auth boundary.

use std::fmt;

use zeroize::Zeroizing;

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
    /// First name was missing or blank once trimmed.
    EmptyFirstName,
    /// Last name was missing or blank once trimmed.
    EmptyLastName,
    /// Password confirmation did not match.
    PasswordMismatch,
    /// Terms and conditions were not accepted.
    TermsNotAccepted,
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::EmptyFirstName => write!(f, "first name must not be empty"),
            Self::EmptyLastName => write!(f, "last name must not be empty"),
            Self::PasswordMismatch => write!(f, "passwords do not match"),
            Self::TermsNotAccepted => write!(f, "terms and conditions must be accepted"),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

fn required(value: &str, error: CredentialsValidationError) -> Result<String, CredentialsValidationError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(error);
    }
    Ok(normalized.to_owned())
}

fn required_password(password: &str) -> Result<Zeroizing<String>, CredentialsValidationError> {
    if password.is_empty() {
        return Err(CredentialsValidationError::EmptyPassword);
    }
    Ok(Zeroizing::new(password.to_owned()))
}

/// Validated login credentials sent to the auth boundary.
///
/// ## Invariants
/// - `email` is trimmed and non-empty.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use portal::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ana@example.com ", "secret").unwrap();
/// assert_eq!(creds.email(), "ana@example.com");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        Ok(Self {
            email: required(email, CredentialsValidationError::EmptyEmail)?,
            password: required_password(password)?,
        })
    }

    /// Email used as the login name.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Raw registration form values before validation.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationForm<'a> {
    /// Given name.
    pub first_name: &'a str,
    /// Family name.
    pub last_name: &'a str,
    /// Contact and login email.
    pub email: &'a str,
    /// Chosen password.
    pub password: &'a str,
    /// Password typed a second time.
    pub confirm_password: &'a str,
    /// Whether the terms and conditions box was ticked.
    pub accept_terms: bool,
}

/// Validated registration request.
///
/// ## Invariants
/// - Names and email are trimmed and non-empty.
/// - The password is non-empty and equals its confirmation.
/// - Terms were accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterCredentials {
    first_name: String,
    last_name: String,
    email: String,
    password: Zeroizing<String>,
}

impl RegisterCredentials {
    /// Validate a registration form.
    pub fn try_from_form(form: RegistrationForm<'_>) -> Result<Self, CredentialsValidationError> {
        let first_name = required(form.first_name, CredentialsValidationError::EmptyFirstName)?;
        let last_name = required(form.last_name, CredentialsValidationError::EmptyLastName)?;
        let email = required(form.email, CredentialsValidationError::EmptyEmail)?;
        let password = required_password(form.password)?;
        if form.password != form.confirm_password {
            return Err(CredentialsValidationError::PasswordMismatch);
        }
        if !form.accept_terms {
            return Err(CredentialsValidationError::TermsNotAccepted);
        }
        Ok(Self {
            first_name,
            last_name,
            email,
            password,
        })
    }

    /// Given name.
    pub fn first_name(&self) -> &str {
        self.first_name.as_str()
    }

    /// Family name.
    pub fn last_name(&self) -> &str {
        self.last_name.as_str()
    }

    /// Contact and login email.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Chosen password.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
