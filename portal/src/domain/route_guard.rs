//! Navigation guard: which paths need a session and which must not have one.
//!
//! [`RouteTable::decide`] is a pure function of the request path and whether
//! the credential cookie is present. Prefixes match whole path segments, so
//! `/dashboard` covers `/dashboard` and `/dashboard/settings` but not
//! `/dashboards`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default prefixes that require a session.
pub const DEFAULT_PROTECTED_PREFIXES: [&str; 3] = ["/dashboard", "/profile", "/donations"];
/// Default prefixes only anonymous visitors may open.
pub const DEFAULT_AUTH_ONLY_PREFIXES: [&str; 2] = ["/auth/login", "/auth/register"];
/// Default login entry point.
pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";
/// Default landing page after authentication.
pub const DEFAULT_LANDING_PATH: &str = "/dashboard";

/// Errors raised while building a [`RouteTable`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteTableError {
    /// A prefix or path did not start with `/`.
    #[error("route '{0}' must start with '/'")]
    NotAbsolute(String),
    /// The login page is itself protected, so anonymous users could never
    /// reach it.
    #[error("login path '{0}' must not be protected")]
    ProtectedLogin(String),
    /// The landing page is auth-only, so signed-in users would bounce.
    #[error("landing path '{0}' must not be auth-only")]
    AuthOnlyLanding(String),
}

/// Normalised path prefix.
///
/// Always absolute; trailing slashes are removed except for the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoutePrefix(String);

impl RoutePrefix {
    /// Validate and normalise a prefix.
    pub fn new(raw: &str) -> Result<Self, RouteTableError> {
        let trimmed = raw.trim();
        if !trimmed.starts_with('/') {
            return Err(RouteTableError::NotAbsolute(raw.to_owned()));
        }
        let normalised = trimmed.trim_end_matches('/');
        Ok(Self(if normalised.is_empty() {
            "/".to_owned()
        } else {
            normalised.to_owned()
        }))
    }

    /// Whether `path` equals this prefix or continues it at a `/`.
    pub fn matches(&self, path: &str) -> bool {
        if self.0 == "/" {
            return path.starts_with('/');
        }
        path.strip_prefix(self.0.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }
}

impl fmt::Display for RoutePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<RoutePrefix> for String {
    fn from(value: RoutePrefix) -> Self {
        value.0
    }
}

impl TryFrom<String> for RoutePrefix {
    type Error = RouteTableError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

/// Outcome of a guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Serve the request unchanged.
    Allow,
    /// Send the visitor elsewhere.
    Redirect {
        /// Target path.
        location: String,
    },
}

/// Route classification used by the guard.
///
/// # Examples
/// ```
/// use portal::domain::{GuardDecision, RouteTable};
///
/// let table = RouteTable::default();
/// assert_eq!(
///     table.decide("/dashboard", false),
///     GuardDecision::Redirect { location: "/auth/login".into() }
/// );
/// assert_eq!(
///     table.decide("/auth/login", true),
///     GuardDecision::Redirect { location: "/dashboard".into() }
/// );
/// assert_eq!(table.decide("/feed", false), GuardDecision::Allow);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    protected: Vec<RoutePrefix>,
    auth_only: Vec<RoutePrefix>,
    login_path: String,
    landing_path: String,
}

fn parse_all<'a>(
    prefixes: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<RoutePrefix>, RouteTableError> {
    prefixes
        .into_iter()
        .filter(|raw| !raw.trim().is_empty())
        .map(RoutePrefix::new)
        .collect()
}

impl RouteTable {
    /// Build and validate a table.
    pub fn try_new<'a>(
        protected: impl IntoIterator<Item = &'a str>,
        auth_only: impl IntoIterator<Item = &'a str>,
        login_path: &str,
        landing_path: &str,
    ) -> Result<Self, RouteTableError> {
        let login = RoutePrefix::new(login_path)?;
        let landing = RoutePrefix::new(landing_path)?;
        let table = Self {
            protected: parse_all(protected)?,
            auth_only: parse_all(auth_only)?,
            login_path: login.into(),
            landing_path: landing.into(),
        };
        if table.is_protected(&table.login_path) {
            return Err(RouteTableError::ProtectedLogin(table.login_path));
        }
        if table.is_auth_only(&table.landing_path) {
            return Err(RouteTableError::AuthOnlyLanding(table.landing_path));
        }
        Ok(table)
    }

    /// Whether `path` needs a session.
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected.iter().any(|prefix| prefix.matches(path))
    }

    /// Whether `path` is only for anonymous visitors.
    pub fn is_auth_only(&self, path: &str) -> bool {
        self.auth_only.iter().any(|prefix| prefix.matches(path))
    }

    /// Prefixes that need a session.
    pub fn protected_prefixes(&self) -> &[RoutePrefix] {
        &self.protected
    }

    /// Prefixes only anonymous visitors may open.
    pub fn auth_only_prefixes(&self) -> &[RoutePrefix] {
        &self.auth_only
    }

    /// Login entry point.
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Landing page for signed-in users.
    pub fn landing_path(&self) -> &str {
        &self.landing_path
    }

    /// Decide what to do with a navigation to `path`.
    pub fn decide(&self, path: &str, has_credential: bool) -> GuardDecision {
        if !has_credential && self.is_protected(path) {
            return GuardDecision::Redirect {
                location: self.login_path.clone(),
            };
        }
        if has_credential && self.is_auth_only(path) {
            return GuardDecision::Redirect {
                location: self.landing_path.clone(),
            };
        }
        GuardDecision::Allow
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            protected: DEFAULT_PROTECTED_PREFIXES
                .iter()
                .map(|prefix| RoutePrefix((*prefix).to_owned()))
                .collect(),
            auth_only: DEFAULT_AUTH_ONLY_PREFIXES
                .iter()
                .map(|prefix| RoutePrefix((*prefix).to_owned()))
                .collect(),
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            landing_path: DEFAULT_LANDING_PATH.to_owned(),
        }
    }
}
