//! Credential mirror backed by a reqwest cookie jar.
//!
//! The jar is scoped to the edge server origin and holds the cookie a
//! browser-facing client presents to the route guard. It is never handed to
//! the API client, so the credential reaches the REST API only as a bearer
//! header. The jar lives as long as the process; [`CookieJarMirror::cookie_header`]
//! is how a caller carries the cookie to an edge request.

use std::sync::Arc;

use reqwest::Url;
use reqwest::cookie::{CookieStore, Jar};
use tracing::debug;

use crate::domain::Credential;
use crate::domain::ports::CredentialMirror;

/// Default credential cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "token";

/// Writes the credential into a cookie scoped to the edge origin.
#[derive(Debug, Clone)]
pub struct CookieJarMirror {
    jar: Arc<Jar>,
    scope: Url,
    cookie_name: String,
}

impl CookieJarMirror {
    /// Mirror writing `cookie_name` for `scope` into `jar`.
    pub fn new(jar: Arc<Jar>, scope: Url, cookie_name: impl Into<String>) -> Self {
        Self {
            jar,
            scope,
            cookie_name: cookie_name.into(),
        }
    }

    /// Name of the mirrored cookie.
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Origin the cookie is scoped to.
    pub fn scope(&self) -> &Url {
        &self.scope
    }

    /// Value the jar would currently send, if any.
    pub fn current(&self) -> Option<String> {
        let header = self.jar.cookies(&self.scope)?;
        let header = header.to_str().ok()?;
        cookie_value(header, &self.cookie_name).map(str::to_owned)
    }

    /// `name=value` pair to send in a `Cookie` header to the edge server.
    pub fn cookie_header(&self) -> Option<String> {
        self.current()
            .map(|value| format!("{}={value}", self.cookie_name))
    }
}

/// Value of `name` within a `Cookie` header. Empty values count as absent.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

impl CredentialMirror for CookieJarMirror {
    fn mirror(&self, credential: &Credential) {
        let cookie = format!(
            "{}={}; Path=/; SameSite=Lax",
            self.cookie_name,
            credential.expose()
        );
        self.jar.add_cookie_str(&cookie, &self.scope);
        debug!(cookie = %self.cookie_name, credential = %credential.fingerprint(), "credential mirrored");
    }

    fn clear(&self) {
        let cookie = format!("{}=; Path=/; Max-Age=0", self.cookie_name);
        self.jar.add_cookie_str(&cookie, &self.scope);
        debug!(cookie = %self.cookie_name, "credential mirror cleared");
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn mirror() -> CookieJarMirror {
        CookieJarMirror::new(
            Arc::new(Jar::default()),
            Url::parse("http://127.0.0.1:3000/").expect("url"),
            DEFAULT_COOKIE_NAME,
        )
    }

    #[rstest]
    fn mirrored_credentials_are_readable_back(mirror: CookieJarMirror) {
        mirror.mirror(&Credential::new("abc").expect("token"));
        assert_eq!(mirror.current().as_deref(), Some("abc"));
    }

    #[rstest]
    fn cookie_headers_name_the_mirrored_cookie(mirror: CookieJarMirror) {
        assert_eq!(mirror.cookie_header(), None);
        mirror.mirror(&Credential::new("abc").expect("token"));
        assert_eq!(mirror.cookie_header().as_deref(), Some("token=abc"));
    }

    #[rstest]
    fn other_origins_never_see_the_cookie(mirror: CookieJarMirror) {
        mirror.mirror(&Credential::new("abc").expect("token"));
        let api = Url::parse("http://api.portal.test/").expect("url");
        assert!(mirror.jar.cookies(&api).is_none());
    }

    #[rstest]
    fn clearing_expires_the_cookie(mirror: CookieJarMirror) {
        mirror.mirror(&Credential::new("abc").expect("token"));
        mirror.clear();
        assert_eq!(mirror.current(), None);
    }

    #[rstest]
    #[case("token=abc", Some("abc"))]
    #[case("theme=dark; token=abc", Some("abc"))]
    #[case("theme=dark;token= abc ", Some("abc"))]
    #[case("token=", None)]
    #[case("tokens=abc", None)]
    #[case("", None)]
    fn cookie_values_are_found_by_exact_name(
        #[case] header: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(cookie_value(header, "token"), expected);
    }
}
