//! Shared reqwest plumbing for the REST API adapters.
//!
//! The client owns transport details only: endpoint construction, header
//! injection, timeouts and turning non-2xx answers into [`ApiFailure`].
//! Each adapter maps `ApiFailure` onto its own port error.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::{Credential, auth_headers};

/// Errors raised while building an [`ApiClient`].
#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    /// The base URL cannot have path segments appended.
    #[error("API base URL '{0}' cannot carry a path")]
    InvalidBaseUrl(String),
    /// reqwest refused the client configuration.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// A call that did not produce a usable 2xx body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ApiFailure {
    /// The request never completed.
    Transport(String),
    /// The API answered with a non-2xx status.
    Status {
        status: StatusCode,
        message: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct ErrorBodyDto {
    #[serde(default)]
    message: Option<String>,
}

/// reqwest client bound to one API base URL.
///
/// Calls authenticate with the bearer header only; the client keeps no
/// cookie store.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    /// Build a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when `base` cannot carry path segments or the
    /// reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, ApiClientError> {
        if base.cannot_be_a_base() {
            return Err(ApiClientError::InvalidBaseUrl(base.to_string()));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `base` with `segments` appended, each percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Request carrying the JSON content type and, when given, the bearer
    /// token.
    pub(crate) fn request(
        &self,
        method: Method,
        url: Url,
        credential: Option<&Credential>,
    ) -> RequestBuilder {
        auth_headers(credential)
            .into_iter()
            .fold(self.client.request(method, url), |builder, (name, value)| {
                builder.header(name, value)
            })
    }

    /// Send `request` and return the body of a 2xx answer.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, ApiFailure> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let url = response.url().path().to_owned();
        let body = response.bytes().await.map_err(map_transport_error)?.to_vec();
        if status.is_success() {
            return Ok(body);
        }
        debug!(%status, path = %url, body = %body_preview(&body), "API call rejected");
        Err(map_status_error(status, &body))
    }
}

/// Decode a JSON body into `T`.
pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, String> {
    serde_json::from_slice(body)
        .map_err(|error| format!("invalid JSON payload: {error}; body: {}", body_preview(body)))
}

pub(crate) fn map_transport_error(error: reqwest::Error) -> ApiFailure {
    if error.is_timeout() {
        ApiFailure::Transport(format!("request timed out: {error}"))
    } else {
        ApiFailure::Transport(error.to_string())
    }
}

/// Non-2xx answer carrying the `message` field of a JSON error body.
///
/// Bodies that are not JSON, or whose message is blank, yield `None` so the
/// caller falls back to its own text.
pub(crate) fn map_status_error(status: StatusCode, body: &[u8]) -> ApiFailure {
    let message = serde_json::from_slice::<ErrorBodyDto>(body)
        .ok()
        .and_then(|dto| dto.message)
        .map(|message| message.trim().to_owned())
        .filter(|message| !message.is_empty());
    ApiFailure::Status { status, message }
}

pub(crate) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network client helpers.

    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn client() -> ApiClient {
        ApiClient::new(
            Url::parse("http://localhost:8080/api/").expect("url"),
            Duration::from_secs(5),
        )
        .expect("client")
    }

    #[rstest]
    fn endpoints_append_encoded_segments(client: ApiClient) {
        assert_eq!(
            client.endpoint(&["cases", "a b", "favorite"]).as_str(),
            "http://localhost:8080/api/cases/a%20b/favorite"
        );
    }

    #[rstest]
    fn base_without_trailing_slash_still_nests() {
        let client = ApiClient::new(
            Url::parse("http://localhost:8080/api").expect("url"),
            Duration::from_secs(5),
        )
        .expect("client");
        assert_eq!(
            client.endpoint(&["auth", "me"]).as_str(),
            "http://localhost:8080/api/auth/me"
        );
    }

    #[rstest]
    fn opaque_base_urls_are_rejected() {
        let result = ApiClient::new(
            Url::parse("mailto:ops@portal.test").expect("url"),
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(ApiClientError::InvalidBaseUrl(_))));
    }

    #[rstest]
    #[case(br#"{"message":"amount must be positive"}"#.as_slice(), Some("amount must be positive"))]
    #[case(br#"{"message":"   "}"#.as_slice(), None)]
    #[case(br#"{"error":"nope"}"#.as_slice(), None)]
    #[case(b"<html>502</html>".as_slice(), None)]
    fn status_errors_surface_the_body_message(
        #[case] body: &[u8],
        #[case] expected: Option<&str>,
    ) {
        let failure = map_status_error(StatusCode::BAD_REQUEST, body);
        assert_eq!(
            failure,
            ApiFailure::Status {
                status: StatusCode::BAD_REQUEST,
                message: expected.map(str::to_owned),
            }
        );
    }

    #[rstest]
    fn previews_are_compacted_and_truncated() {
        let body = format!("  a\n\n b {}", "x".repeat(200));
        let preview = body_preview(body.as_bytes());
        assert!(preview.starts_with("a b x"));
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 163);
    }

    #[rstest]
    fn decode_errors_include_a_preview() {
        let err = decode::<Vec<u32>>(b"not json").expect_err("invalid");
        assert!(err.contains("not json"));
    }
}
