//! Tests for error construction, classification and serialisation.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
fn validation_constructor_sets_code() {
    let err = Error::validation("bad");
    assert_eq!(err.code(), ErrorCode::Validation);
    assert_eq!(err.to_string(), "bad");
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::Fetch, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
#[case(Some("invalid credentials".to_owned()), "invalid credentials")]
#[case(Some(String::new()), "login failed")]
#[case(None, "login failed")]
fn from_boundary_prefers_boundary_message(
    #[case] message: Option<String>,
    #[case] expected: &str,
) {
    let err = Error::from_boundary(ErrorCode::Auth, message, "login failed");
    assert_eq!(err.code(), ErrorCode::Auth);
    assert_eq!(err.message(), expected);
}

#[rstest]
#[case(ErrorCode::Validation, false)]
#[case(ErrorCode::Auth, false)]
#[case(ErrorCode::Fetch, true)]
#[case(ErrorCode::Donation, false)]
#[case(ErrorCode::Network, true)]
#[case(ErrorCode::Internal, false)]
fn only_fetch_and_network_failures_are_retryable(#[case] code: ErrorCode, #[case] retryable: bool) {
    assert_eq!(Error::new(code, "x").is_retryable(), retryable);
}

#[rstest]
fn serialises_code_in_snake_case() {
    let value = serde_json::to_value(Error::network("offline")).expect("serialise");
    assert_eq!(value, json!({ "code": "network", "message": "offline" }));
}

#[rstest]
fn deserialising_blank_message_fails() {
    let result: Result<Error, _> =
        serde_json::from_value(json!({ "code": "auth", "message": " " }));
    assert!(result.is_err());
}
