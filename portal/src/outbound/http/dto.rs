//! Wire shapes for the REST API.
//!
//! Request DTOs borrow from validated domain values; response DTOs are
//! decoded first and then mapped into domain records in one pass.

use serde::{Deserialize, Serialize};

use crate::domain::ports::AuthGrant;
use crate::domain::{
    Amount, CaseId, Credential, Donation, Identity, LoginCredentials, RegisterCredentials,
};

#[derive(Debug, Serialize)]
pub(super) struct LoginRequestDto<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
}

impl<'a> From<&'a LoginCredentials> for LoginRequestDto<'a> {
    fn from(value: &'a LoginCredentials) -> Self {
        Self {
            email: value.email(),
            password: value.password(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RegisterRequestDto<'a> {
    pub(super) first_name: &'a str,
    pub(super) last_name: &'a str,
    pub(super) email: &'a str,
    pub(super) password: &'a str,
    pub(super) confirm_password: &'a str,
    pub(super) accept_terms: bool,
}

impl<'a> From<&'a RegisterCredentials> for RegisterRequestDto<'a> {
    /// Validated credentials already passed the confirmation and terms
    /// checks, so both are sent as satisfied.
    fn from(value: &'a RegisterCredentials) -> Self {
        Self {
            first_name: value.first_name(),
            last_name: value.last_name(),
            email: value.email(),
            password: value.password(),
            confirm_password: value.password(),
            accept_terms: true,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AuthResponseDto {
    pub(super) token: String,
    pub(super) user: Identity,
}

impl AuthResponseDto {
    pub(super) fn into_grant(self) -> Result<AuthGrant, String> {
        let credential = Credential::new(self.token).map_err(|err| err.to_string())?;
        Ok(AuthGrant {
            credential,
            identity: self.user,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DonationRequestDto<'a> {
    pub(super) case_id: &'a CaseId,
    pub(super) amount: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) message: Option<&'a str>,
}

impl<'a> From<&'a Donation> for DonationRequestDto<'a> {
    fn from(value: &'a Donation) -> Self {
        Self {
            case_id: value.case_id(),
            amount: value.amount(),
            message: value.message().map(AsRef::as_ref),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FavoriteResponseDto {
    pub(super) is_favorite: bool,
}
