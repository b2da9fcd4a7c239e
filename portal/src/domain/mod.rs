//! Domain primitives, services and ports.
//!
//! Purpose: hold everything the portal knows about sessions, cases and
//! donations without reference to HTTP, files or cookies. Adapters in
//! `outbound` and `inbound` implement or drive the traits in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: the single error taxonomy every operation reports.
//! - Credential, Identity, LoginCredentials, RegisterCredentials: session
//!   values.
//! - SessionService / SessionContext: session lifecycle and the shared
//!   identity state.
//! - RouteTable / GuardDecision: navigation guard rules.
//! - DonationCase, FilterSpecification, FeedView, apply: the case feed.
//! - Donation, DonationFlow: donation submission.

pub mod amount;
pub mod auth;
pub mod case_catalogue;
pub mod credential;
pub mod donation;
pub mod donation_case;
pub mod donation_flow;
pub mod error;
pub mod feed;
pub mod identity;
pub mod ports;
pub mod route_guard;
pub mod session_context;
pub mod session_service;
pub mod trace_id;

pub use self::amount::{Amount, AmountValidationError};
pub use self::auth::{
    CredentialsValidationError, LoginCredentials, RegisterCredentials, RegistrationForm,
};
pub use self::case_catalogue::CaseCatalogue;
pub use self::credential::{Credential, CredentialValidationError};
pub use self::donation::{
    Donation, DonationMessage, DonationPreview, DonationReceipt, DonationValidationError,
    MAX_MESSAGE_CHARS, SUGGESTED_AMOUNTS, preview,
};
pub use self::donation_case::{
    CaseId, CaseValidationError, DonationCase, DonationCaseBuilder, Timestamp, Urgency,
};
pub use self::donation_flow::{DonationFlow, FlowState};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::feed::{FeedStats, FeedView, FilterSpecification, LoadOutcome, SortBy, apply};
pub use self::identity::{Identity, IdentityValidationError, UserId};
pub use self::route_guard::{
    DEFAULT_AUTH_ONLY_PREFIXES, DEFAULT_LANDING_PATH, DEFAULT_LOGIN_PATH,
    DEFAULT_PROTECTED_PREFIXES, GuardDecision, RoutePrefix, RouteTable, RouteTableError,
};
pub use self::session_context::{IdentityState, SessionContext};
pub use self::session_service::{
    APPLICATION_JSON, AUTHORIZATION, AuthHeaders, CONTENT_TYPE, SessionPorts, SessionService,
    auth_headers,
};
pub use self::trace_id::TraceId;
