//! REST API adapters.
//!
//! One shared [`ApiClient`] owns the reqwest client and cookie jar; the
//! auth and case adapters translate its failures into their port errors.

mod auth_gateway;
mod case_repository;
mod client;
mod dto;

pub use auth_gateway::HttpAuthGateway;
pub use case_repository::HttpCaseRepository;
pub use client::{ApiClient, ApiClientError};
