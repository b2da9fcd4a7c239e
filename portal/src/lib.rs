//! Donation portal client core.
//!
//! The library holds the session lifecycle, navigation guard, case feed and
//! donation flow as a hexagonal core ([`domain`]) with driven adapters in
//! [`outbound`], the edge server's handlers in [`inbound`] and its request
//! middleware in [`middleware`].
#![deny(clippy::float_arithmetic)]
#![deny(clippy::cast_possible_truncation)]
#![deny(clippy::cast_precision_loss)]
#![deny(clippy::cast_sign_loss)]

pub mod config;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

pub use config::PortalSettings;
pub use middleware::Trace;
