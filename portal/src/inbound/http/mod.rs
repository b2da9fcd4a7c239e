//! HTTP inbound adapter for the edge server.

pub mod health;
pub mod pages;

pub use health::{GuardRules, HealthState, live, ready};
pub use pages::{PageView, page};
