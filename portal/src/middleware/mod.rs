//! Request middleware.
//!
//! Purpose: Define middleware components for request lifecycle concerns such as
//! tracing and navigation guarding.

pub mod route_guard;
pub mod trace;

pub use route_guard::RouteGuard;
pub use trace::{TRACE_ID_HEADER, Trace};
