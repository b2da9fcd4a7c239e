//! Inbound adapters that translate incoming requests into domain calls while
//! keeping framework details at the edge.
//!
//! The edge server's HTTP handlers live under [`http`]; the guard and trace
//! middleware wrapping them live in [`crate::middleware`].

pub mod http;
