//! Edge server health checks.
//!
//! Liveness reports whether the process should keep running. Readiness
//! reports whether the route guard has a validated table to enforce, and
//! answers with that table so operators can see which rules are live.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{RoutePrefix, RouteTable};

/// Rules the guard enforces, as reported by the readiness check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardRules {
    /// Prefixes that need a session.
    pub protected: Vec<RoutePrefix>,
    /// Prefixes only anonymous visitors may open.
    pub auth_only: Vec<RoutePrefix>,
    /// Redirect target for anonymous visitors.
    pub login_path: String,
    /// Redirect target for signed-in visitors.
    pub landing_path: String,
}

impl From<&RouteTable> for GuardRules {
    fn from(table: &RouteTable) -> Self {
        Self {
            protected: table.protected_prefixes().to_vec(),
            auth_only: table.auth_only_prefixes().to_vec(),
            login_path: table.login_path().to_owned(),
            landing_path: table.landing_path().to_owned(),
        }
    }
}

/// Health state shared by the edge server workers.
#[derive(Debug, Default)]
pub struct HealthState {
    rules: OnceLock<GuardRules>,
    draining: AtomicBool,
}

impl HealthState {
    /// State with no guard installed yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the table the guard enforces. The first table wins; the edge
    /// server installs exactly one.
    pub fn guard_installed(&self, table: &RouteTable) {
        if self.rules.set(GuardRules::from(table)).is_err() {
            warn!("route guard already installed; keeping the first table");
        }
    }

    /// Stop reporting alive or ready so orchestrators drain the instance.
    pub fn begin_draining(&self) {
        self.draining.store(true, Ordering::Release);
    }

    /// Rules in force, once the server is ready.
    pub fn rules(&self) -> Option<&GuardRules> {
        if self.is_alive() {
            self.rules.get()
        } else {
            None
        }
    }

    /// Whether requests are being guarded.
    pub fn is_ready(&self) -> bool {
        self.rules().is_some()
    }

    /// Whether the process is not draining.
    pub fn is_alive(&self) -> bool {
        !self.draining.load(Ordering::Acquire)
    }
}

fn unavailable() -> HttpResponse {
    HttpResponse::ServiceUnavailable()
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish()
}

/// Readiness check. 200 with the guard rules once installed, 503 before or
/// while draining.
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    match state.rules() {
        Some(rules) => HttpResponse::Ok()
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .json(rules),
        None => unavailable(),
    }
}

/// Liveness check. 200 until draining starts.
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    if state.is_alive() {
        HttpResponse::Ok()
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    } else {
        unavailable()
    }
}
