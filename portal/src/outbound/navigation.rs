//! Navigator for headless runs: logs the redirect and remembers it.

use std::sync::{Mutex, PoisonError};

use tracing::info;

use crate::domain::ports::Navigator;

/// Records where the session last asked to send the user.
#[derive(Debug, Default)]
pub struct TracingNavigator {
    last: Mutex<Option<String>>,
}

impl TracingNavigator {
    /// Most recent redirect target.
    pub fn last_redirect(&self) -> Option<String> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for TracingNavigator {
    fn redirect(&self, path: &str) {
        info!(path, "navigating");
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(path.to_owned());
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn remembers_the_latest_redirect() {
        let navigator = TracingNavigator::default();
        assert_eq!(navigator.last_redirect(), None);
        navigator.redirect("/auth/login");
        navigator.redirect("/dashboard");
        assert_eq!(navigator.last_redirect().as_deref(), Some("/dashboard"));
    }
}
