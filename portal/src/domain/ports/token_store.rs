//! Driven port for durable credential storage.
//!
//! The store is the source of truth for "is there a session". Reads are
//! synchronous so request guards and header builders never await.

use std::sync::{PoisonError, RwLock};

use crate::domain::Credential;

use super::define_port_error;

define_port_error! {
    /// Errors raised by token store adapters.
    pub enum TokenStoreError {
        /// The backing medium could not be written or removed.
        Io { message: String } => "token store I/O failed: {message}",
        /// A stored value could not be turned back into a credential.
        Corrupt { message: String } => "stored credential is unreadable: {message}",
    }
}

/// Holds at most one credential.
///
/// ## Invariants
/// - After `set(c)`, `get()` returns `Some(c)` until `clear()` or another
///   `set` replaces it.
/// - `clear()` on an empty store succeeds.
#[cfg_attr(test, mockall::automock)]
pub trait TokenStore: Send + Sync {
    /// Current credential, if any.
    fn get(&self) -> Option<Credential>;

    /// Replace the stored credential.
    fn set(&self, credential: &Credential) -> Result<(), TokenStoreError>;

    /// Forget the stored credential.
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// Process-local store for tests and fixture mode.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    slot: RwLock<Option<Credential>>,
}

impl InMemoryTokenStore {
    /// Store pre-seeded with `credential`.
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: RwLock::new(Some(credential)),
        }
    }
}

impl TokenStore for InMemoryTokenStore {
    fn get(&self) -> Option<Credential> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, credential: &Credential) -> Result<(), TokenStoreError> {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        self.slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn credential(token: &str) -> Credential {
        Credential::new(token).expect("token")
    }

    #[rstest]
    fn set_then_get_returns_the_latest_credential() {
        let store = InMemoryTokenStore::default();
        store.set(&credential("first")).expect("set");
        store.set(&credential("second")).expect("set");
        assert_eq!(store.get(), Some(credential("second")));
    }

    #[rstest]
    fn clear_is_idempotent() {
        let store = InMemoryTokenStore::with_credential(credential("t"));
        store.clear().expect("first clear");
        store.clear().expect("second clear");
        assert_eq!(store.get(), None);
    }
}
