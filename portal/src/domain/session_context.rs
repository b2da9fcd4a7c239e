//! Process-wide view of who is signed in.
//!
//! The context starts `Unknown` and settles on `Anonymous` or
//! `Authenticated` once [`SessionContext::initialise`] has consulted the
//! token store and, when a credential exists, the auth boundary. Consumers
//! subscribe to a `watch` channel and read snapshots; only the context
//! writes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{Error, Identity, LoginCredentials, RegisterCredentials, SessionService};

/// Identity as currently known to the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityState {
    /// Initialisation has not finished.
    Unknown,
    /// No valid session.
    Anonymous,
    /// Signed in as this identity.
    Authenticated(Identity),
}

impl IdentityState {
    /// Whether the state is still being resolved.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Whether a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// The signed-in identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            Self::Unknown | Self::Anonymous => None,
        }
    }
}

/// Shared identity state derived from the session service.
pub struct SessionContext {
    session: Arc<SessionService>,
    state: watch::Sender<IdentityState>,
    initialised: AtomicBool,
}

impl SessionContext {
    /// Context in the `Unknown` state.
    pub fn new(session: Arc<SessionService>) -> Self {
        let (state, _) = watch::channel(IdentityState::Unknown);
        Self {
            session,
            state,
            initialised: AtomicBool::new(false),
        }
    }

    /// Resolve the initial identity. Runs once; later calls return the
    /// current snapshot.
    ///
    /// A stored credential that the boundary will not resolve, for any
    /// reason, is discarded and the context becomes `Anonymous`. A login,
    /// registration or logout that lands while the boundary call is pending
    /// wins: the checked credential is only discarded if it is still the
    /// stored one, and the result is only published while the state is
    /// still `Unknown`.
    pub async fn initialise(&self) -> IdentityState {
        if self.initialised.swap(true, Ordering::AcqRel) {
            return self.snapshot();
        }
        let resolved = match self.session.credential() {
            None => IdentityState::Anonymous,
            Some(checked) => match self.session.identify(&checked).await {
                Ok(identity) => {
                    self.session.restore_mirror();
                    info!(user_id = %identity.id(), "session restored");
                    IdentityState::Authenticated(identity)
                }
                Err(err) => {
                    warn!(error = %err, "stored session rejected; signing out");
                    if let Err(clear_err) = self.session.invalidate_if_current(&checked) {
                        warn!(error = %clear_err, "failed to discard rejected credential");
                    }
                    IdentityState::Anonymous
                }
            },
        };
        self.settle(resolved)
    }

    fn settle(&self, resolved: IdentityState) -> IdentityState {
        let published = self.state.send_if_modified(|state| {
            if state.is_loading() {
                *state = resolved;
                true
            } else {
                false
            }
        });
        if !published {
            debug!("session changed during initialisation; keeping the newer state");
        }
        self.snapshot()
    }

    /// Sign in and publish the identity.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Identity, Error> {
        let identity = self.session.login(credentials).await?;
        self.publish(&identity);
        Ok(identity)
    }

    /// Register and publish the new identity.
    pub async fn register(&self, credentials: &RegisterCredentials) -> Result<Identity, Error> {
        let identity = self.session.register(credentials).await?;
        self.publish(&identity);
        Ok(identity)
    }

    fn publish(&self, identity: &Identity) {
        self.initialised.store(true, Ordering::Release);
        self.state
            .send_replace(IdentityState::Authenticated(identity.clone()));
    }

    /// Sign out. The identity is cleared even if the credential could not
    /// be removed from storage.
    pub fn logout(&self) -> Result<(), Error> {
        let result = self.session.logout();
        self.initialised.store(true, Ordering::Release);
        self.state.send_replace(IdentityState::Anonymous);
        result
    }

    /// Receiver observing every state change.
    pub fn subscribe(&self) -> watch::Receiver<IdentityState> {
        self.state.subscribe()
    }

    /// Current state.
    pub fn snapshot(&self) -> IdentityState {
        self.state.borrow().clone()
    }

    /// Current identity, if signed in.
    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity().cloned()
    }

    /// Whether a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Whether initialisation is still pending.
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    /// The underlying session service.
    pub fn session(&self) -> &SessionService {
        &self.session
    }
}
