//! Behaviour tests for the session lifecycle.
//!
//! These scenarios wire the session context to the file-backed token store,
//! the cookie-jar mirror and the fixture auth boundary, then check that
//! login, logout and restarts keep all three views of the session in step.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

use std::cell::RefCell;
use std::sync::Arc;

use portal::domain::ports::{
    FIXTURE_EMAIL, FIXTURE_PASSWORD, FIXTURE_TOKEN, FixtureAuthGateway, TokenStore,
};
use portal::domain::{
    Credential, DEFAULT_LOGIN_PATH, Error, ErrorCode, LoginCredentials, SessionContext,
    SessionPorts, SessionService,
};
use portal::outbound::{CookieJarMirror, DEFAULT_COOKIE_NAME, FileTokenStore, TracingNavigator};
use reqwest::cookie::Jar;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;
use tokio::runtime::Runtime;
use url::Url;

const EDGE_ORIGIN: &str = "http://127.0.0.1:3000/";

struct SessionWorld {
    runtime: Runtime,
    token_dir: TempDir,
    jar: RefCell<Arc<Jar>>,
    navigator: RefCell<Arc<TracingNavigator>>,
    context: RefCell<Option<SessionContext>>,
    last_error: RefCell<Option<Error>>,
}

impl SessionWorld {
    fn new() -> Self {
        Self {
            runtime: tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("runtime"),
            token_dir: TempDir::new().expect("token dir"),
            jar: RefCell::new(Arc::new(Jar::default())),
            navigator: RefCell::new(Arc::new(TracingNavigator::default())),
            context: RefCell::new(None),
            last_error: RefCell::new(None),
        }
    }

    fn scope() -> Url {
        Url::parse(EDGE_ORIGIN).expect("scope url")
    }

    fn store(&self) -> FileTokenStore {
        FileTokenStore::open(self.token_dir.path()).expect("open token store")
    }

    fn mirror(&self) -> CookieJarMirror {
        CookieJarMirror::new(self.jar.borrow().clone(), Self::scope(), DEFAULT_COOKIE_NAME)
    }

    /// Start a fresh process: new cookie jar, new navigator, same disk.
    fn boot(&self) {
        *self.jar.borrow_mut() = Arc::new(Jar::default());
        *self.navigator.borrow_mut() = Arc::new(TracingNavigator::default());
        let navigator = self.navigator.borrow().clone();
        let session = SessionService::new(
            SessionPorts {
                store: Arc::new(self.store()),
                mirror: Arc::new(self.mirror()),
                gateway: Arc::new(FixtureAuthGateway),
                navigator,
            },
            DEFAULT_LOGIN_PATH,
        );
        *self.context.borrow_mut() = Some(SessionContext::new(Arc::new(session)));
    }

    fn with_context<R>(&self, f: impl FnOnce(&SessionContext) -> R) -> R {
        let context = self.context.borrow();
        f(context.as_ref().expect("session context booted"))
    }

    fn login(&self, email: &str, password: &str) {
        let credentials = LoginCredentials::try_from_parts(email, password).expect("credentials");
        let result = self.with_context(|context| self.runtime.block_on(context.login(&credentials)));
        *self.last_error.borrow_mut() = result.err();
    }

    fn initialise(&self) {
        self.with_context(|context| self.runtime.block_on(context.initialise()));
    }
}

#[fixture]
fn world() -> SessionWorld {
    SessionWorld::new()
}

#[given("an anonymous portal session")]
fn an_anonymous_portal_session(world: &SessionWorld) {
    world.boot();
    world.initialise();
}

#[given("a signed-in portal session")]
fn a_signed_in_portal_session(world: &SessionWorld) {
    world.boot();
    world.login(FIXTURE_EMAIL, FIXTURE_PASSWORD);
    assert!(world.last_error.borrow().is_none(), "demo login should succeed");
}

#[given("a stored credential the boundary no longer accepts")]
fn a_stale_stored_credential(world: &SessionWorld) {
    world
        .store()
        .set(&Credential::new("expired-token").expect("credential"))
        .expect("seed credential");
    world.boot();
}

#[when("the user logs in with the demo account")]
fn the_user_logs_in_with_the_demo_account(world: &SessionWorld) {
    world.login(FIXTURE_EMAIL, FIXTURE_PASSWORD);
}

#[when("the user logs in with a wrong password")]
fn the_user_logs_in_with_a_wrong_password(world: &SessionWorld) {
    world.login(FIXTURE_EMAIL, "not-the-password");
}

#[when("the user logs out")]
fn the_user_logs_out(world: &SessionWorld) {
    world
        .with_context(SessionContext::logout)
        .expect("logout should succeed");
}

#[when("the portal restarts over the same token directory")]
fn the_portal_restarts(world: &SessionWorld) {
    world.boot();
    world.initialise();
}

#[when("the session context initialises")]
fn the_session_context_initialises(world: &SessionWorld) {
    world.initialise();
}

#[then("the stored credential is the fixture token")]
fn the_stored_credential_is_the_fixture_token(world: &SessionWorld) {
    let stored = world.store().get().expect("stored credential");
    assert_eq!(stored.expose(), FIXTURE_TOKEN);
}

#[then("no credential is stored")]
fn no_credential_is_stored(world: &SessionWorld) {
    assert_eq!(world.store().get(), None);
    assert!(!world.with_context(|context| context.session().is_authenticated()));
}

#[then("the cookie jar carries the fixture token")]
fn the_cookie_jar_carries_the_fixture_token(world: &SessionWorld) {
    assert_eq!(world.mirror().current().as_deref(), Some(FIXTURE_TOKEN));
}

#[then("the cookie jar carries no credential")]
fn the_cookie_jar_carries_no_credential(world: &SessionWorld) {
    assert_eq!(world.mirror().current(), None);
}

#[then("the published identity is the demo user")]
fn the_published_identity_is_the_demo_user(world: &SessionWorld) {
    let identity = world
        .with_context(SessionContext::identity)
        .expect("published identity");
    assert_eq!(identity.email(), FIXTURE_EMAIL);
    assert!(!world.with_context(SessionContext::is_loading));
}

#[then("no identity is published")]
fn no_identity_is_published(world: &SessionWorld) {
    assert_eq!(world.with_context(SessionContext::identity), None);
    assert!(!world.with_context(SessionContext::is_authenticated));
    assert!(!world.with_context(SessionContext::is_loading));
}

#[then("the user was sent to the login page")]
fn the_user_was_sent_to_the_login_page(world: &SessionWorld) {
    assert_eq!(
        world.navigator.borrow().last_redirect().as_deref(),
        Some(DEFAULT_LOGIN_PATH)
    );
}

#[then("the last error is an auth error")]
fn the_last_error_is_an_auth_error(world: &SessionWorld) {
    let error = world.last_error.borrow().clone().expect("login error");
    assert_eq!(error.code(), ErrorCode::Auth);
    assert_eq!(error.message(), "invalid credentials");
}

#[scenario(
    path = "tests/features/session_lifecycle.feature",
    name = "Logging in stores, mirrors and publishes the session"
)]
fn logging_in_stores_mirrors_and_publishes_the_session(world: SessionWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_lifecycle.feature",
    name = "Logging out clears the credential and the identity"
)]
fn logging_out_clears_the_credential_and_the_identity(world: SessionWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_lifecycle.feature",
    name = "A session survives a restart"
)]
fn a_session_survives_a_restart(world: SessionWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_lifecycle.feature",
    name = "A stale stored credential is discarded on start-up"
)]
fn a_stale_stored_credential_is_discarded_on_start_up(world: SessionWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_lifecycle.feature",
    name = "A rejected login leaves the session anonymous"
)]
fn a_rejected_login_leaves_the_session_anonymous(world: SessionWorld) {
    drop(world);
}
