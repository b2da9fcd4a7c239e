//! Driven port for moving the user to another page.

/// Sends the user to an application path.
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    /// Navigate to `path`, replacing the current page.
    fn redirect(&self, path: &str);
}

/// Navigator that ignores redirects.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNavigator;

impl Navigator for FixtureNavigator {
    fn redirect(&self, _path: &str) {}
}
