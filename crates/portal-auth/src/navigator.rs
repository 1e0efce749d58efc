//! Navigation hook used when a session ends.

/// Route the host application shows when it has no session.
pub const LOGIN_PATH: &str = "/login";

/// Moves the host application to another screen.
///
/// Any `Fn(&str)` closure is a navigator.
pub trait Navigator: Send + Sync {
    /// Navigate to `path`.
    fn navigate(&self, path: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate(&self, path: &str) {
        self(path)
    }
}

/// Navigator for headless hosts; only records the request in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, path: &str) {
        tracing::info!(path, "Navigation requested");
    }
}
