//! View navigation seam.
//!
//! The client only needs two things from the host's router: where the user
//! currently is, and a way to send them somewhere else. Navigation is
//! infallible from the client's point of view.

use parking_lot::Mutex;
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Replace the current history entry instead of pushing a new one.
    pub replace_history: bool,
}

pub trait Navigator: Send + Sync {
    fn navigate_to(&self, url: &str, options: NavigateOptions);

    /// Path and query of the current view, if there is one.
    fn current_location(&self) -> Option<String>;
}

/// Build the login URL carrying `location` as an encoded `redirect` parameter.
pub fn login_redirect_url(login_route: &str, location: &str) -> String {
    let separator = if login_route.contains('?') { '&' } else { '?' };
    format!(
        "{login_route}{separator}redirect={}",
        urlencoding::encode(location)
    )
}

/// Navigator for hosts without a view to navigate: requests are logged and dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedNavigator;

impl Navigator for DetachedNavigator {
    fn navigate_to(&self, url: &str, options: NavigateOptions) {
        warn!(url, replace = options.replace_history, "navigation requested without a view");
    }

    fn current_location(&self) -> Option<String> {
        None
    }
}

/// In-memory history, for headless hosts and tests.
#[derive(Debug, Default)]
pub struct MemoryNavigator {
    history: Mutex<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            history: Mutex::new(vec![initial.into()]),
        }
    }

    /// Every location visited, oldest first. Replaced entries are gone.
    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }
}

impl Navigator for MemoryNavigator {
    fn navigate_to(&self, url: &str, options: NavigateOptions) {
        let mut history = self.history.lock();
        if options.replace_history {
            history.pop();
        }
        history.push(url.to_string());
    }

    fn current_location(&self) -> Option<String> {
        self.history.lock().last().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_parameter_is_encoded() {
        assert_eq!(
            login_redirect_url("/auth/login", "/reports?year=2024&q=a b"),
            "/auth/login?redirect=%2Freports%3Fyear%3D2024%26q%3Da%20b"
        );
        assert_eq!(
            login_redirect_url("/login?expired=1", "/"),
            "/login?expired=1&redirect=%2F"
        );
    }

    #[test]
    fn memory_navigator_push_and_replace() {
        let nav = MemoryNavigator::new("/home");
        nav.navigate_to("/settings", NavigateOptions::default());
        assert_eq!(nav.current_location().as_deref(), Some("/settings"));
        nav.navigate_to("/login", NavigateOptions { replace_history: true });
        assert_eq!(nav.history(), vec!["/home".to_string(), "/login".to_string()]);
    }

    #[test]
    fn detached_navigator_is_silent() {
        let nav = DetachedNavigator;
        nav.navigate_to("/anywhere", NavigateOptions::default());
        assert_eq!(nav.current_location(), None);
    }
}
