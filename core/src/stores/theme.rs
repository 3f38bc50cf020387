//! Light/dark theme selection.
//!
//! An explicit choice is persisted under `theme` and sticks; without one the
//! theme follows the system dark-mode signal.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::observable::{Observable, Subscription};
use crate::storage::KeyValueStore;

/// Slot name an explicit theme choice is persisted under.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Parse a stored value. Anything but `light`/`dark` is no choice at all.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn from_system(prefers_dark: bool) -> Self {
        if prefers_dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Light/dark preference.
///
/// Follows the system's dark-mode signal until the user picks a theme
/// explicitly. Only explicit choices are persisted; once one exists,
/// `system_changed` is ignored until `use_system` drops it again.
pub struct ThemeState<S> {
    value: Observable<Theme>,
    storage: Arc<S>,
    explicit: AtomicBool,
}

impl<S: KeyValueStore> ThemeState<S> {
    pub fn new(storage: Arc<S>, system_prefers_dark: bool) -> Self {
        let stored = match storage.get_item(THEME_KEY) {
            Ok(value) => value.as_deref().and_then(Theme::parse),
            Err(e) => {
                warn!(error = %e, "failed to read stored theme");
                None
            }
        };
        let initial = stored.unwrap_or(Theme::from_system(system_prefers_dark));
        Self {
            value: Observable::new(initial),
            storage,
            explicit: AtomicBool::new(stored.is_some()),
        }
    }

    pub fn theme(&self) -> Theme {
        self.value.get()
    }

    pub fn is_explicit(&self) -> bool {
        self.explicit.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self, callback: impl Fn(&Theme) + Send + Sync + 'static) -> Subscription {
        self.value.subscribe(callback)
    }

    /// Record an explicit choice and stop following the system signal.
    pub fn set_explicit(&self, theme: Theme) {
        self.explicit.store(true, Ordering::SeqCst);
        if let Err(e) = self.storage.set_item(THEME_KEY, theme.as_str()) {
            warn!(error = %e, %theme, "failed to persist theme");
        }
        self.value.set(theme);
    }

    pub fn toggle(&self) -> Theme {
        let next = self.theme().toggled();
        self.set_explicit(next);
        next
    }

    /// Forget the explicit choice and follow the system again.
    pub fn use_system(&self, prefers_dark: bool) {
        self.explicit.store(false, Ordering::SeqCst);
        if let Err(e) = self.storage.remove_item(THEME_KEY) {
            warn!(error = %e, "failed to remove stored theme");
        }
        self.value.set(Theme::from_system(prefers_dark));
    }

    /// Feed a change of the system dark-mode signal.
    pub fn system_changed(&self, prefers_dark: bool) {
        if !self.is_explicit() {
            self.value.set(Theme::from_system(prefers_dark));
        }
    }
}

impl<S> fmt::Debug for ThemeState<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeState")
            .field("value", &self.value)
            .field("explicit", &self.explicit.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
