//! The signed-in user.

use crate::observable::{Observable, Subscription};
use crate::types::{User, UserPatch};

/// The signed-in user, or `None` before login and after logout.
#[derive(Debug, Clone, Default)]
pub struct UserState {
    current: Observable<Option<User>>,
}

impl UserState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<User> {
        self.current.get()
    }

    pub fn set_user(&self, user: Option<User>) {
        self.current.set(user);
    }

    /// Merge `patch` into the current user. Does nothing (but still notifies)
    /// when nobody is signed in.
    pub fn patch_user(&self, patch: UserPatch) {
        self.current
            .update(|user| user.as_ref().map(|u| u.patched(&patch)));
    }

    pub fn subscribe(&self, callback: impl Fn(&Option<User>) + Send + Sync + 'static) -> Subscription {
        self.current.subscribe(callback)
    }

    pub fn observable(&self) -> &Observable<Option<User>> {
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User {
            id: Some(1),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
        }
    }

    #[test]
    fn patch_merges_into_current_user() {
        let state = UserState::new();
        state.set_user(Some(alice()));
        state.patch_user(UserPatch {
            name: Some("Alice B.".to_string()),
            ..UserPatch::default()
        });
        let user = state.current().unwrap();
        assert_eq!(user.name, "Alice B.");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.id, Some(1));
    }

    #[test]
    fn patch_without_user_stays_empty() {
        let state = UserState::new();
        state.patch_user(UserPatch {
            email: Some("x@y.z".to_string()),
            ..UserPatch::default()
        });
        assert_eq!(state.current(), None);
    }
}
