//! Permission and role state, with derived per-permission views.

use crate::observable::Observable;

/// Permission and role names granted to the signed-in user.
#[derive(Debug, Clone, Default)]
pub struct AccessState {
    permissions: Observable<Vec<String>>,
    roles: Observable<Vec<String>>,
}

impl AccessState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` resets to no permissions.
    pub fn set_permissions(&self, permissions: Option<Vec<String>>) {
        self.permissions.set(permissions.unwrap_or_default());
    }

    pub fn set_roles(&self, roles: Option<Vec<String>>) {
        self.roles.set(roles.unwrap_or_default());
    }

    pub fn permissions(&self) -> &Observable<Vec<String>> {
        &self.permissions
    }

    pub fn roles(&self) -> &Observable<Vec<String>> {
        &self.roles
    }

    /// Live view of whether `permission` is currently granted. It stops
    /// tracking once every handle to it is dropped.
    pub fn has_permission(&self, permission: &str) -> Observable<bool> {
        let permission = permission.to_string();
        self.permissions.map(move |granted| granted.contains(&permission))
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.get().iter().any(|r| r == role)
    }

    pub fn clear(&self) {
        self.set_permissions(None);
        self.set_roles(None);
    }
}
