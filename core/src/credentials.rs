//! Bearer token storage.

use std::sync::Arc;

use tracing::warn;

use crate::error::StorageError;
use crate::storage::KeyValueStore;

/// Slot name the token is persisted under.
pub const TOKEN_KEY: &str = "auth_token";

/// Holds at most one bearer token. `set` overwrites, `clear` removes.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// `CredentialStore` over a persistent key-value slot.
#[derive(Debug)]
pub struct TokenStore<S> {
    storage: Arc<S>,
}

impl<S: KeyValueStore> TokenStore<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }
}

impl<S: KeyValueStore> CredentialStore for TokenStore<S> {
    /// A storage read failure reads as "no token".
    fn get(&self) -> Option<String> {
        match self.storage.get_item(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "failed to read stored token");
                None
            }
        }
    }

    /// An empty token clears the slot.
    fn set(&self, token: &str) -> Result<(), StorageError> {
        if token.is_empty() {
            return self.clear();
        }
        self.storage.set_item(TOKEN_KEY, token)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(TOKEN_KEY)
    }
}
