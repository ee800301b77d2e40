//! Token Persistence
//!
//! The session layer persists the access token through a [`TokenStore`] so
//! a client can resume an authenticated session without logging in again.
//! The trait is the seam; [`MemoryTokenStore`] is the in-process default,
//! and platform layers supply durable implementations (keychain, secure
//! preferences) behind the same interface.

use std::collections::HashMap;

use parking_lot::RwLock;

/// Storage key under which the access token is persisted.
pub const ACCESS_TOKEN_KEY: &str = "remoting.accessToken";

/// Key/value persistence for opaque token strings.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn clear(&self, key: &str);
}

/// In-memory [`TokenStore`]; tokens live as long as the store does.
#[derive(Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
    }

    fn clear(&self, key: &str) {
        self.entries.write().remove(key);
    }
}
