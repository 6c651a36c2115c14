use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::{CredentialKey, CredentialStore};

/// In-process credential store. Lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<CredentialKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a credential pair.
    pub fn with_tokens(access: Option<&str>, refresh: Option<&str>) -> Self {
        let store = Self::new();
        if let Some(access) = access {
            store.set(CredentialKey::AccessToken, access);
        }
        if let Some(refresh) = refresh {
            store.set(CredentialKey::RefreshToken, refresh);
        }
        store
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: CredentialKey) -> Option<String> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values.get(&key).cloned()
    }

    fn set(&self, key: CredentialKey, value: &str) {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(key, value.to_string());
    }

    fn remove(&self, key: CredentialKey) {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::clear_credentials;

    #[test]
    fn test_read_your_writes() {
        let store = MemoryStore::new();
        assert_eq!(store.get(CredentialKey::AccessToken), None);

        store.set(CredentialKey::AccessToken, "a1");
        assert_eq!(store.get(CredentialKey::AccessToken).as_deref(), Some("a1"));

        store.set(CredentialKey::AccessToken, "a2");
        assert_eq!(store.get(CredentialKey::AccessToken).as_deref(), Some("a2"));
        assert_eq!(store.get(CredentialKey::RefreshToken), None);
    }

    #[test]
    fn test_clear_credentials() {
        let store = MemoryStore::with_tokens(Some("a"), Some("r"));
        clear_credentials(&store);
        assert_eq!(store.get(CredentialKey::AccessToken), None);
        assert_eq!(store.get(CredentialKey::RefreshToken), None);
    }
}
