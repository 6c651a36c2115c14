//! Credential storage — the process-wide key-value medium holding the
//! access/refresh token pair.
//!
//! Every caller reads through [`CredentialStore`]; only a refresh episode
//! and the session layer (login/logout) write to it.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// The two keys the gateway ever reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    AccessToken,
    RefreshToken,
}

impl CredentialKey {
    /// Storage name of the key.
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKey::AccessToken => "accessToken",
            CredentialKey::RefreshToken => "refreshToken",
        }
    }
}

/// Shared key-value medium for the credential pair.
///
/// Implementations must give read-your-writes consistency; nothing else
/// about durability is assumed.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: CredentialKey) -> Option<String>;

    fn set(&self, key: CredentialKey, value: &str);

    fn remove(&self, key: CredentialKey);
}

/// Drop both credentials, ending the session.
pub fn clear_credentials(store: &dyn CredentialStore) {
    store.remove(CredentialKey::AccessToken);
    store.remove(CredentialKey::RefreshToken);
}
