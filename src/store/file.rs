//! File-backed credential store, so a CLI session survives between runs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use anyhow::{Context, Result};
use tracing::warn;

use super::{CredentialKey, CredentialStore};

/// Credential pair persisted as a JSON object keyed by storage name.
///
/// Reads are served from memory; every write is flushed to disk. A failed
/// flush is logged and the in-memory value stays authoritative.
pub struct FileStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Load the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("Corrupt credentials file {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read credentials file {}", path.display()))
            }
        };

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    fn persist(&self, values: &BTreeMap<String, String>) {
        if let Err(e) = write_json(&self.path, values) {
            warn!("Failed to persist credentials to {}: {e:#}", self.path.display());
        }
    }
}

/// Replace the file atomically: the new contents go to an owner-only temp
/// file next to `path`, which is then renamed over it.
fn write_json(path: &Path, values: &BTreeMap<String, String>) -> Result<()> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            std::fs::create_dir_all(parent)?;
            parent
        }
        None => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    serde_json::to_writer_pretty(&mut file, values)?;
    file.as_file().sync_all()?;
    file.persist(path)?;
    Ok(())
}

impl CredentialStore for FileStore {
    fn get(&self, key: CredentialKey) -> Option<String> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values.get(key.as_str()).cloned()
    }

    fn set(&self, key: CredentialKey, value: &str) {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.as_str().to_string(), value.to_string());
        self.persist(&values);
    }

    fn remove(&self, key: CredentialKey) {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        if values.remove(key.as_str()).is_some() {
            self.persist(&values);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nope.json")).unwrap();
        assert_eq!(store.get(CredentialKey::AccessToken), None);
        assert_eq!(store.get(CredentialKey::RefreshToken), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session").join("credentials.json");

        let store = FileStore::open(&path).unwrap();
        store.set(CredentialKey::AccessToken, "access-1");
        store.set(CredentialKey::RefreshToken, "refresh-1");
        store.remove(CredentialKey::AccessToken);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(CredentialKey::AccessToken), None);
        assert_eq!(
            reopened.get(CredentialKey::RefreshToken).as_deref(),
            Some("refresh-1")
        );

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"refreshToken\""));
    }

    #[cfg(unix)]
    #[test]
    fn test_credentials_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        let store = FileStore::open(&path).unwrap();
        store.set(CredentialKey::RefreshToken, "secret");

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_rewrite_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        let store = FileStore::open(&path).unwrap();
        store.set(CredentialKey::AccessToken, "a1");
        store.set(CredentialKey::AccessToken, "a2");
        store.remove(CredentialKey::AccessToken);

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("credentials.json")]);
        assert_eq!(FileStore::open(&path).unwrap().get(CredentialKey::AccessToken), None);
    }

    #[test]
    fn test_corrupt_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(FileStore::open(&path).is_err());
    }
}
