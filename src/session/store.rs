//! Session token persistence
//!
//! A [`TokenStore`] holds at most one opaque token string under a fixed key.
//! Three stores are provided:
//!
//! - [`FileTokenStore`]: a file named after the key inside a per-user
//!   session directory (the runtime dir when the platform has one, so the
//!   token goes away with the login session).
//! - [`KeyringTokenStore`]: the OS native credential store (Keychain on
//!   macOS, Secret Service on Linux, Windows Credential Manager on Windows).
//! - [`MemoryTokenStore`]: process memory only.
//!
//! Stores report failures; the session controller decides whether a
//! failure matters.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use directories::ProjectDirs;

use crate::config::{SessionConfig, TokenStoreKind};
use crate::error::{CitechatError, Result};

/// Keyring service name used by [`KeyringTokenStore`]
pub const KEYRING_SERVICE: &str = "citechat";

/// Persistence for a single session token
pub trait TokenStore: Send + Sync {
    /// Reads the stored token
    ///
    /// # Returns
    ///
    /// `Ok(None)` when nothing is stored
    fn load(&self) -> Result<Option<String>>;

    /// Stores `token`, replacing any previous one
    fn save(&self, token: &str) -> Result<()>;

    /// Removes the stored token; a no-op when nothing is stored
    fn clear(&self) -> Result<()>;
}

// ---------------------------------------------------------------------------
// FileTokenStore
// ---------------------------------------------------------------------------

/// Token kept in a file inside a session directory
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Creates a store for `key` inside `dir`
    ///
    /// The directory is created lazily on the first save.
    ///
    /// # Examples
    ///
    /// ```
    /// use citechat::session::store::{FileTokenStore, TokenStore};
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = FileTokenStore::new(dir.path(), "token");
    /// store.save("abc").unwrap();
    /// assert_eq!(store.load().unwrap(), Some("abc".to_string()));
    /// ```
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(key),
        }
    }

    /// Creates a store for `key` inside the default per-user session directory
    ///
    /// # Errors
    ///
    /// Returns [`CitechatError::Storage`] when no home directory can be
    /// determined
    pub fn in_default_dir(key: &str) -> Result<Self> {
        Ok(Self::new(default_session_dir()?, key))
    }

    /// Location of the token file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim_end_matches(&['\r', '\n'][..]);
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token.to_string()))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CitechatError::Io(e).into()),
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create session directory")
                .map_err(|e| CitechatError::Storage(e.to_string()))?;
        }
        std::fs::write(&self.path, token)
            .context("Failed to write session token")
            .map_err(|e| CitechatError::Storage(e.to_string()))?;
        restrict_permissions(&self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CitechatError::Io(e).into()),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .context("Failed to restrict session token permissions")
        .map_err(|e| CitechatError::Storage(e.to_string()))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

/// Default directory for session state
///
/// Prefers the runtime directory, which the OS empties at logout, and falls
/// back to the cache directory on platforms without one.
pub fn default_session_dir() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "citechat", "citechat")
        .ok_or_else(|| CitechatError::Storage("Could not determine session directory".into()))?;
    Ok(proj_dirs
        .runtime_dir()
        .unwrap_or_else(|| proj_dirs.cache_dir())
        .join("session"))
}

// ---------------------------------------------------------------------------
// KeyringTokenStore
// ---------------------------------------------------------------------------

/// Token kept in the OS keyring under the `citechat` service
#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    service: String,
    key: String,
}

impl KeyringTokenStore {
    /// Creates a store whose keyring entry user is `key`
    pub fn new(key: &str) -> Self {
        Self {
            service: KEYRING_SERVICE.to_string(),
            key: key.to_string(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry> {
        keyring::Entry::new(&self.service, &self.key).map_err(|e| CitechatError::Keyring(e).into())
    }
}

impl TokenStore for KeyringTokenStore {
    fn load(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(token) if token.is_empty() => Ok(None),
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(CitechatError::Keyring(e).into()),
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        self.entry()?
            .set_password(token)
            .map_err(CitechatError::Keyring)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_password() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(CitechatError::Keyring(e).into()),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryTokenStore
// ---------------------------------------------------------------------------

/// Token kept in memory; clones share the same slot
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryTokenStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `token`
    pub fn with_token(token: &str) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(token.to_string()))),
        }
    }

    fn with_slot<T>(&self, f: impl FnOnce(&mut Option<String>) -> T) -> T {
        let mut slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut slot)
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.with_slot(|slot| slot.clone()))
    }

    fn save(&self, token: &str) -> Result<()> {
        self.with_slot(|slot| *slot = Some(token.to_string()));
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.with_slot(|slot| *slot = None);
        Ok(())
    }
}

/// Create the token store described by the session configuration
///
/// # Errors
///
/// Returns error if the file store has no configured directory and no
/// default session directory can be determined
///
/// # Examples
///
/// ```
/// use citechat::config::{SessionConfig, TokenStoreKind};
/// use citechat::session::store::create_token_store;
///
/// let config = SessionConfig {
///     store: TokenStoreKind::Memory,
///     ..Default::default()
/// };
/// let store = create_token_store(&config).unwrap();
/// assert_eq!(store.load().unwrap(), None);
/// ```
pub fn create_token_store(config: &SessionConfig) -> Result<Box<dyn TokenStore>> {
    let store: Box<dyn TokenStore> = match config.store {
        TokenStoreKind::File => match &config.dir {
            Some(dir) => Box::new(FileTokenStore::new(dir, &config.key)),
            None => Box::new(FileTokenStore::in_default_dir(&config.key)?),
        },
        TokenStoreKind::Keyring => Box::new(KeyringTokenStore::new(&config.key)),
        TokenStoreKind::Memory => Box::new(MemoryTokenStore::new()),
    };
    tracing::debug!("Using {:?} token store", config.store);
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_round_trip_and_clear() {
        let dir = tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested"), "token");

        assert_eq!(store.load().unwrap(), None);
        store.save("abc").unwrap();
        assert_eq!(store.load().unwrap(), Some("abc".to_string()));
        assert!(store.path().ends_with("nested/token"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_clear_is_noop_when_empty() {
        let dir = tempdir().unwrap();
        let store = FileTokenStore::new(dir.path(), "token");
        assert!(store.clear().is_ok());
    }

    #[test]
    fn test_file_store_save_replaces_previous_token() {
        let dir = tempdir().unwrap();
        let store = FileTokenStore::new(dir.path(), "token");
        store.save("first").unwrap();
        store.save("second").unwrap();
        assert_eq!(store.load().unwrap(), Some("second".to_string()));
    }

    #[test]
    fn test_file_store_ignores_trailing_newline_and_empty_file() {
        let dir = tempdir().unwrap();
        let store = FileTokenStore::new(dir.path(), "token");

        std::fs::write(store.path(), "abc\n").unwrap();
        assert_eq!(store.load().unwrap(), Some("abc".to_string()));

        std::fs::write(store.path(), "").unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let store = FileTokenStore::new(dir.path(), "token");
        store.save("abc").unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_memory_store_clones_share_slot() {
        let store = MemoryTokenStore::new();
        let clone = store.clone();
        store.save("abc").unwrap();
        assert_eq!(clone.load().unwrap(), Some("abc".to_string()));
        clone.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_memory_store_with_token() {
        let store = MemoryTokenStore::with_token("seed");
        assert_eq!(store.load().unwrap(), Some("seed".to_string()));
    }

    #[test]
    fn test_create_token_store_uses_configured_dir() {
        let dir = tempdir().unwrap();
        let config = SessionConfig {
            store: TokenStoreKind::File,
            dir: Some(dir.path().to_path_buf()),
            key: "session-token".to_string(),
        };
        let store = create_token_store(&config).unwrap();
        store.save("abc").unwrap();
        assert!(dir.path().join("session-token").exists());
    }

    #[test]
    #[ignore = "requires system keyring"]
    fn test_keyring_store_round_trip() {
        let store = KeyringTokenStore::new("citechat-test-token");
        store.save("abc").unwrap();
        assert_eq!(store.load().unwrap(), Some("abc".to_string()));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
