//! Credential storage for the directory client
//!
//! Provides a trait-based system for persisting session credentials so a
//! restart can resume a logged-in session without re-prompting. The session
//! client is the only writer; the request path reads through an in-memory
//! cache kept in sync by the client.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::info;

use common::{AuthError, AuthResult};

/// Persisted session credentials.
///
/// Token contents are opaque to the client; presence of an access token does
/// not imply it is still valid server-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    /// Short-lived bearer credential for API calls
    pub access_token: Option<String>,
    /// Longer-lived credential used solely to obtain a new access token
    pub refresh_token: Option<String>,
    /// Whether the user was logged in when these credentials were written
    pub logged_in: bool,
}

impl Credentials {
    /// Create credentials for a freshly established session
    pub fn logged_in(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
            logged_in: true,
        }
    }

    /// Whether any credential material is present
    pub fn has_tokens(&self) -> bool {
        self.access_token.is_some() || self.refresh_token.is_some()
    }
}

/// Trait for credential storage backends.
///
/// Implementations persist to a file, keep credentials in memory, or wrap any
/// other durable medium. `clear` is idempotent: clearing an empty store is not
/// an error.
pub trait CredentialStore: Send + Sync {
    /// Retrieve the stored credentials, or `None` if never saved
    fn load(&self) -> AuthResult<Option<Credentials>>;

    /// Store credentials, overwriting any existing value
    fn save(&self, credentials: &Credentials) -> AuthResult<()>;

    /// Remove all stored credentials
    fn clear(&self) -> AuthResult<()>;
}

/// File-based credential storage
///
/// Persists credentials as JSON under the platform config directory
/// (`<config_dir>/flock-directory/credentials.json` by default) with
/// owner-only permissions on Unix.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    file_path: PathBuf,
}

impl FileCredentialStore {
    /// Default credentials file path under the platform config directory
    pub fn default_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("flock-directory").join("credentials.json")
    }

    /// Create a store backed by the default path
    pub fn new() -> Self {
        Self::with_path(Self::default_path())
    }

    /// Create a store backed by a specific file
    pub fn with_path(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    #[cfg(unix)]
    fn restrict_permissions(path: &Path) -> AuthResult<()> {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o600);
        fs::set_permissions(path, perms).map_err(AuthError::Storage)
    }

    #[cfg(not(unix))]
    fn restrict_permissions(_path: &Path) -> AuthResult<()> {
        Ok(())
    }
}

impl Default for FileCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> AuthResult<Option<Credentials>> {
        if !self.file_path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.file_path)?;
        let credentials: Credentials = serde_json::from_str(&contents)?;
        Ok(Some(credentials))
    }

    fn save(&self, credentials: &Credentials) -> AuthResult<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(credentials)?;
        fs::write(&self.file_path, contents)?;
        Self::restrict_permissions(&self.file_path)?;

        info!("Credentials saved to {}", self.file_path.display());
        Ok(())
    }

    fn clear(&self) -> AuthResult<()> {
        match fs::remove_file(&self.file_path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Storage(err)),
        }
    }
}

/// In-memory credential store for tests and ephemeral sessions.
///
/// Does NOT persist credentials across restarts.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credentials: Mutex<Option<Credentials>>,
}

impl MemoryCredentialStore {
    /// Create a new empty in-memory credential store
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> AuthResult<Option<Credentials>> {
        Ok(self
            .credentials
            .lock()
            .expect("credential store lock poisoned")
            .clone())
    }

    fn save(&self, credentials: &Credentials) -> AuthResult<()> {
        *self
            .credentials
            .lock()
            .expect("credential store lock poisoned") = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> AuthResult<()> {
        *self
            .credentials
            .lock()
            .expect("credential store lock poisoned") = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Credentials {
        Credentials::logged_in("T1".to_string(), "R1".to_string())
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.load().unwrap(), None);

        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample()));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn memory_store_overwrites() {
        let store = MemoryCredentialStore::new();
        store.save(&sample()).unwrap();

        let newer = Credentials::logged_in("T2".to_string(), "R1".to_string());
        store.save(&newer).unwrap();

        assert_eq!(store.load().unwrap().unwrap().access_token.as_deref(), Some("T2"));
    }

    #[test]
    fn file_store_round_trip_across_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        let store = FileCredentialStore::with_path(&path);
        assert_eq!(store.load().unwrap(), None);
        store.save(&sample()).unwrap();

        // A second store over the same path sees the persisted value
        let reloaded = FileCredentialStore::with_path(&path);
        assert_eq!(reloaded.load().unwrap(), Some(sample()));
    }

    #[test]
    fn file_store_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::with_path(dir.path().join("credentials.json"));

        store.save(&sample()).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn file_store_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let store = FileCredentialStore::with_path(&path);
        store.save(&sample()).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
