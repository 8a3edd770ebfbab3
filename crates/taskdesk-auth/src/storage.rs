//! Token storage.
//!
//! The file store reads and writes `~/.taskdesk/token.json` with secure file
//! permissions (0o600):
//!
//! ```json
//! { "version": 1, "token": "abc123", "lastUpdated": "2024-01-15T10:30:00+00:00" }
//! ```

use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::errors::AuthError;

/// Default token file name.
const TOKEN_FILE_NAME: &str = "token.json";

/// Supported on-disk format version.
const STORAGE_VERSION: u32 = 1;

/// Get the token file path under the given data directory.
pub fn token_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join(TOKEN_FILE_NAME)
}

/// Where the transport finds the bearer token.
///
/// Reads happen before every request, so implementations should be cheap.
pub trait TokenStore: Send + Sync {
    /// The current token, if any.
    fn token(&self) -> Option<String>;

    /// Replace the stored token.
    fn set_token(&self, token: &str) -> Result<(), AuthError>;

    /// Forget the stored token. Clearing an empty store succeeds.
    fn clear(&self) -> Result<(), AuthError>;
}

/// On-disk token record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredToken {
    /// Format version.
    pub version: u32,
    /// Bearer token.
    pub token: String,
    /// RFC 3339 time of the last write.
    pub last_updated: String,
}

impl StoredToken {
    /// New record stamped with the current time.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            version: STORAGE_VERSION,
            token: token.into(),
            last_updated: chrono::Utc::now().to_rfc3339(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File store
// ─────────────────────────────────────────────────────────────────────────────

/// Token store backed by a JSON file.
#[derive(Clone, Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the token record.
    ///
    /// Returns `None` if the file doesn't exist or is invalid.
    pub fn load(&self) -> Option<StoredToken> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "failed to read token file: {e}");
                return None;
            }
        };

        match serde_json::from_str::<StoredToken>(&data) {
            Ok(stored) if stored.version == STORAGE_VERSION => Some(stored),
            Ok(stored) => {
                tracing::warn!("unsupported token storage version: {}", stored.version);
                None
            }
            Err(e) => {
                tracing::warn!("failed to parse token file: {e}");
                None
            }
        }
    }

    fn save(&self, stored: &StoredToken) -> Result<(), AuthError> {
        let write_err = |source: std::io::Error| AuthError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json = serde_json::to_string_pretty(stored)?;
        std::fs::write(&self.path, &json).map_err(write_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            if let Err(e) = std::fs::set_permissions(&self.path, perms) {
                tracing::warn!(path = %self.path.display(), "failed to restrict token file permissions: {e}");
            }
        }

        tracing::debug!(path = %self.path.display(), "token saved");
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn token(&self) -> Option<String> {
        self.load()
            .map(|stored| stored.token)
            .filter(|token| !token.is_empty())
    }

    fn set_token(&self, token: &str) -> Result<(), AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::EmptyToken);
        }
        self.save(&StoredToken::new(token))
    }

    fn clear(&self) -> Result<(), AuthError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(AuthError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory store
// ─────────────────────────────────────────────────────────────────────────────

/// Process-local token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with a token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn set_token(&self, token: &str) -> Result<(), AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::EmptyToken);
        }
        *self.token.write() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        *self.token.write() = None;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
