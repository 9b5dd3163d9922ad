//! Persistent key/value storage for the session tokens.
//!
//! Tokens are stored under the literal keys `accessToken` and
//! `refreshToken`. Only the session manager writes them; the API client
//! reads the access token on every request.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use atelier_core::TokenPair;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// The two tokens of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    /// Storage key of this token.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Access => "accessToken",
            Self::Refresh => "refreshToken",
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("Could not access token storage at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Could not encode token storage: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Key/value storage for session tokens.
pub trait TokenStore: Send + Sync {
    /// The stored token, if any.
    fn get(&self, kind: TokenKind) -> Option<SecretString>;

    /// Store a token, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the token could not be persisted.
    fn set(&self, kind: TokenKind, value: SecretString) -> Result<(), TokenStoreError>;

    /// Remove a token. Removing a missing token is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage could not be updated.
    fn remove(&self, kind: TokenKind) -> Result<(), TokenStoreError>;

    /// Store both tokens of `pair`.
    ///
    /// # Errors
    ///
    /// Returns an error if either token could not be persisted.
    fn set_pair(&self, pair: &TokenPair) -> Result<(), TokenStoreError> {
        self.set(TokenKind::Access, SecretString::from(pair.access_token.clone()))?;
        self.set(TokenKind::Refresh, SecretString::from(pair.refresh_token.clone()))
    }

    /// Remove both tokens.
    ///
    /// # Errors
    ///
    /// Returns the first failure; the other token is still removed.
    fn clear(&self) -> Result<(), TokenStoreError> {
        let access = self.remove(TokenKind::Access);
        let refresh = self.remove(TokenKind::Refresh);
        access.and(refresh)
    }
}

/// Process-local token storage.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<HashMap<TokenKind, SecretString>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for MemoryTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTokenStore")
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, kind: TokenKind) -> Option<SecretString> {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .cloned()
    }

    fn set(&self, kind: TokenKind, value: SecretString) -> Result<(), TokenStoreError> {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind, value);
        Ok(())
    }

    fn remove(&self, kind: TokenKind) -> Result<(), TokenStoreError> {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&kind);
        Ok(())
    }
}

/// Token storage in a JSON object file.
///
/// The file is re-read on every access so separate processes of the same
/// user share one session. Writes go through a temporary file and a rename.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "token file unreadable");
                return BTreeMap::new();
            }
        };
        // A corrupt file reads as an empty session; the next write replaces it.
        serde_json::from_str(&contents).unwrap_or_default()
    }

    fn update<F>(&self, apply: F) -> Result<(), TokenStoreError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut tokens = self.read_all();
        apply(&mut tokens);
        self.write_all(&tokens)
    }

    fn write_all(&self, tokens: &BTreeMap<String, String>) -> Result<(), TokenStoreError> {
        let io_err = |source: io::Error| TokenStoreError::Io {
            path: self.path.clone(),
            source,
        };

        if tokens.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(io_err(e)),
                _ => Ok(()),
            };
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_vec_pretty(tokens)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        restrict_permissions(&tmp).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
const fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

impl TokenStore for FileTokenStore {
    fn get(&self, kind: TokenKind) -> Option<SecretString> {
        self.read_all()
            .remove(kind.key())
            .filter(|t| !t.is_empty())
            .map(SecretString::from)
    }

    fn set(&self, kind: TokenKind, value: SecretString) -> Result<(), TokenStoreError> {
        self.update(|tokens| {
            tokens.insert(kind.key().to_string(), value.expose_secret().to_string());
        })
    }

    fn remove(&self, kind: TokenKind) -> Result<(), TokenStoreError> {
        self.update(|tokens| {
            tokens.remove(kind.key());
        })
    }
}
