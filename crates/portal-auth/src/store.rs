//! Persisted client-side session storage.
//!
//! The session lives in a small key/value store, mirroring what a browser
//! keeps in local storage. The store is injected wherever it is needed so
//! tests can substitute it and writers are serialized by its lock.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, warn};

use crate::error::{SessionError, SessionResult};

/// Keys the portal persists for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// Bearer token attached to requests.
    AuthToken,
    /// Token used to obtain a new bearer token.
    RefreshToken,
    /// Serialized [`UserInfo`](crate::user::UserInfo) returned by login.
    UserInfo,
    /// Serialized profile details shown in the header.
    UserProfile,
}

impl StorageKey {
    /// Storage name of the key.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::AuthToken => "authToken",
            StorageKey::RefreshToken => "refreshToken",
            StorageKey::UserInfo => "userInfo",
            StorageKey::UserProfile => "userProfile",
        }
    }

    /// Every session key. They are always cleared together.
    pub fn all() -> [StorageKey; 4] {
        [
            StorageKey::AuthToken,
            StorageKey::RefreshToken,
            StorageKey::UserInfo,
            StorageKey::UserProfile,
        ]
    }
}

/// Key/value storage for the session.
pub trait SessionStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: StorageKey) -> SessionResult<Option<String>>;

    /// Write a value.
    fn set(&self, key: StorageKey, value: &str) -> SessionResult<()>;

    /// Remove a value. Removing an absent key is not an error.
    fn remove(&self, key: StorageKey) -> SessionResult<()>;

    /// Remove every session key.
    fn clear(&self) -> SessionResult<()> {
        for key in StorageKey::all() {
            self.remove(key)?;
        }
        Ok(())
    }
}

/// In-memory store, lost when the process exits.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: RwLock<HashMap<&'static str, String>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: StorageKey) -> SessionResult<Option<String>> {
        let values = self.values.read().map_err(|_| SessionError::Poisoned)?;
        Ok(values.get(key.as_str()).cloned())
    }

    fn set(&self, key: StorageKey, value: &str) -> SessionResult<()> {
        let mut values = self.values.write().map_err(|_| SessionError::Poisoned)?;
        values.insert(key.as_str(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> SessionResult<()> {
        let mut values = self.values.write().map_err(|_| SessionError::Poisoned)?;
        values.remove(key.as_str());
        Ok(())
    }

    fn clear(&self) -> SessionResult<()> {
        let mut values = self.values.write().map_err(|_| SessionError::Poisoned)?;
        values.clear();
        Ok(())
    }
}

/// Store persisted as a JSON object in a file.
///
/// Values are cached in memory and every write rewrites the file through a
/// temporary sibling, so a crash never leaves a half-written session.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl FileSessionStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file is an empty session. A file that is not a JSON object
    /// of strings is discarded with a warning.
    pub fn open(path: impl Into<PathBuf>) -> SessionResult<Self> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(values) => values,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Discarding unreadable session file");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), keys = values.len(), "Opened session file");

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &HashMap<String, String>) -> SessionResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(values)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: StorageKey) -> SessionResult<Option<String>> {
        let values = self.values.read().map_err(|_| SessionError::Poisoned)?;
        Ok(values.get(key.as_str()).cloned())
    }

    fn set(&self, key: StorageKey, value: &str) -> SessionResult<()> {
        let mut values = self.values.write().map_err(|_| SessionError::Poisoned)?;
        values.insert(key.as_str().to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: StorageKey) -> SessionResult<()> {
        let mut values = self.values.write().map_err(|_| SessionError::Poisoned)?;
        if values.remove(key.as_str()).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }

    fn clear(&self) -> SessionResult<()> {
        let mut values = self.values.write().map_err(|_| SessionError::Poisoned)?;
        let before = values.len();
        for key in StorageKey::all() {
            values.remove(key.as_str());
        }
        if values.len() != before {
            self.persist(&values)?;
        }
        Ok(())
    }
}
