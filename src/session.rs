//! Session persistence and credential checks.
//!
//! A session is a single key holding the signed-in user's id; its absence means
//! nobody is signed in.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use thiserror::Error;

use crate::domain::aggregates::User;

/// Storage key holding the current user id.
pub const SESSION_KEY: &str = "el_amigo_user_id";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage io: {0}")]
    Io(#[from] std::io::Error),
    #[error("session storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("session storage lock poisoned")]
    Poisoned,
    #[error("session worker stopped: {0}")]
    Worker(String),
}

/// Durable key/value storage for the session pointer.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove(&self, key: &str) -> Result<(), SessionError>;
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    inner: RwLock<BTreeMap<String, String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let map = self.inner.read().map_err(|_| SessionError::Poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut map = self.inner.write().map_err(|_| SessionError::Poisoned)?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        let mut map = self.inner.write().map_err(|_| SessionError::Poisoned)?;
        map.remove(key);
        Ok(())
    }
}

/// JSON-file backed store; survives restarts. Calls block on file io, so async
/// callers run them on the blocking pool.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: RwLock::new(()) }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, SessionError> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, map: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(map)?)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let _guard = self.lock.read().map_err(|_| SessionError::Poisoned)?;
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let _guard = self.lock.write().map_err(|_| SessionError::Poisoned)?;
        let mut map = self.load()?;
        map.insert(key.to_string(), value.to_string());
        self.save(&map)
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        let _guard = self.lock.write().map_err(|_| SessionError::Poisoned)?;
        let mut map = self.load()?;
        if map.remove(key).is_some() {
            self.save(&map)?;
        }
        Ok(())
    }
}

/// Decides whether a presented password unlocks a directory entry.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, user: &User, password: &str) -> bool;
}

/// Exact comparison against the stored plaintext password.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaintextVerifier;

impl CredentialVerifier for PlaintextVerifier {
    fn verify(&self, user: &User, password: &str) -> bool {
        user.password() == password
    }
}
