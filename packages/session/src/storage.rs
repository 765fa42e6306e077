//! Durable key-value storage backing the session store.
//!
//! Two keys exist: `user` (the serialized user record) and `token` (the
//! opaque credential). Both present is the only pairing that restores a
//! session; anything else reads as signed out.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::fs;

use crate::error::{SessionError, SessionResult};

/// Storage key for the serialized user record.
pub const KEY_USER: &str = "user";
/// Storage key for the opaque credential token.
pub const KEY_TOKEN: &str = "token";

/// Durable string key-value storage for session credentials.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Read a value, `None` when the key is absent.
    async fn load(&self, key: &str) -> SessionResult<Option<String>>;

    /// Write a value, replacing any previous one.
    async fn store(&self, key: &str, value: &str) -> SessionResult<()>;

    /// Remove a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> SessionResult<()>;
}

/// File-backed storage: one file per key under a config directory
/// (by default `~/.telcome`).
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at the default `~/.telcome` directory.
    pub fn new() -> SessionResult<Self> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| SessionError::config("Could not determine home directory"))?;
        Ok(Self {
            dir: home_dir.join(".telcome"),
        })
    }

    /// Storage rooted at an explicit directory.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

#[async_trait]
impl SessionStorage for FileStorage {
    async fn load(&self, key: &str) -> SessionResult<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).await?;
        Ok(Some(content))
    }

    async fn store(&self, key: &str, value: &str) -> SessionResult<()> {
        fs::create_dir_all(&self.dir).await?;
        fs::write(self.key_path(key), value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> SessionResult<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(path).await?;
        }
        Ok(())
    }
}

/// In-memory storage for tests.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a key before constructing a store on top of this storage.
    pub fn preload(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .expect("storage mutex poisoned")
            .insert(key.to_string(), value.to_string());
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn load(&self, key: &str) -> SessionResult<Option<String>> {
        Ok(self
            .entries
            .lock()
            .map_err(|_| SessionError::storage("storage mutex poisoned"))?
            .get(key)
            .cloned())
    }

    async fn store(&self, key: &str, value: &str) -> SessionResult<()> {
        self.entries
            .lock()
            .map_err(|_| SessionError::storage("storage mutex poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> SessionResult<()> {
        self.entries
            .lock()
            .map_err(|_| SessionError::storage("storage mutex poisoned"))?
            .remove(key);
        Ok(())
    }
}
