//! Local persistent storage.
//!
//! The browser localStorage analog: a handful of fixed string keys, one file
//! per key under `<data_dir>/store`. Exactly two keys exist today — the
//! visitor identifier and the serialized admin session.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Key holding the persistent visitor uuid.
pub const VISITOR_ID_KEY: &str = "visitor_id";
/// Key holding the JSON-serialized admin session.
pub const AUTH_USER_KEY: &str = "auth_user";

#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Open the store under the given data directory, creating it if needed.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let dir = data_dir.join("store");
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create store directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.key_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read store key: {}", key)),
        }
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::write(self.key_path(key), value)
            .with_context(|| format!("Failed to write store key: {}", key))
    }

    /// Remove a key. Removing an absent key is not an error.
    pub fn remove(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove store key: {}", key)),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.key_path(key).exists()
    }
}
